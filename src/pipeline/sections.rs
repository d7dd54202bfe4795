//! Section numbering: insert `1.2.3`-style prefixes into ATX headings.
//!
//! The numbering is driven by a depth stack with one counter per active
//! heading level. The stack starts as `[0]`, so a document whose first
//! heading is `#` numbers it `1`.
//!
//! The heading level is inferred from the hash markers relative to the
//! current depth, not parsed: a heading one level deeper pushes a counter,
//! a heading at the current depth increments it, and any shallower heading
//! pops counters down to the byte offset of the line's first space. Depth
//! jumps (`#` straight to `###`) therefore go through the "one deeper"
//! branch and are numbered as if they were one level down. That heuristic is
//! kept as-is so existing documents keep their numbers.

use crate::document::{Document, FenceTracker};
use tracing::debug;

/// Mutable numbering state for one document.
#[derive(Debug, Clone)]
pub struct SectionCounter {
    stack: Vec<u32>,
    fence: FenceTracker,
}

impl Default for SectionCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionCounter {
    pub fn new() -> Self {
        Self {
            stack: vec![0],
            fence: FenceTracker::default(),
        }
    }

    /// Current depth (length of the counter stack).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Dot-joined counters, e.g. `"1.2"`.
    pub fn label(&self) -> String {
        self.stack
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Feed one line; returns the numbered line when a prefix was inserted.
    ///
    /// Headings without a space after their hashes still move the counters
    /// but get no prefix. Lines inside fenced code blocks are ignored.
    pub fn number_line(&mut self, line: &str) -> Option<String> {
        if self.fence.in_code(line) {
            return None;
        }

        let current = "#".repeat(self.stack.len());
        let next = "#".repeat(self.stack.len() + 1);

        let marker = if line.starts_with(&next) {
            self.stack.push(1);
            next
        } else if line.starts_with(&current) {
            self.bump();
            current
        } else if line.starts_with('#') {
            let space = line.find(' ');
            if let Some(level) = space {
                while self.stack.len() > level.max(1) {
                    self.stack.pop();
                }
            }
            self.bump();
            match space {
                Some(i) => line[..i].to_string(),
                None => line.to_string(),
            }
        } else {
            return None;
        };

        let needle = format!("{marker} ");
        let pos = line.find(&needle)?;
        let end = pos + needle.len();
        Some(format!(
            "{}{}{} {}",
            &line[..pos],
            needle,
            self.label(),
            &line[end..]
        ))
    }

    fn bump(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            *top += 1;
        }
    }
}

/// Number every heading in `doc`; returns how many headings got a prefix.
pub fn number_sections(doc: &mut Document) -> usize {
    let mut counter = SectionCounter::new();
    let mut numbered = 0;
    for line in doc.lines_mut() {
        if let Some(rewritten) = counter.number_line(line) {
            debug!(section = %counter.label(), "numbered heading");
            *line = rewritten;
            numbered += 1;
        }
    }
    numbered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(input: &str) -> String {
        let mut doc = Document::parse(input);
        number_sections(&mut doc);
        doc.to_text()
    }

    #[test]
    fn test_simple_hierarchy() {
        assert_eq!(
            numbered("# Intro\n## Sub\n# Next\n"),
            "# 1 Intro\n## 1.1 Sub\n# 2 Next\n"
        );
    }

    #[test]
    fn test_siblings_increment() {
        assert_eq!(
            numbered("# A\n## B\n## C\n# D\n"),
            "# 1 A\n## 1.1 B\n## 1.2 C\n# 2 D\n"
        );
    }

    #[test]
    fn test_deep_then_shallow() {
        let out = numbered("# A\n## B\n### C\n### D\n## E\n# F\n## G\n");
        assert_eq!(
            out,
            "# 1 A\n## 1.1 B\n### 1.1.1 C\n### 1.1.2 D\n## 1.2 E\n# 2 F\n## 2.1 G\n"
        );
    }

    #[test]
    fn test_body_text_untouched() {
        let out = numbered("# A\nsome ## text\nplain\n");
        assert_eq!(out, "# 1 A\nsome ## text\nplain\n");
    }

    #[test]
    fn test_depth_jump_uses_one_deeper_branch() {
        // `###` right after `#` is treated as the next level down.
        assert_eq!(numbered("# A\n### B\n"), "# 1 A\n### 1.1 B\n");
    }

    #[test]
    fn test_document_starting_below_top_level() {
        assert_eq!(numbered("## A\n## B\n"), "## 0.1 A\n## 0.2 B\n");
    }

    #[test]
    fn test_heading_without_space_advances_counter() {
        assert_eq!(numbered("#A\n# B\n"), "#A\n# 2 B\n");
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let input = "# A\n```bash\n# not a heading\n```\n# B\n";
        assert_eq!(
            numbered(input),
            "# 1 A\n```bash\n# not a heading\n```\n# 2 B\n"
        );
    }

    #[test]
    fn test_tilde_fence_needs_matching_close() {
        let input = "~~~~\n# x\n~~~\n# y\n~~~~\n# A\n";
        assert_eq!(numbered(input), "~~~~\n# x\n~~~\n# y\n~~~~\n# 1 A\n");
    }

    #[test]
    fn test_counter_state() {
        let mut c = SectionCounter::new();
        assert_eq!(c.depth(), 1);
        c.number_line("# A");
        c.number_line("## B");
        assert_eq!(c.depth(), 2);
        assert_eq!(c.label(), "1.1");
    }

    #[test]
    fn test_returns_count() {
        let mut doc = Document::parse("# A\ntext\n## B\n");
        assert_eq!(number_sections(&mut doc), 2);
    }
}
