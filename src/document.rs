//! The in-memory document threaded through the rewrite passes.

/// An ordered sequence of text lines, stored without line terminators.
///
/// Every pipeline stage takes `&mut Document`. Stages that splice multi-line
/// HTML back in push one entry per line, so a line never contains `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Split `text` into lines. Accepts `\n` and `\r\n` line breaks.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [String] {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Insert `line` before the first line.
    pub fn prepend(&mut self, line: impl Into<String>) {
        self.lines.insert(0, line.into());
    }

    /// Swap the line vector wholesale; used by passes that rebuild it.
    pub(crate) fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Join the lines back into text ending with exactly one newline.
    pub fn to_text(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Push every line of `text` onto `out`.
pub(crate) fn push_text_lines(out: &mut Vec<String>, text: &str) {
    out.extend(text.lines().map(str::to_string));
}

/// Tracks ```` ``` ```` / `~~~` fenced code blocks while scanning lines in order.
///
/// A fence opens on a line of three or more backticks or tildes (at most
/// three spaces of indent) and closes on a bare run of the same character
/// that is at least as long.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: char,
    len: usize,
}

impl FenceTracker {
    /// Feed the next line; true when it is a fence delimiter or inside a block.
    pub(crate) fn in_code(&mut self, line: &str) -> bool {
        match (self.open, fence_of(line)) {
            (Some(open), Some((f, rest)))
                if f.ch == open.ch && f.len >= open.len && rest.trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, Some((f, _))) => {
                self.open = Some(f);
                true
            }
            (None, None) => false,
        }
    }
}

fn fence_of(line: &str) -> Option<(Fence, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    Some((Fence { ch, len }, &trimmed[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_tracker_marks_block_lines() {
        let mut fence = FenceTracker::default();
        let flags: Vec<bool> = ["a", "```rust", "code", "```", "b"]
            .iter()
            .map(|l| fence.in_code(l))
            .collect();
        assert_eq!(flags, vec![false, true, true, true, false]);
    }

    #[test]
    fn fence_tracker_ignores_indented_code_and_short_runs() {
        let mut fence = FenceTracker::default();
        assert!(!fence.in_code("    ```"));
        assert!(!fence.in_code("``inline``"));
    }

    #[test]
    fn parse_and_render_roundtrip() {
        let doc = Document::parse("# A\n\ntext\n");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.to_text(), "# A\n\ntext\n");
    }

    #[test]
    fn crlf_is_normalised() {
        let doc = Document::parse("a\r\nb\r\n");
        assert_eq!(doc.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(doc.to_text(), "a\nb\n");
    }

    #[test]
    fn missing_final_newline_is_added() {
        assert_eq!(Document::parse("a\nb").to_text(), "a\nb\n");
    }

    #[test]
    fn empty_document() {
        let doc = Document::parse("");
        assert!(doc.is_empty());
        assert_eq!(doc.to_text(), "");
    }

    #[test]
    fn prepend_inserts_first_line() {
        let mut doc = Document::parse("body\n");
        doc.prepend("<x-title/>");
        assert_eq!(doc.to_text(), "<x-title/>\nbody\n");
    }
}
