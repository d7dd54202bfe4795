//! Compilation results and output-path resolution.

use crate::config::OutputType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Counts collected while compiling one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStats {
    /// Headings that received a section number.
    pub headings_numbered: usize,
    /// Images rewritten by the picture pass.
    pub figures: usize,
    /// `<p: KEY/>` tags resolved.
    pub figure_references: usize,
    /// Tables rendered from `<T: …/>` declarations.
    pub tables: usize,
    /// `<t: KEY/>` tags resolved.
    pub table_references: usize,
    /// `<x-title/>` placeholders replaced.
    pub title_blocks: usize,
    /// Size of the written artifact; 0 until something is written.
    pub output_bytes: usize,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// The rewritten markdown plus what the passes did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub markdown: String,
    pub stats: CompileStats,
}

/// Output path derived from the input: same stem, the type's extension.
pub fn infer_output_path(input: &Path, output_type: OutputType) -> PathBuf {
    input.with_extension(output_type.default_extension())
}

/// If `output`'s extension does not fit `output_type`, the suggested rename.
pub fn extension_mismatch(output: &Path, output_type: OutputType) -> Option<PathBuf> {
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    let fits = ext
        .as_deref()
        .is_some_and(|ext| output_type.extensions().contains(&ext));
    if fits {
        None
    } else {
        Some(output.with_extension(output_type.default_extension()))
    }
}

/// Decide the final output path.
///
/// Without an explicit `output` the path is inferred from `input`. An
/// explicit path with a mismatched extension is renamed only when `confirm`
/// (called with the current and the suggested path) returns true.
pub fn resolve_output_path<F>(
    input: &Path,
    output: Option<&Path>,
    output_type: OutputType,
    confirm: F,
) -> PathBuf
where
    F: FnOnce(&Path, &Path) -> bool,
{
    let Some(output) = output else {
        let inferred = infer_output_path(input, output_type);
        debug!("Inferred output path: {}", inferred.display());
        return inferred;
    };
    match extension_mismatch(output, output_type) {
        Some(renamed) if confirm(output, &renamed) => renamed,
        _ => output.to_path_buf(),
    }
}

/// Interpret a `[Y/n]` / `[y/N]` answer. Only the first letter matters.
pub fn parse_yes_no(answer: &str, default_yes: bool) -> bool {
    let answer = answer.trim().to_lowercase();
    if default_yes {
        !answer.starts_with('n')
    } else {
        answer.starts_with('y')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_input() {
        assert_eq!(
            infer_output_path(Path::new("notes/doc.md"), OutputType::Pdf),
            PathBuf::from("notes/doc.pdf")
        );
        assert_eq!(
            infer_output_path(Path::new("README"), OutputType::Html),
            PathBuf::from("README.html")
        );
    }

    #[test]
    fn test_matching_extensions() {
        assert_eq!(extension_mismatch(Path::new("a.htm"), OutputType::Html), None);
        assert_eq!(extension_mismatch(Path::new("a.PDF"), OutputType::Pdf), None);
        assert_eq!(
            extension_mismatch(Path::new("a.markdown"), OutputType::Markdown),
            None
        );
    }

    #[test]
    fn test_mismatch_suggests_rename() {
        assert_eq!(
            extension_mismatch(Path::new("doc.txt"), OutputType::Pdf),
            Some(PathBuf::from("doc.pdf"))
        );
        assert_eq!(
            extension_mismatch(Path::new("doc"), OutputType::Markdown),
            Some(PathBuf::from("doc.md"))
        );
    }

    #[test]
    fn test_declined_rename_keeps_literal_path() {
        let mut asked = None;
        let out = resolve_output_path(
            Path::new("doc.md"),
            Some(Path::new("doc.txt")),
            OutputType::Pdf,
            |from, to| {
                asked = Some((from.to_path_buf(), to.to_path_buf()));
                parse_yes_no("n", true)
            },
        );
        assert_eq!(out, PathBuf::from("doc.txt"));
        assert_eq!(
            asked,
            Some((PathBuf::from("doc.txt"), PathBuf::from("doc.pdf")))
        );
    }

    #[test]
    fn test_accepted_rename() {
        let out = resolve_output_path(
            Path::new("doc.md"),
            Some(Path::new("doc.txt")),
            OutputType::Pdf,
            |_, _| parse_yes_no("", true),
        );
        assert_eq!(out, PathBuf::from("doc.pdf"));
    }

    #[test]
    fn test_no_prompt_when_extension_fits() {
        let out = resolve_output_path(
            Path::new("doc.md"),
            Some(Path::new("out.html")),
            OutputType::Html,
            |_, _| panic!("must not ask"),
        );
        assert_eq!(out, PathBuf::from("out.html"));
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("", true));
        assert!(parse_yes_no("yes", true));
        assert!(parse_yes_no("whatever", true));
        assert!(!parse_yes_no("N", true));
        assert!(!parse_yes_no("no", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("Y", false));
    }
}
