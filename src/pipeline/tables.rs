//! Table pass: `<T: KEY|title/>` declarations turn the pipe table that
//! follows into captioned HTML.
//!
//! ```text
//! <T: results|Benchmark results/>      <p>Table 1 Benchmark results<br/>
//!
//! | run | ms |                 ──▶      <table>…</table>
//! |-----|----|
//! | a   | 12 |                         </p>
//!
//! ```
//!
//! The scan is a three-state machine over the lines: look for a
//! declaration, then for the first line starting with `|`, then collect rows
//! until a blank line. Lines between a declaration and its table, further
//! declarations included, are copied through unchanged. Fenced code blocks
//! are never scanned. The collected block is rendered as one unit and its
//! HTML lines replace it. `<t: KEY/>` references are resolved afterwards.

use super::captions::{resolve_references, split_caption, CaptionRegistry};
use super::pictures::CENTER_STYLE;
use super::render::markdown_to_html;
use super::PassReport;
use crate::config::CompileConfig;
use crate::document::{push_text_lines, Document, FenceTracker};
use crate::error::{CaptionKind, EzmdError};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Attributes put on `<table>` when tables are centred.
const CENTER_TABLE_ATTRS: &str =
    r#"style="margin-left: auto; margin-right: auto;" rules="all" border="1""#;

static RE_TABLE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<\s*T\s*:\s*([^/]+)\s*/\s*>").unwrap());

static RE_TABLE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*t\s*:\s*([^/\s]+)\s*/\s*>").unwrap());

enum ScanState {
    SeekingDeclaration,
    SeekingTableStart {
        line: usize,
        title: String,
    },
    InTable {
        rows: Vec<String>,
    },
}

/// Render declared tables and resolve `<t: KEY/>` references.
pub fn process_tables(
    doc: &mut Document,
    config: &CompileConfig,
) -> Result<PassReport, EzmdError> {
    let center = config.center_tables;
    let label = config.table_caption_label.as_str();
    let mut registry = CaptionRegistry::new(CaptionKind::Table);
    let mut report = PassReport::default();

    let mut out: Vec<String> = Vec::with_capacity(doc.len());
    let mut state = ScanState::SeekingDeclaration;

    let mut fence = FenceTracker::default();
    for (idx, line) in doc.lines().iter().enumerate() {
        if !matches!(state, ScanState::InTable { .. }) && fence.in_code(line) {
            out.push(line.clone());
            continue;
        }
        state = match state {
            ScanState::SeekingDeclaration => match RE_TABLE_DECL.captures(line) {
                Some(caps) => {
                    let tail = caps.get(0).map_or("", |m| &line[m.end()..]);
                    let (key, title) = split_caption(&caps[1]);
                    let id = registry.register(key);
                    let open = if center {
                        format!("<p {CENTER_STYLE}>")
                    } else {
                        "<p>".to_string()
                    };
                    out.push(format!("{open}{label} {id} {title}<br/>{tail}"));
                    ScanState::SeekingTableStart {
                        line: idx + 1,
                        title: title.to_string(),
                    }
                }
                None => {
                    out.push(line.clone());
                    ScanState::SeekingDeclaration
                }
            },
            ScanState::SeekingTableStart { line: decl, title } => {
                if line.starts_with('|') {
                    ScanState::InTable {
                        rows: vec![line.clone()],
                    }
                } else {
                    out.push(line.clone());
                    ScanState::SeekingTableStart { line: decl, title }
                }
            }
            ScanState::InTable { mut rows } => {
                if line.trim().is_empty() {
                    close_table(&mut out, &rows, center);
                    report.elements += 1;
                    ScanState::SeekingDeclaration
                } else {
                    rows.push(line.clone());
                    ScanState::InTable { rows }
                }
            }
        };
    }

    match state {
        ScanState::SeekingDeclaration => {}
        ScanState::SeekingTableStart { line, title } => {
            return Err(EzmdError::MalformedTable { line, title });
        }
        ScanState::InTable { rows } => {
            close_table(&mut out, &rows, center);
            report.elements += 1;
        }
    }

    doc.replace_lines(out);
    report.references = resolve_references(doc, &RE_TABLE_REF, &registry, label)?;
    info!(
        tables = report.elements,
        references = report.references,
        "table pass complete"
    );
    Ok(report)
}

/// Render the collected rows and close the caption paragraph.
fn close_table(out: &mut Vec<String>, rows: &[String], center: bool) {
    let mut html = markdown_to_html(&rows.join("\n"));
    if center {
        html = html.replace("<table>", &format!("<table {CENTER_TABLE_ATTRS}>"));
    }
    debug!(rows = rows.len(), "rendered table");
    push_text_lines(out, &html);
    out.push(String::new());
    out.push("</p>".to_string());
    out.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "| a | b |\n|---|---|\n| 1 | 2 |\n";

    fn config(center: bool) -> CompileConfig {
        CompileConfig::builder()
            .center_tables(center)
            .build()
            .unwrap()
    }

    fn run(input: &str, center: bool) -> Result<(String, PassReport), EzmdError> {
        let mut doc = Document::parse(input);
        let report = process_tables(&mut doc, &config(center))?;
        Ok((doc.to_text(), report))
    }

    #[test]
    fn test_keyed_table_with_reference() {
        let input = format!("<T: t1|Results/>\n\n{TABLE}\nSee <t: t1/>.\n");
        let (out, report) = run(&input, false).unwrap();
        assert_eq!(report.elements, 1);
        assert_eq!(report.references, 1);
        assert!(out.starts_with("<p>Table 1 Results<br/>\n"), "got: {out}");
        assert!(out.contains("<table>"), "got: {out}");
        assert!(out.contains("<td>1</td>"), "got: {out}");
        assert!(!out.contains("| 1 | 2 |"), "rows must be replaced: {out}");
        assert!(out.contains("\n</p>\n"), "got: {out}");
        assert!(out.ends_with("See Table 1.\n"), "got: {out}");
    }

    #[test]
    fn test_ids_dense_across_keyed_and_unkeyed() {
        let input = format!(
            "<T: First/>\n{TABLE}\n<T: second|Second/>\n{TABLE}\n<T: Third/>\n{TABLE}\n<t: second/>\n"
        );
        let (out, report) = run(&input, false).unwrap();
        assert_eq!(report.elements, 3);
        assert!(out.contains("Table 1 First<br/>"));
        assert!(out.contains("Table 2 Second<br/>"));
        assert!(out.contains("Table 3 Third<br/>"));
        assert!(out.ends_with("Table 2\n"), "got: {out}");
    }

    #[test]
    fn test_table_ending_at_eof() {
        let input = "<T: Last/>\n| x |\n|---|\n| y |";
        let (out, report) = run(input, false).unwrap();
        assert_eq!(report.elements, 1);
        assert!(out.contains("<td>y</td>"), "got: {out}");
        assert!(out.trim_end().ends_with("</p>"), "got: {out}");
    }

    #[test]
    fn test_centering_styles_table() {
        let input = format!("<T: Centered/>\n{TABLE}");
        let (out, _) = run(&input, true).unwrap();
        assert!(out.starts_with(
            r#"<p style="width: 100vw; text-align: center;">Table 1 Centered<br/>"#
        ));
        assert!(out.contains(
            r#"<table style="margin-left: auto; margin-right: auto;" rules="all" border="1">"#
        ));
    }

    #[test]
    fn test_missing_table_is_malformed() {
        let err = run("<T: t1|Results/>\n\n", false).unwrap_err();
        match err {
            EzmdError::MalformedTable { line, title } => {
                assert_eq!(line, 1);
                assert_eq!(title, "Results");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lines_before_table_are_copied_through() {
        let input = "<T: A/>\n<T: B/>\n| x |\n|---|\n| y |\n\n";
        let (out, report) = run(input, false).unwrap();
        assert_eq!(report.elements, 1);
        assert!(out.starts_with("<p>Table 1 A<br/>\n<T: B/>\n<table>"), "got: {out}");
        assert!(out.contains("<td>y</td>"), "got: {out}");
    }

    #[test]
    fn test_fenced_declarations_are_untouched() {
        let input = format!("```\n<T: k|Example/>\n<t: k/>\n```\n<T: real|Real/>\n{TABLE}\n<t: real/>\n");
        let (out, report) = run(&input, false).unwrap();
        assert_eq!(report.elements, 1);
        assert_eq!(report.references, 1);
        assert!(out.starts_with("```\n<T: k|Example/>\n<t: k/>\n```\n<p>Table 1 Real<br/>\n"), "got: {out}");
        assert!(out.ends_with("Table 1\n"), "got: {out}");
    }

    #[test]
    fn test_lines_after_table_are_scanned() {
        // Every declaration after a table is still found.
        let input = format!("<T: A/>\n{TABLE}\nmiddle\n<T: B/>\n{TABLE}");
        let (out, report) = run(&input, false).unwrap();
        assert_eq!(report.elements, 2);
        assert!(out.contains("\nmiddle\n"));
        assert!(!out.contains("<T:"));
    }

    #[test]
    fn test_unresolved_table_reference() {
        let err = run("<t: nope/>\n", false).unwrap_err();
        assert!(matches!(
            err,
            EzmdError::UnresolvedReference {
                kind: CaptionKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_plain_pipe_tables_untouched() {
        let (out, report) = run(TABLE, false).unwrap();
        assert_eq!(report.elements, 0);
        assert_eq!(out, TABLE);
    }

    #[test]
    fn test_output_has_no_embedded_newlines() {
        let input = format!("<T: A/>\n{TABLE}");
        let mut doc = Document::parse(&input);
        process_tables(&mut doc, &config(false)).unwrap();
        assert!(doc.lines().iter().all(|l| !l.contains('\n')));
    }
}
