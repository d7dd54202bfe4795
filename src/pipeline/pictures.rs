//! Picture pass: images become centred and/or captioned HTML paragraphs.
//!
//! A line starting with `![alt](path)` is rendered to HTML on its own. The
//! alt text may carry a reference key, `![KEY|caption](path)`; later
//! `<p: KEY/>` tags resolve to `"<label> <id>"`.

use super::captions::{resolve_references, split_caption, CaptionRegistry};
use super::render::markdown_to_html;
use super::PassReport;
use crate::config::CompileConfig;
use crate::document::{Document, FenceTracker};
use crate::error::{CaptionKind, EzmdError};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Style injected into the wrapping `<p>` of a centred picture.
pub(crate) const CENTER_STYLE: &str = r#"style="width: 100vw; text-align: center;""#;

static RE_PICTURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\s*\[([^\]]+)\]\s*\(([^)]+)\)").unwrap());

static RE_PICTURE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*p\s*:\s*([^/\s]+)\s*/\s*>").unwrap());

/// Rewrite images and resolve `<p: KEY/>` references.
///
/// Does nothing unless picture centering or figure captions are enabled.
pub fn process_pictures(
    doc: &mut Document,
    config: &CompileConfig,
) -> Result<PassReport, EzmdError> {
    let center = config.center_pictures;
    let caption = config.figure_captions;
    if !center && !caption {
        return Ok(PassReport::default());
    }

    let label = config.figure_caption_label.as_str();
    let mut registry = CaptionRegistry::new(CaptionKind::Picture);
    let mut report = PassReport::default();

    let mut fence = FenceTracker::default();
    for line in doc.lines_mut() {
        if fence.in_code(line) {
            continue;
        }
        let Some(caps) = RE_PICTURE.captures(line) else {
            continue;
        };
        let Some(whole) = caps.get(0) else { continue };
        let (key, text) = split_caption(&caps[1]);
        let src = caps[2].trim();
        let tail = &line[whole.end()..];

        let mut html = markdown_to_html(&format!("![{text}]({src}){tail}"))
            .trim()
            .to_string();
        if center {
            html = html.replacen("<p>", &format!("<p {CENTER_STYLE}>"), 1);
        }
        if caption {
            // Unkeyed pictures are not counted; they carry the last keyed id.
            let id = match key {
                Some(key) => registry.register(Some(key)),
                None => registry.len(),
            };
            html = append_caption(&html, &format!("{label} {id} {text}"));
        }
        debug!(src, "rendered picture");
        *line = html;
        report.elements += 1;
    }

    if caption {
        report.references = resolve_references(doc, &RE_PICTURE_REF, &registry, label)?;
    }
    info!(
        pictures = report.elements,
        references = report.references,
        "picture pass complete"
    );
    Ok(report)
}

/// Put `<br/>caption` just before the closing `</p>`.
fn append_caption(html: &str, caption: &str) -> String {
    match html.rfind("</p>") {
        Some(idx) => format!("{}<br/>{}{}", &html[..idx], caption, &html[idx..]),
        None => format!("{html}<br/>{caption}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(center: bool, caption: bool) -> CompileConfig {
        CompileConfig::builder()
            .center_pictures(center)
            .figure_captions(caption)
            .build()
            .unwrap()
    }

    #[test]
    fn test_keyed_caption_and_reference() {
        let mut doc = Document::parse("![fig1|A cat](cat.png)\n\nAs <p: fig1/> shows.\n");
        let report = process_pictures(&mut doc, &config(false, true)).unwrap();
        assert_eq!(report.elements, 1);
        assert_eq!(report.references, 1);

        let lines = doc.lines();
        assert!(lines[0].starts_with("<p>"), "got: {}", lines[0]);
        assert!(lines[0].contains("src=\"cat.png\""));
        assert!(lines[0].ends_with("<br/>Figure 1 A cat</p>"), "got: {}", lines[0]);
        assert!(!lines[0].contains("fig1"), "key must not leak: {}", lines[0]);
        assert_eq!(lines[2], "As Figure 1 shows.");
    }

    #[test]
    fn test_unkeyed_pictures_take_no_id() {
        let input = "![One](1.png)\n![b|Two](2.png)\n![Three](3.png)\n![c|Four](4.png)\n<p: b/> <p: c/>\n";
        let mut doc = Document::parse(input);
        let report = process_pictures(&mut doc, &config(false, true)).unwrap();
        let lines = doc.lines();
        assert!(lines[0].contains("Figure 0 One"), "got: {}", lines[0]);
        assert!(lines[1].contains("Figure 1 Two"), "got: {}", lines[1]);
        assert!(lines[2].contains("Figure 1 Three"), "got: {}", lines[2]);
        assert!(lines[3].contains("Figure 2 Four"), "got: {}", lines[3]);
        assert_eq!(lines[4], "Figure 1 Figure 2");
        assert_eq!(report.elements, 4);
    }

    #[test]
    fn test_unkeyed_picture_does_not_shift_references() {
        let mut doc = Document::parse("![One](1.png)\n![b|Two](2.png)\n\n<p: b/>\n");
        process_pictures(&mut doc, &config(false, true)).unwrap();
        let lines = doc.lines();
        assert!(lines[1].ends_with("<br/>Figure 1 Two</p>"), "got: {}", lines[1]);
        assert_eq!(lines[3], "Figure 1");
    }

    #[test]
    fn test_pictures_in_fenced_code_are_untouched() {
        let input = "```markdown\n![k|Shown](x.png)\n<p: k/>\n```\n![a|Real](a.png)\n<p: a/>\n";
        let mut doc = Document::parse(input);
        let report = process_pictures(&mut doc, &config(true, true)).unwrap();
        let lines = doc.lines();
        assert_eq!(report.elements, 1);
        assert_eq!(report.references, 1);
        assert_eq!(lines[1], "![k|Shown](x.png)");
        assert_eq!(lines[2], "<p: k/>");
        assert!(lines[4].contains("Figure 1 Real"), "got: {}", lines[4]);
        assert_eq!(lines[5], "Figure 1");
    }

    #[test]
    fn test_centering_without_caption() {
        let mut doc = Document::parse("![A cat](cat.png)\n<p: cat/>\n");
        process_pictures(&mut doc, &config(true, false)).unwrap();
        let lines = doc.lines();
        assert!(
            lines[0].starts_with(r#"<p style="width: 100vw; text-align: center;">"#),
            "got: {}",
            lines[0]
        );
        assert!(!lines[0].contains("Figure"));
        // References are only resolved when captions are on.
        assert_eq!(lines[1], "<p: cat/>");
    }

    #[test]
    fn test_custom_label() {
        let cfg = CompileConfig::builder()
            .figure_captions(true)
            .figure_caption_label("Fig.")
            .build()
            .unwrap();
        let mut doc = Document::parse("![k|Plot](plot.svg)\n<p: k/>\n");
        process_pictures(&mut doc, &cfg).unwrap();
        assert!(doc.lines()[0].contains("<br/>Fig. 1 Plot</p>"));
        assert_eq!(doc.lines()[1], "Fig. 1");
    }

    #[test]
    fn test_disabled_is_noop() {
        let input = "![fig1|A cat](cat.png)\n<p: missing/>\n";
        let mut doc = Document::parse(input);
        let report = process_pictures(&mut doc, &config(false, false)).unwrap();
        assert_eq!(report, PassReport::default());
        assert_eq!(doc.to_text(), input);
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let mut doc = Document::parse("![a|A](a.png)\n<p: b/>\n");
        let err = process_pictures(&mut doc, &config(false, true)).unwrap_err();
        assert!(matches!(
            err,
            EzmdError::UnresolvedReference {
                kind: CaptionKind::Picture,
                ..
            }
        ));
    }

    #[test]
    fn test_image_not_at_line_start_is_left_alone() {
        let input = "Inline ![x](x.png) image\n";
        let mut doc = Document::parse(input);
        let report = process_pictures(&mut doc, &config(true, true)).unwrap();
        assert_eq!(report.elements, 0);
        assert_eq!(doc.to_text(), input);
    }

    #[test]
    fn test_append_caption() {
        assert_eq!(
            append_caption("<p><img src=\"a\" /></p>", "Figure 1 A"),
            "<p><img src=\"a\" /><br/>Figure 1 A</p>"
        );
    }
}
