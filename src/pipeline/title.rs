//! Title block injection for `<x-title/>` placeholders.

use crate::config::{TitleConfig, TitleDate};
use crate::document::Document;
use chrono::Local;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use tracing::info;

static RE_TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<x-title\s*>[^<]*</x-title>|<x-title\s*/?>").unwrap());

const PAGE_TITLE_STYLE: &str = r#" style="font-size: 64px;""#;
const PAGE_SUBTITLE_STYLE: &str = r#" style="font-size: 40px;""#;
const PAGE_BREAK: &str = r#"<div style="page-break-after: always;"></div>"#;

/// Resolve the date line; `Today` is formatted in local time.
pub fn resolve_date(date: &TitleDate) -> String {
    match date {
        TitleDate::Fixed(text) => text.clone(),
        TitleDate::Today { format } => Local::now().format(format).to_string(),
    }
}

/// Build the HTML title block. It always ends with a newline so the markdown
/// that follows starts after a blank line.
pub fn build_title_block(title: &TitleConfig) -> String {
    let (title_style, other_style) = if title.title_page {
        (PAGE_TITLE_STYLE, PAGE_SUBTITLE_STYLE)
    } else {
        ("", "")
    };

    let mut block = format!("<h1{title_style}>{}</h1>\n", title.title);
    if let Some(author) = &title.author {
        block.push_str(&format!("<h2{other_style}>{author}</h2>\n"));
    }
    if let Some(date) = &title.date {
        let date = resolve_date(date);
        block.push_str(&format!("<h2{other_style}>{date}</h2>\n<br/>\n<br/>\n"));
    }
    if title.title_page {
        block.push_str(PAGE_BREAK);
        block.push('\n');
    }
    block
}

/// Replace every title placeholder in `doc`; returns how many were replaced.
pub fn inject_title(doc: &mut Document, title: &TitleConfig) -> usize {
    if !doc.lines().iter().any(|l| RE_TITLE_TAG.is_match(l)) {
        return 0;
    }

    let block = build_title_block(title);
    let mut injected = 0;
    let mut out = Vec::with_capacity(doc.len() + 8);
    for line in doc.lines() {
        if RE_TITLE_TAG.is_match(line) {
            injected += RE_TITLE_TAG.find_iter(line).count();
            let replaced = RE_TITLE_TAG.replace_all(line, NoExpand(&block));
            out.extend(replaced.split('\n').map(str::to_string));
        } else {
            out.push(line.clone());
        }
    }
    doc.replace_lines(out);
    info!(placeholders = injected, "title block injected");
    injected
}
