//! Markdown → HTML bridge and the HTML page template.
//!
//! The rewrite passes never parse markdown themselves. Whenever they need
//! HTML (a single image span, a table block, the final document) they go
//! through [`markdown_to_html`], so every fragment is rendered with the same
//! comrak options as the final document.

use crate::error::EzmdError;
use comrak::{markdown_to_html as comrak_to_html, Options};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Stylesheet inlined when no `--css` file is given.
pub const DEFAULT_STYLESHEET: &str = include_str!("../../assets/github.css");

/// Rules appended after the stylesheet on every page.
const ADDITIONAL_STYLE: &str = "
pre {
    background: #eee;
    padding: 5px;
    border-radius: 5px;
}
html {
    background: #fff;
}
";

fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.footnotes = true;
    // Captions, title blocks and tables are spliced in as raw HTML.
    options.render.unsafe_ = true;
    options
}

/// Render a markdown fragment or document to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    comrak_to_html(markdown, &options())
}

/// Read the stylesheet at `path`, or fall back to the bundled one.
pub fn load_stylesheet(path: Option<&Path>) -> Result<Cow<'static, str>, EzmdError> {
    let Some(path) = path else {
        return Ok(Cow::Borrowed(DEFAULT_STYLESHEET));
    };
    if !path.is_file() {
        return Err(EzmdError::StylesheetNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Loading stylesheet: {}", path.display());
    std::fs::read_to_string(path)
        .map(Cow::Owned)
        .map_err(|source| EzmdError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Wrap rendered `body` HTML in a standalone page with `stylesheet` inlined.
pub fn html_page(body: &str, stylesheet: &str) -> String {
    format!(
        "<html>
    <head>
        <meta charset=\"utf-8\">
        <style>{stylesheet}{ADDITIONAL_STYLE}</style>
    </head>
    <body>{body}</body>
</html>"
    )
}
