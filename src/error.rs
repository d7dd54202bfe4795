//! Error types for the ezmd library.
//!
//! Every failure is fatal for the document being compiled: the pipeline is
//! all-or-nothing, so a single [`EzmdError`] is returned from the top-level
//! `compile*` functions and no output file is written.
//!
//! The one recoverable condition in the tool, an output path whose extension
//! does not match the output type, is not an error at all; it is handled by
//! [`crate::output::resolve_output_path`] through a confirmation callback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which caption registry a reference tag was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptionKind {
    /// `<p: KEY/>` references to `![KEY|caption](path)` images.
    Picture,
    /// `<t: KEY/>` references to `<T: KEY|title/>` tables.
    Table,
}

impl fmt::Display for CaptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptionKind::Picture => f.write_str("picture"),
            CaptionKind::Table => f.write_str("table"),
        }
    }
}

/// All fatal errors returned by the ezmd library.
#[derive(Debug, Error)]
pub enum EzmdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// A `<p: KEY/>` or `<t: KEY/>` tag names a key that was never declared.
    #[error("{kind} reference cannot be resolved: no {kind} is registered with key '{key}'")]
    UnresolvedReference { kind: CaptionKind, key: String },

    /// A `<T: …/>` declaration is not followed by any `|` table rows.
    #[error("table declaration '{title}' on line {line} is not followed by a table")]
    MalformedTable { line: usize, title: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// A custom stylesheet was requested but does not exist.
    #[error("Stylesheet not found: '{path}'")]
    StylesheetNotFound { path: PathBuf },

    /// No HTML-to-PDF engine could be located.
    #[error(
        "No PDF engine found.\n\
Install wkhtmltopdf or Chrome/Chromium, or point EZMD_PDF_ENGINE at one of them.\n\
Use --type html to skip PDF rendering."
    )]
    PdfEngineNotFound,

    /// The PDF engine ran but did not produce a PDF.
    #[error("PDF rendering failed with '{engine}': {detail}")]
    PdfRenderFailed { engine: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resolved output path is the input file itself.
    #[error("Output '{path}' would overwrite the input file\nPass a different --output.")]
    OutputOverwritesInput { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
