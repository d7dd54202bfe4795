//! Compilation entry points.
//!
//! [`transform`] runs the rewrite passes on a markdown string,
//! [`render_html`] turns the rewritten markdown into a styled page, and
//! [`compile_file`] does both for a file on disk, writing the output only
//! after every step has succeeded.

use crate::config::{CompileConfig, OutputType};
use crate::document::Document;
use crate::error::EzmdError;
use crate::output::{CompileStats, CompiledDocument};
use crate::pipeline::{pdf, pictures, render as bridge, sections, tables, title};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Placeholder line inserted by `title_header`.
pub const TITLE_PLACEHOLDER: &str = "<x-title/>";

/// Run the rewrite passes over `source`.
///
/// Passes run in a fixed order: section numbers, pictures, tables, title.
///
/// # Errors
/// - [`EzmdError::UnresolvedReference`] for `<p: KEY/>` / `<t: KEY/>` tags
///   naming an undeclared key
/// - [`EzmdError::MalformedTable`] for a `<T: …/>` with no table after it
/// - [`EzmdError::InvalidConfig`] when `config` fails validation
pub fn transform(source: &str, config: &CompileConfig) -> Result<CompiledDocument, EzmdError> {
    let start = Instant::now();
    config.validate()?;
    if config.mathjax {
        debug!("MathJax is not supported; ignoring the mathjax flag");
    }

    let mut doc = Document::parse(source);
    let mut stats = CompileStats::default();

    if config.title_header {
        if config.title.is_some() {
            doc.prepend(TITLE_PLACEHOLDER);
        } else {
            warn!("--title-header has no effect without --title");
        }
    }

    if config.number_sections {
        stats.headings_numbered = sections::number_sections(&mut doc);
        debug!(headings = stats.headings_numbered, "section numbering complete");
    }

    let picture_report = pictures::process_pictures(&mut doc, config)?;
    stats.figures = picture_report.elements;
    stats.figure_references = picture_report.references;

    let table_report = tables::process_tables(&mut doc, config)?;
    stats.tables = table_report.elements;
    stats.table_references = table_report.references;

    if let Some(title_config) = &config.title {
        stats.title_blocks = title::inject_title(&mut doc, title_config);
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    Ok(CompiledDocument {
        markdown: doc.to_text(),
        stats,
    })
}

/// Render rewritten markdown into a standalone HTML page.
pub fn render_html(markdown: &str, config: &CompileConfig) -> Result<String, EzmdError> {
    let stylesheet = bridge::load_stylesheet(config.stylesheet.as_deref())?;
    let body = bridge::markdown_to_html(markdown);
    Ok(bridge::html_page(&body, &stylesheet))
}

/// Compile `input` and write the configured artifact to `output`.
///
/// Nothing is written unless every pass and the renderer succeed.
pub fn compile_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CompileConfig,
) -> Result<CompileStats, EzmdError> {
    let start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref();
    info!("Compiling {} → {}", input.display(), output.display());

    let source = read_input(input)?;
    guard_overwrite(input, output)?;

    let compiled = transform(&source, config)?;
    let mut stats = compiled.stats;

    stats.output_bytes = match config.output_type {
        OutputType::Markdown => write_output(output, compiled.markdown.as_bytes())?,
        OutputType::Html => {
            let page = render_html(&compiled.markdown, config)?;
            write_output(output, page.as_bytes())?
        }
        OutputType::Pdf => {
            let page = render_html(&compiled.markdown, config)?;
            let base_dir = input
                .canonicalize()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf));
            pdf::html_to_pdf(&page, output, base_dir.as_deref())?
        }
    };

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        bytes = stats.output_bytes,
        ms = stats.total_duration_ms,
        "Wrote {}",
        output.display()
    );
    Ok(stats)
}

fn read_input(path: &Path) -> Result<String, EzmdError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => EzmdError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => EzmdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => EzmdError::ReadFailed {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Refuse to write the artifact over the source document.
fn guard_overwrite(input: &Path, output: &Path) -> Result<(), EzmdError> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(EzmdError::OutputOverwritesInput {
            path: output.to_path_buf(),
        });
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<usize, EzmdError> {
    std::fs::write(path, bytes).map_err(|source| EzmdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len())
}
