//! Configuration types for markdown compilation.
//!
//! All compilation behaviour is controlled through [`CompileConfig`], built
//! via its [`CompileConfigBuilder`]. The CLI maps its flags onto the builder;
//! library callers set only what they need and rely on the defaults for the
//! rest.

use crate::error::EzmdError;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default caption label for figures (`--figure-caption-string`).
pub const DEFAULT_FIGURE_LABEL: &str = "Figure";

/// Default caption label for tables.
pub const DEFAULT_TABLE_LABEL: &str = "Table";

/// Default strftime format for `--date-as-today`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Configuration for one compilation run.
///
/// # Example
/// ```rust
/// use ezmd::{CompileConfig, OutputType};
///
/// let config = CompileConfig::builder()
///     .output_type(OutputType::Html)
///     .number_sections(true)
///     .figure_captions(true)
///     .build()
///     .unwrap();
/// assert!(config.number_sections);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Artifact to produce. Default: [`OutputType::Pdf`].
    pub output_type: OutputType,

    /// Prefix headings with hierarchical numbers (`1`, `1.1`, …). Default: false.
    pub number_sections: bool,

    /// Title block substituted for `<x-title/>` placeholders. Default: None.
    ///
    /// Without a title the placeholders are left as they are.
    pub title: Option<TitleConfig>,

    /// Insert a `<x-title/>` placeholder as the first line. Default: false.
    pub title_header: bool,

    /// Center images in their paragraph. Default: false.
    pub center_pictures: bool,

    /// Center tables and draw cell borders. Default: false.
    pub center_tables: bool,

    /// Append a numbered caption below every image. Default: false.
    pub figure_captions: bool,

    /// Label placed before figure numbers. Default: `"Figure"`.
    pub figure_caption_label: String,

    /// Label placed before table numbers. Default: `"Table"`.
    pub table_caption_label: String,

    /// Stylesheet inlined into HTML output. Default: None (bundled stylesheet).
    pub stylesheet: Option<PathBuf>,

    /// Accepted for compatibility; math rendering is not supported.
    pub mathjax: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            output_type: OutputType::default(),
            number_sections: false,
            title: None,
            title_header: false,
            center_pictures: false,
            center_tables: false,
            figure_captions: false,
            figure_caption_label: DEFAULT_FIGURE_LABEL.to_string(),
            table_caption_label: DEFAULT_TABLE_LABEL.to_string(),
            stylesheet: None,
            mathjax: false,
        }
    }
}

impl CompileConfig {
    /// Create a new builder for `CompileConfig`.
    pub fn builder() -> CompileConfigBuilder {
        CompileConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CompileConfig`].
#[derive(Debug)]
pub struct CompileConfigBuilder {
    config: CompileConfig,
}

impl CompileConfigBuilder {
    pub fn output_type(mut self, output_type: OutputType) -> Self {
        self.config.output_type = output_type;
        self
    }

    pub fn number_sections(mut self, v: bool) -> Self {
        self.config.number_sections = v;
        self
    }

    pub fn title(mut self, title: TitleConfig) -> Self {
        self.config.title = Some(title);
        self
    }

    pub fn title_header(mut self, v: bool) -> Self {
        self.config.title_header = v;
        self
    }

    /// Shorthand for `--centering`: center both pictures and tables.
    pub fn centering(mut self, v: bool) -> Self {
        self.config.center_pictures |= v;
        self.config.center_tables |= v;
        self
    }

    pub fn center_pictures(mut self, v: bool) -> Self {
        self.config.center_pictures = v;
        self
    }

    pub fn center_tables(mut self, v: bool) -> Self {
        self.config.center_tables = v;
        self
    }

    pub fn figure_captions(mut self, v: bool) -> Self {
        self.config.figure_captions = v;
        self
    }

    pub fn figure_caption_label(mut self, label: impl Into<String>) -> Self {
        self.config.figure_caption_label = label.into();
        self
    }

    pub fn table_caption_label(mut self, label: impl Into<String>) -> Self {
        self.config.table_caption_label = label.into();
        self
    }

    pub fn stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.stylesheet = Some(path.into());
        self
    }

    pub fn mathjax(mut self, v: bool) -> Self {
        self.config.mathjax = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompileConfig, EzmdError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl CompileConfig {
    /// Check the constraints [`CompileConfigBuilder::build`] enforces.
    ///
    /// The compile entry points call this too, so hand-assembled configs get
    /// the same checks.
    pub fn validate(&self) -> Result<(), EzmdError> {
        let c = self;
        if c.figure_caption_label.trim().is_empty() {
            return Err(EzmdError::InvalidConfig(
                "figure caption label must not be empty".into(),
            ));
        }
        if c.table_caption_label.trim().is_empty() {
            return Err(EzmdError::InvalidConfig(
                "table caption label must not be empty".into(),
            ));
        }
        if let Some(title) = &c.title {
            if let Some(TitleDate::Today { format }) = &title.date {
                validate_date_format(format)?;
            }
        }
        Ok(())
    }
}

/// Reject strftime strings chrono cannot format (formatting them would panic).
fn validate_date_format(format: &str) -> Result<(), EzmdError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(EzmdError::InvalidConfig(format!(
            "invalid date format '{format}'"
        )));
    }
    Ok(())
}

// ── Title block ──────────────────────────────────────────────────────────

/// Content of the generated title block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleConfig {
    /// Document title, rendered as `<h1>`.
    pub title: String,
    /// Optional author line, rendered as `<h2>`.
    pub author: Option<String>,
    /// Optional date line, rendered as `<h2>`.
    pub date: Option<TitleDate>,
    /// Put the title block on its own page with larger type.
    pub title_page: bool,
}

impl TitleConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            date: None,
            title_page: false,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn date(mut self, date: TitleDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn title_page(mut self, v: bool) -> Self {
        self.title_page = v;
        self
    }
}

/// Where the title block's date line comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleDate {
    /// Printed verbatim.
    Fixed(String),
    /// Today's local date, formatted with a strftime string.
    Today { format: String },
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Artifact produced by a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// Standalone HTML page with the stylesheet inlined.
    Html,
    /// PDF rendered from the HTML page by an external engine. (default)
    #[default]
    Pdf,
    /// The rewritten markdown itself.
    Markdown,
}

impl OutputType {
    /// Accepted file extensions, preferred one first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            OutputType::Html => &["html", "htm"],
            OutputType::Pdf => &["pdf"],
            OutputType::Markdown => &["md", "markdown"],
        }
    }

    /// Extension used when the output path is inferred.
    pub fn default_extension(self) -> &'static str {
        self.extensions()[0]
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Html => f.write_str("html"),
            OutputType::Pdf => f.write_str("pdf"),
            OutputType::Markdown => f.write_str("markdown"),
        }
    }
}
