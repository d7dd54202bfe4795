//! # ezmd
//!
//! Easy markdown compiler: number sections, caption and center figures and
//! tables, inject a title page, then render to HTML or PDF.
//!
//! ezmd is not a markdown parser. It rewrites the document line by line with
//! a handful of regex passes and leaves the actual markdown → HTML step to
//! comrak and the HTML → PDF step to an external engine.
//!
//! ## Pipeline Overview
//!
//! ```text
//! markdown
//!  │
//!  ├─ 1. Sections  `# Intro` → `# 1 Intro`, `## Sub` → `## 1.1 Sub`
//!  ├─ 2. Pictures  `![fig|A cat](cat.png)` → captioned <p>, `<p: fig/>` → `Figure 1`
//!  ├─ 3. Tables    `<T: t|Results/>` + pipe rows → captioned <table>, `<t: t/>` → `Table 1`
//!  ├─ 4. Title     `<x-title/>` → <h1>/<h2> title block
//!  └─ 5. Render    markdown | HTML page | PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ezmd::{transform, CompileConfig};
//!
//! let config = CompileConfig::builder()
//!     .number_sections(true)
//!     .build()
//!     .unwrap();
//! let out = transform("# Intro\n## Sub\n# Next\n", &config).unwrap();
//! assert_eq!(out.markdown, "# 1 Intro\n## 1.1 Sub\n# 2 Next\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ezmd` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compile;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compile::{compile_file, render_html, transform};
pub use config::{CompileConfig, CompileConfigBuilder, OutputType, TitleConfig, TitleDate};
pub use document::Document;
pub use error::{CaptionKind, EzmdError};
pub use output::{resolve_output_path, CompileStats, CompiledDocument};
