//! Rewrite passes and the render bridge.
//!
//! Each submodule implements exactly one step. The passes run in a fixed
//! order: the table pass must not see image lines as table rows, and the
//! title block must not be numbered.
//!
//! ```text
//! sections ──▶ pictures ──▶ tables ──▶ title ──▶ render (──▶ pdf)
//! (numbers)    (figures)    (tables)   (<x-title/>)  (comrak)   (engine)
//! ```
//!
//! 1. [`sections`]: hierarchical heading numbers
//! 2. [`pictures`]: image paragraphs, figure captions, `<p: KEY/>`
//! 3. [`tables`]:   `<T: …/>` declarations, table captions, `<t: KEY/>`
//! 4. [`title`]:    `<x-title/>` placeholder substitution
//! 5. [`render`]:   markdown → HTML and the page template
//! 6. [`pdf`]:      HTML → PDF through an external engine
//!
//! [`captions`] holds the registry and reference resolution shared by 2 and 3.

pub mod captions;
pub mod pdf;
pub mod pictures;
pub mod render;
pub mod sections;
pub mod tables;
pub mod title;

use serde::{Deserialize, Serialize};

/// What a captioning pass did to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Pictures or tables rewritten.
    pub elements: usize,
    /// Reference tags resolved.
    pub references: usize,
}
