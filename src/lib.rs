//! # article-pdf – paginated PDF rendering for cleaned web articles
//!
//! The crate turns an ordered list of content nodes into a multi-page PDF.
//! The pipeline stages are:
//!
//! 1. **Extract** – HTML page → ordered [`ContentNode`]s ([`dom`], [`extract`])
//! 2. **Style** – fixed typography per node kind ([`style`])
//! 3. **Embed** – fetch and size images, optionally in parallel ([`images`])
//! 4. **Layout** – greedy line wrapping ([`fonts`]) and page breaking
//!    ([`pagination`]) into positioned draw ops ([`layout`], [`document`])
//! 5. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! [`pipeline`] runs the whole chain in one call.

pub mod content;
pub mod document;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod images;
pub mod layout;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use content::{ContentNode, HeadingLevel};
pub use document::{Document, DrawOp};
pub use error::{ImageError, RenderError, Result};
pub use images::{DefaultFetcher, ImageFetcher};
pub use pipeline::{
    generate_pdf, generate_pdf_from_html, render_nodes, PageOrientation, RenderConfig,
};
