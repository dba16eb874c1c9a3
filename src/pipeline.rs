//! Pipeline – ties together image prefetch, layout, pagination and
//! rendering into a single function call.

use serde::Deserialize;

use crate::content::{document_title, ContentNode};
use crate::document::Document;
use crate::error::Result;
use crate::extract::extract_article;
use crate::images::{embed_all, DefaultFetcher, ImageFetcher};
use crate::layout::{layout_document, LayoutSettings};
use crate::pagination::{Margins, PageGeometry};
use crate::render::render_pdf;

/// A4 width in points.
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: page width and height swap.
    Landscape,
}

/// Configuration for one render.
///
/// Every field has a default, so a JSON config only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Title embedded in the PDF metadata. `None` uses the document's first
    /// level-1 heading.
    pub title: Option<String>,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Fixed page margins (default: 50pt on every side).
    pub margins: Margins,
    /// Swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Gap below every image, in points.
    pub image_spacing: f32,
    /// Fetch images concurrently before the layout pass.
    pub prefetch_images: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: None,
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margins: Margins::default(),
            orientation: PageOrientation::Portrait,
            image_spacing: 10.0,
            prefetch_images: true,
        }
    }
}

impl RenderConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.effective_width(),
            height: self.effective_height(),
            margins: self.margins,
        }
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn settings_for(&self, nodes: &[ContentNode]) -> LayoutSettings {
        LayoutSettings {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| document_title(nodes)),
            geometry: self.geometry(),
            image_spacing: self.image_spacing,
        }
    }
}

/// Lay out `nodes` without rendering.
///
/// Image sources are resolved through `fetcher` up front (concurrently when
/// `config.prefetch_images` is set) and consumed in node order.
pub fn compute_document(
    nodes: &[ContentNode],
    config: &RenderConfig,
    fetcher: &dyn ImageFetcher,
) -> Document {
    let srcs: Vec<&str> = nodes
        .iter()
        .filter_map(|node| match node {
            ContentNode::Image { src } => Some(src.as_str()),
            _ => None,
        })
        .collect();
    let images = embed_all(&srcs, fetcher, config.prefetch_images);
    let failed = images.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::debug!("{failed} of {} images could not be embedded", srcs.len());
    }

    layout_document(nodes, images, &config.settings_for(nodes))
}

/// Full pipeline: nodes → PDF bytes, using an injected fetcher.
///
/// Returns `(pdf_bytes, document)`.
pub fn render_nodes(
    nodes: &[ContentNode],
    config: &RenderConfig,
    fetcher: &dyn ImageFetcher,
) -> Result<(Vec<u8>, Document)> {
    let document = compute_document(nodes, config, fetcher);
    let bytes = render_pdf(&document)?;
    log::info!(
        "rendered {:?}: {} nodes, {} pages, {} images, {} bytes",
        document.title,
        nodes.len(),
        document.pages.len(),
        document.images.len(),
        bytes.len()
    );
    Ok((bytes, document))
}

/// Full pipeline with the [`DefaultFetcher`].
pub fn generate_pdf(nodes: &[ContentNode], config: &RenderConfig) -> Result<(Vec<u8>, Document)> {
    render_nodes(nodes, config, &DefaultFetcher::default())
}

/// Extract an article from `html` and render it.
///
/// The page's own title is used when `config.title` is unset.
pub fn generate_pdf_from_html(
    html: &str,
    base_url: Option<&str>,
    config: &RenderConfig,
) -> Result<(Vec<u8>, Document)> {
    let article = extract_article(html, base_url);
    let config = RenderConfig {
        title: config.title.clone().or(Some(article.title)),
        ..config.clone()
    };
    generate_pdf(&article.nodes, &config)
}
