//! Document – the frozen per-page list of draw operations produced by layout
//! and consumed by the PDF renderer.
//!
//! Operations keep emission order within a page and pages keep document
//! order; nothing is reordered between layout and serialization. The whole
//! structure round-trips through JSON so a layout can be inspected or
//! re-rendered later.

use serde::{Deserialize, Serialize};

use crate::fonts::FontFace;
use crate::images::{EmbeddedImage, ImageFormat};

/// A complete paginated document ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages. Never empty.
    pub pages: Vec<Page>,
    /// Image resources referenced by [`DrawOp::PlaceImage`].
    pub images: Vec<ImageResource>,
}

/// One page of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Index into [`Document::images`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub usize);

/// A single drawing operation.
///
/// `x`/`y` are the top-left corner of the element's box in PDF user space
/// (origin bottom-left, y up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    PlaceText {
        x: f32,
        y: f32,
        font: FontFace,
        size: f32,
        text: String,
    },
    PlaceImage {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: ImageId,
    },
}

/// Encoded image bytes embedded once per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResource {
    pub src: String,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl From<EmbeddedImage> for ImageResource {
    fn from(img: EmbeddedImage) -> Self {
        Self {
            src: img.src,
            format: img.format,
            width_px: img.width_px,
            height_px: img.height_px,
            bytes: img.bytes,
        }
    }
}

impl Document {
    /// Number of draw operations across all pages.
    pub fn op_count(&self) -> usize {
        self.pages.iter().map(|p| p.ops.len()).sum()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Appends draw operations page by page.
///
/// Starts with one empty page, so a render with no content still yields a
/// single blank page. Earlier pages are never touched once a later page is
/// opened.
#[derive(Debug)]
pub struct DocumentBuilder {
    title: String,
    page_width_pt: f32,
    page_height_pt: f32,
    pages: Vec<Page>,
    images: Vec<ImageResource>,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>, page_width_pt: f32, page_height_pt: f32) -> Self {
        Self {
            title: title.into(),
            page_width_pt,
            page_height_pt,
            pages: vec![Page::default()],
            images: Vec::new(),
        }
    }

    /// Index of the page currently receiving operations.
    pub fn current_page_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn open_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn current_page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn push_text(&mut self, x: f32, y: f32, font: FontFace, size: f32, text: String) {
        self.current_page().ops.push(DrawOp::PlaceText {
            x,
            y,
            font,
            size,
            text,
        });
    }

    /// Register an image resource without placing it.
    pub fn add_image(&mut self, image: ImageResource) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    pub fn push_image(&mut self, x: f32, y: f32, width: f32, height: f32, image: ImageId) {
        self.current_page().ops.push(DrawOp::PlaceImage {
            x,
            y,
            width,
            height,
            image,
        });
    }

    pub fn finish(self) -> Document {
        Document {
            title: self.title,
            page_width_pt: self.page_width_pt,
            page_height_pt: self.page_height_pt,
            pages: self.pages,
            images: self.images,
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_with_blank_page() {
        let doc = DocumentBuilder::new("t", 595.28, 841.89).finish();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.op_count(), 0);
    }

    #[test]
    fn ops_land_on_current_page_in_order() {
        let mut builder = DocumentBuilder::new("t", 600.0, 800.0);
        builder.push_text(50.0, 750.0, FontFace::Regular, 12.0, "a".into());
        builder.open_page();
        builder.push_text(50.0, 750.0, FontFace::Bold, 12.0, "b".into());
        builder.push_text(50.0, 735.6, FontFace::Regular, 12.0, "c".into());
        assert_eq!(builder.current_page_index(), 1);

        let doc = builder.finish();
        let texts: Vec<Vec<&str>> = doc
            .pages
            .iter()
            .map(|p| {
                p.ops
                    .iter()
                    .filter_map(|op| match op {
                        DrawOp::PlaceText { text, .. } => Some(text.as_str()),
                        DrawOp::PlaceImage { .. } => None,
                    })
                    .collect()
            })
            .collect();
        assert_eq!(texts, vec![vec!["a"], vec!["b", "c"]]);
    }

    #[test]
    fn json_round_trip_keeps_image_bytes() {
        let mut builder = DocumentBuilder::new("t", 600.0, 800.0);
        let id = builder.add_image(ImageResource {
            src: "x.png".into(),
            format: ImageFormat::Png,
            width_px: 2,
            height_px: 1,
            bytes: vec![0, 1, 2, 254, 255],
        });
        builder.push_image(50.0, 750.0, 2.0, 1.0, id);
        let doc = builder.finish();

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"op\": \"place_image\""));
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }
}
