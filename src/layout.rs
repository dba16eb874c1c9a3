//! Layout engine – walks content nodes in reading order and turns them into
//! positioned draw operations on pages.
//!
//! This pass does no I/O: image nodes consume pre-resolved embedding results
//! in node order. The cursor is threaded through every step by value.

use crate::content::ContentNode;
use crate::document::{Document, DocumentBuilder};
use crate::error::ImageError;
use crate::fonts::wrap_text;
use crate::images::EmbeddedImage;
use crate::pagination::{ensure_space, LayoutCursor, PageGeometry};
use crate::style::{text_style, StyleRule};

/// Fixed per-render inputs to the layout pass.
#[derive(Debug, Clone)]
pub struct LayoutSettings {
    pub title: String,
    pub geometry: PageGeometry,
    /// Vertical gap reserved below every image, in points.
    pub image_spacing: f32,
}

/// Lay out `nodes` into a [`Document`].
///
/// `images` must yield one embedding result per image node, in node order.
/// Failed images are logged and skipped; a missing result is treated the
/// same way.
pub fn layout_document<I>(nodes: &[ContentNode], images: I, settings: &LayoutSettings) -> Document
where
    I: IntoIterator<Item = Result<EmbeddedImage, ImageError>>,
{
    let geometry = &settings.geometry;
    let mut pass = LayoutPass {
        settings,
        builder: DocumentBuilder::new(settings.title.clone(), geometry.width, geometry.height),
    };
    let mut images = images.into_iter();
    let mut cursor = LayoutCursor::start(geometry);

    for (index, node) in nodes.iter().enumerate() {
        cursor = match text_style(node) {
            Some((text, rule)) => pass.place_text(cursor, text, rule),
            None => match images.next() {
                Some(Ok(image)) => pass.place_image(cursor, image),
                Some(Err(e)) => {
                    log::warn!("Skipping image node {index}: {e}");
                    cursor
                }
                None => {
                    log::warn!("Skipping image node {index}: no embedding result");
                    cursor
                }
            },
        };
        debug_assert_eq!(cursor.page_index, pass.builder.current_page_index());
    }

    pass.builder.finish()
}

struct LayoutPass<'a> {
    settings: &'a LayoutSettings,
    builder: DocumentBuilder,
}

impl LayoutPass<'_> {
    fn geometry(&self) -> &PageGeometry {
        &self.settings.geometry
    }

    /// Reserve `needed` points, opening a page in the builder when the
    /// pagination step breaks.
    fn reserve(&mut self, cursor: LayoutCursor, needed: f32) -> LayoutCursor {
        let placement = ensure_space(cursor, needed, self.geometry());
        if placement.page_break {
            self.builder.open_page();
        }
        placement.cursor
    }

    /// Place one line box; `None` advances without drawing (blank line in a
    /// code block).
    fn place_line(&mut self, cursor: LayoutCursor, rule: &StyleRule, text: Option<String>) -> LayoutCursor {
        let line_height = rule.line_height();
        let cursor = self.reserve(cursor, line_height);
        if let Some(text) = text {
            let x = self.geometry().left();
            self.builder
                .push_text(x, cursor.y, rule.font, rule.font_size, text);
        }
        cursor.advance(line_height)
    }

    fn place_text(&mut self, mut cursor: LayoutCursor, text: &str, rule: StyleRule) -> LayoutCursor {
        if text.trim().is_empty() {
            return cursor;
        }
        let max_width = self.geometry().content_width();

        if rule.preserve_line_breaks {
            let source_lines: Vec<&str> = text.lines().collect();
            let first = source_lines.iter().position(|l| !l.trim().is_empty());
            let last = source_lines.iter().rposition(|l| !l.trim().is_empty());
            if let (Some(first), Some(last)) = (first, last) {
                for source in &source_lines[first..=last] {
                    if source.trim().is_empty() {
                        cursor = self.place_line(cursor, &rule, None);
                        continue;
                    }
                    for line in wrap_text(source, rule.font, rule.font_size, max_width) {
                        cursor = self.place_line(cursor, &rule, Some(line));
                    }
                }
            }
        } else {
            for line in wrap_text(text, rule.font, rule.font_size, max_width) {
                cursor = self.place_line(cursor, &rule, Some(line));
            }
        }

        cursor.advance(rule.spacing_after)
    }

    fn place_image(&mut self, cursor: LayoutCursor, image: EmbeddedImage) -> LayoutCursor {
        let geometry = *self.geometry();
        let (width, height) =
            image.display_size(geometry.content_width(), geometry.printable_height());
        let needed = height + self.settings.image_spacing;
        let cursor = self.reserve(cursor, needed);

        log::debug!(
            "placing image {} ({}x{} px) at {:.1}x{:.1}pt on page {}",
            image.src,
            image.width_px,
            image.height_px,
            width,
            height,
            cursor.page_index + 1
        );
        let id = self.builder.add_image(image.into());
        self.builder
            .push_image(geometry.left(), cursor.y, width, height, id);
        cursor.advance(needed)
    }
}
