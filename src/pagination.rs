//! Pagination – tracks the vertical position on the current page and decides
//! when content must move to a fresh page.
//!
//! Coordinates are PDF user space: origin at the bottom-left, y grows
//! upwards. The cursor starts each page at `page_height - margin_top` and
//! moves down as content is placed. Overflow is checked element by element
//! with no look-ahead.

use serde::{Deserialize, Serialize};

/// Default page margins in points.
pub const PAGE_MARGIN_PT: f32 = 50.0;

/// Fixed page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(pt: f32) -> Self {
        Self {
            top: pt,
            right: pt,
            bottom: pt,
            left: pt,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(PAGE_MARGIN_PT)
    }
}

/// Page size plus margins; identical for every page of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    /// Y of the top edge of the printable box.
    pub fn top(&self) -> f32 {
        self.height - self.margins.top
    }

    /// Y of the bottom edge of the printable box.
    pub fn bottom(&self) -> f32 {
        self.margins.bottom
    }

    pub fn left(&self) -> f32 {
        self.margins.left
    }

    pub fn content_width(&self) -> f32 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn printable_height(&self) -> f32 {
        (self.top() - self.bottom()).max(0.0)
    }
}

/// Position of the next element: page index and the y of its top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page_index: usize,
    pub y: f32,
}

impl LayoutCursor {
    /// Cursor at the top of the first page.
    pub fn start(geometry: &PageGeometry) -> Self {
        Self {
            page_index: 0,
            y: geometry.top(),
        }
    }

    /// True when nothing has been placed on the current page yet.
    pub fn at_page_top(&self, geometry: &PageGeometry) -> bool {
        self.y >= geometry.top()
    }

    /// Move down by `amount` points on the same page.
    pub fn advance(self, amount: f32) -> Self {
        Self {
            y: self.y - amount,
            ..self
        }
    }
}

/// Outcome of [`ensure_space`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub cursor: LayoutCursor,
    /// A new page was opened to make room.
    pub page_break: bool,
}

/// Make sure `needed` points fit below the cursor, opening a new page if not.
///
/// An element taller than the whole printable height stays on the current
/// page when that page is still empty; breaking again would only produce
/// another empty page.
pub fn ensure_space(cursor: LayoutCursor, needed: f32, geometry: &PageGeometry) -> Placement {
    if cursor.y - needed >= geometry.bottom() || cursor.at_page_top(geometry) {
        return Placement {
            cursor,
            page_break: false,
        };
    }

    log::debug!(
        "page break before page {}: needed {:.1}pt, {:.1}pt left",
        cursor.page_index + 1,
        needed,
        cursor.y - geometry.bottom()
    );
    Placement {
        cursor: LayoutCursor {
            page_index: cursor.page_index + 1,
            y: geometry.top(),
        },
        page_break: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageGeometry {
        PageGeometry {
            width: 595.28,
            height: 841.89,
            margins: Margins::uniform(50.0),
        }
    }

    #[test]
    fn fits_without_break() {
        let geo = a4();
        let cursor = LayoutCursor::start(&geo);
        let placed = ensure_space(cursor, 14.4, &geo);
        assert!(!placed.page_break);
        assert_eq!(placed.cursor, cursor);
    }

    #[test]
    fn overflow_opens_new_page_at_top() {
        let geo = a4();
        let cursor = LayoutCursor {
            page_index: 2,
            y: 60.0,
        };
        let placed = ensure_space(cursor, 14.4, &geo);
        assert!(placed.page_break);
        assert_eq!(placed.cursor.page_index, 3);
        assert_eq!(placed.cursor.y, geo.top());
    }

    #[test]
    fn exact_fit_stays() {
        let geo = a4();
        let cursor = LayoutCursor {
            page_index: 0,
            y: 64.0,
        };
        assert!(!ensure_space(cursor, 14.0, &geo).page_break);
    }

    #[test]
    fn oversized_element_on_empty_page_does_not_break() {
        let geo = a4();
        let cursor = LayoutCursor::start(&geo);
        let placed = ensure_space(cursor, geo.printable_height() * 3.0, &geo);
        assert!(!placed.page_break);

        // ...but it does move off a page that already holds content.
        let used = cursor.advance(10.0);
        assert!(ensure_space(used, geo.printable_height() * 3.0, &geo).page_break);
    }

    #[test]
    fn geometry_boxes() {
        let geo = a4();
        assert!((geo.content_width() - 495.28).abs() < 1e-3);
        assert!((geo.printable_height() - 741.89).abs() < 1e-3);
        assert_eq!(geo.left(), 50.0);
    }
}
