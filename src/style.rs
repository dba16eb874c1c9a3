//! Typography table – maps each content node kind to a fixed text style.
//!
//! The lookup is an exhaustive match over [`ContentNode`], so adding a node
//! kind without a style is a compile error.

use crate::content::{ContentNode, HeadingLevel};
use crate::fonts::FontFace;

/// Line box height as a multiple of the point size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Immutable text style for one node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRule {
    pub font: FontFace,
    pub font_size: f32,
    /// Vertical gap inserted after the element, in points.
    pub spacing_after: f32,
    /// Hard line breaks in the payload start new lines (code blocks).
    pub preserve_line_breaks: bool,
}

impl StyleRule {
    const fn text(font: FontFace, font_size: f32, spacing_after: f32) -> Self {
        Self {
            font,
            font_size,
            spacing_after,
            preserve_line_breaks: false,
        }
    }

    const fn verbatim(font_size: f32, spacing_after: f32) -> Self {
        Self {
            font: FontFace::Regular,
            font_size,
            spacing_after,
            preserve_line_breaks: true,
        }
    }

    /// Height of one line box.
    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR
    }
}

pub const H1: StyleRule = StyleRule::text(FontFace::Bold, 24.0, 12.0);
pub const H2: StyleRule = StyleRule::text(FontFace::Bold, 20.0, 10.0);
pub const H3: StyleRule = StyleRule::text(FontFace::Bold, 16.0, 8.0);
pub const H4: StyleRule = StyleRule::text(FontFace::Bold, 14.0, 8.0);
pub const H5: StyleRule = StyleRule::text(FontFace::Bold, 12.0, 6.0);
pub const H6: StyleRule = StyleRule::text(FontFace::Bold, 11.0, 6.0);
pub const PARAGRAPH: StyleRule = StyleRule::text(FontFace::Regular, 12.0, 6.0);
pub const CODE: StyleRule = StyleRule::verbatim(10.0, 6.0);
pub const PREFORMATTED: StyleRule = StyleRule::verbatim(10.0, 8.0);

pub fn heading_style(level: HeadingLevel) -> StyleRule {
    match level {
        HeadingLevel::H1 => H1,
        HeadingLevel::H2 => H2,
        HeadingLevel::H3 => H3,
        HeadingLevel::H4 => H4,
        HeadingLevel::H5 => H5,
        HeadingLevel::H6 => H6,
    }
}

/// Text payload and style of a text node. `None` exactly for image nodes,
/// which are sized by the image embedder instead.
pub fn text_style(node: &ContentNode) -> Option<(&str, StyleRule)> {
    match node {
        ContentNode::Heading { level, text } => Some((text.as_str(), heading_style(*level))),
        ContentNode::Paragraph { text } => Some((text.as_str(), PARAGRAPH)),
        ContentNode::Code { text } => Some((text.as_str(), CODE)),
        ContentNode::Preformatted { text } => Some((text.as_str(), PREFORMATTED)),
        ContentNode::Image { .. } => None,
    }
}
