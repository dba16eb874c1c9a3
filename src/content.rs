//! Content model – the block-level nodes the engine lays out.
//!
//! Nodes arrive already cleaned: text payloads are plain text with inline
//! markup resolved, and image sources are absolute URLs. Node order is
//! reading order and is preserved through layout and serialization.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Heading depth, `<h1>` through `<h6>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl TryFrom<u8> for HeadingLevel {
    type Error = ContentError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            4 => Ok(HeadingLevel::H4),
            5 => Ok(HeadingLevel::H5),
            6 => Ok(HeadingLevel::H6),
            other => Err(ContentError::InvalidHeadingLevel(other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        match level {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }
}

/// One normalized block of document content.
///
/// JSON form: `{"type": "heading", "level": 1, "text": "Title"}`,
/// `{"type": "paragraph", "text": "..."}`, `{"type": "image", "src": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    Heading { level: HeadingLevel, text: String },
    Paragraph { text: String },
    Code { text: String },
    Preformatted { text: String },
    Image { src: String },
}

impl ContentNode {
    pub fn heading(level: u8, text: impl Into<String>) -> Result<Self, ContentError> {
        Ok(ContentNode::Heading {
            level: HeadingLevel::try_from(level)?,
            text: text.into(),
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentNode::Paragraph { text: text.into() }
    }

    pub fn code(text: impl Into<String>) -> Self {
        ContentNode::Code { text: text.into() }
    }

    pub fn preformatted(text: impl Into<String>) -> Self {
        ContentNode::Preformatted { text: text.into() }
    }

    pub fn image(src: impl Into<String>) -> Self {
        ContentNode::Image { src: src.into() }
    }

    /// Text payload, or `None` for images.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentNode::Heading { text, .. }
            | ContentNode::Paragraph { text }
            | ContentNode::Code { text }
            | ContentNode::Preformatted { text } => Some(text),
            ContentNode::Image { .. } => None,
        }
    }

    /// Parse a JSON array of nodes.
    pub fn list_from_json(json: &str) -> Result<Vec<ContentNode>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Maximum length of a generated file name stem.
const MAX_FILE_STEM: usize = 100;

const FALLBACK_TITLE: &str = "article";

/// Title for a document: the first level-1 heading, else `"article"`.
pub fn document_title(nodes: &[ContentNode]) -> String {
    nodes
        .iter()
        .find_map(|node| match node {
            ContentNode::Heading {
                level: HeadingLevel::H1,
                text,
            } if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        })
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Turn a title into a portable `.pdf` file name.
///
/// Runs of characters other than ASCII letters, digits and whitespace become
/// a single space, whitespace collapses, and the stem is capped at 100
/// characters.
pub fn safe_file_name(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    let mut pending_space = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(ch);
        } else {
            pending_space = true;
        }
    }

    let stem: String = cleaned.chars().take(MAX_FILE_STEM).collect();
    let stem = stem.trim_end();
    if stem.is_empty() {
        format!("{FALLBACK_TITLE}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_bounds() {
        assert!(ContentNode::heading(1, "a").is_ok());
        assert!(ContentNode::heading(6, "a").is_ok());
        assert_eq!(
            ContentNode::heading(0, "a"),
            Err(ContentError::InvalidHeadingLevel(0))
        );
        assert_eq!(
            ContentNode::heading(7, "a"),
            Err(ContentError::InvalidHeadingLevel(7))
        );
    }

    #[test]
    fn nodes_from_json() {
        let json = r#"[
            {"type": "heading", "level": 2, "text": "Intro"},
            {"type": "paragraph", "text": "Body"},
            {"type": "preformatted", "text": "fn main() {}"},
            {"type": "image", "src": "https://example.com/x.png"}
        ]"#;
        let nodes = ContentNode::list_from_json(json).unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0], ContentNode::heading(2, "Intro").unwrap());
        assert_eq!(nodes[3], ContentNode::image("https://example.com/x.png"));
        assert_eq!(nodes[3].text(), None);
    }

    #[test]
    fn json_rejects_bad_heading_level() {
        let json = r#"[{"type": "heading", "level": 9, "text": "x"}]"#;
        assert!(ContentNode::list_from_json(json).is_err());
    }

    #[test]
    fn title_prefers_first_h1() {
        let nodes = vec![
            ContentNode::heading(2, "Section").unwrap(),
            ContentNode::heading(1, "  Main Title ").unwrap(),
            ContentNode::heading(1, "Second").unwrap(),
        ];
        assert_eq!(document_title(&nodes), "Main Title");
        assert_eq!(document_title(&[ContentNode::paragraph("x")]), "article");
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(safe_file_name("Rust: 2024 — What's New?"), "Rust 2024 What s New.pdf");
        assert_eq!(safe_file_name("  spaced   out  "), "spaced out.pdf");
        assert_eq!(safe_file_name("!!!"), "article.pdf");
        let long = "a".repeat(250);
        assert_eq!(safe_file_name(&long), format!("{}.pdf", "a".repeat(100)));
    }
}
