//! Error types for the rendering engine.
//!
//! Image failures ([`ImageError`]) are recovered per node by the layout pass
//! and never reach the caller. Everything else surfaces as a [`RenderError`].

use std::io;
use thiserror::Error;

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Terminal errors that abort a whole render.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The PDF encoder rejected a page, font or image resource.
    #[error("PDF serialization failed: {0}")]
    Serialization(String),

    /// A content node could not be built or deserialized.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// JSON (de)serialization of nodes, configs or layouts.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error when reading inputs or writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors building content nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Heading levels are limited to 1..=6.
    #[error("invalid heading level {0}, expected 1-6")]
    InvalidHeadingLevel(u8),
}

/// Per-image failures. The node is skipped and rendering continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The source does not name one of the supported raster formats.
    #[error("unsupported image format: {src}")]
    Unsupported { src: String },

    /// The injected fetcher could not produce the image bytes.
    #[error("failed to fetch image {src}: {reason}")]
    Fetch { src: String, reason: String },

    /// The fetched bytes are not a decodable image.
    #[error("failed to decode image {src}: {reason}")]
    Decode { src: String, reason: String },
}

impl ImageError {
    /// The source URL of the image that failed.
    pub fn src(&self) -> &str {
        match self {
            ImageError::Unsupported { src }
            | ImageError::Fetch { src, .. }
            | ImageError::Decode { src, .. } => src,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_error_reports_source() {
        let err = ImageError::Fetch {
            src: "https://example.com/a.png".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(err.src(), "https://example.com/a.png");
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn content_error_wraps_transparently() {
        let err: RenderError = ContentError::InvalidHeadingLevel(9).into();
        assert_eq!(err.to_string(), "invalid heading level 9, expected 1-6");
    }
}
