//! Image embedding – fetch raw bytes for an image node, check the format,
//! resolve intrinsic dimensions and compute the placed size.
//!
//! Byte fetching goes through the [`ImageFetcher`] trait so hosts can inject
//! their own transport. [`DefaultFetcher`] handles `data:` URIs, local files
//! and (with the `fetch` feature) `http(s)://` URLs.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// Raster formats the engine can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from a URL extension or a `data:` media type.
    ///
    /// Query strings and fragments are ignored. Anything outside the closed
    /// PNG/JPEG set is `None`.
    pub fn from_src(src: &str) -> Option<ImageFormat> {
        if let Some(rest) = src.strip_prefix("data:") {
            let media_type = rest.split([';', ',']).next()?.to_ascii_lowercase();
            return match media_type.as_str() {
                "image/png" => Some(ImageFormat::Png),
                "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
                _ => None,
            };
        }

        let path = src.split(['?', '#']).next().unwrap_or(src);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// A decoded-enough image: raw bytes plus intrinsic pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub src: String,
    pub width_px: u32,
    pub height_px: u32,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EmbeddedImage {
    /// Placed size in points (1 px = 1 pt).
    ///
    /// Width is capped at `max_width` and height at `max_height`, scaling
    /// uniformly. Images are never enlarged.
    pub fn display_size(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let (w, h) = (self.width_px as f32, self.height_px as f32);
        let display_width = max_width.min(w);
        let scale = display_width / w;
        let display_height = h * scale;
        if display_height > max_height && max_height > 0.0 {
            (w * max_height / h, max_height)
        } else {
            (display_width, display_height)
        }
    }
}

/// Host-supplied byte fetch capability.
pub trait ImageFetcher: Sync {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, String>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>, String> + Sync,
{
    fn fetch(&self, src: &str) -> Result<Vec<u8>, String> {
        self(src)
    }
}

/// Browser-like User-Agent; some sites refuse image requests without one.
#[cfg(feature = "fetch")]
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default timeout for remote image downloads.
#[cfg(feature = "fetch")]
pub const DEFAULT_FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Fetcher for `data:` URIs, local paths and remote URLs.
///
/// The HTTP client is created on the first remote fetch and shared by every
/// later one, including concurrent prefetch workers.
pub struct DefaultFetcher {
    allow_remote: bool,
    #[cfg(feature = "fetch")]
    timeout: std::time::Duration,
    #[cfg(feature = "fetch")]
    client: std::sync::OnceLock<Result<reqwest::blocking::Client, String>>,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self {
            allow_remote: true,
            #[cfg(feature = "fetch")]
            timeout: DEFAULT_FETCH_TIMEOUT,
            #[cfg(feature = "fetch")]
            client: std::sync::OnceLock::new(),
        }
    }

    /// Enable or disable `http(s)://` downloads.
    pub fn set_allow_remote(&mut self, allow: bool) {
        self.allow_remote = allow;
    }

    #[cfg(feature = "fetch")]
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self.client = std::sync::OnceLock::new();
        self
    }

    #[cfg(feature = "fetch")]
    pub fn timeout(&self) -> std::time::Duration {
        self.timeout
    }

    #[cfg(feature = "fetch")]
    fn client(&self) -> Result<&reqwest::blocking::Client, String> {
        self.client
            .get_or_init(|| {
                log::debug!("building HTTP client, timeout {:?}", self.timeout);
                reqwest::blocking::Client::builder()
                    .user_agent(USER_AGENT)
                    .timeout(self.timeout)
                    .build()
                    .map_err(|e| format!("HTTP client setup failed: {e}"))
            })
            .as_ref()
            .map_err(|e| e.clone())
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, String> {
        if !self.allow_remote {
            return Err("remote images are disabled".to_string());
        }

        #[cfg(feature = "fetch")]
        {
            let response = self
                .client()?
                .get(url)
                .send()
                .map_err(|e| format!("request failed: {e}"))?;
            let status = response.status();
            if !status.is_success() {
                return Err(format!("HTTP status {status}"));
            }
            response
                .bytes()
                .map(|b| b.to_vec())
                .map_err(|e| format!("failed to read response: {e}"))
        }

        #[cfg(not(feature = "fetch"))]
        {
            Err(format!("remote image {url} requires the 'fetch' feature"))
        }
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, String> {
        if src.starts_with("data:") {
            parse_data_uri(src)
        } else if src.starts_with("http://") || src.starts_with("https://") {
            self.fetch_remote(src)
        } else {
            let path = src.strip_prefix("file://").unwrap_or(src);
            std::fs::read(path).map_err(|e| format!("cannot read {path}: {e}"))
        }
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "invalid data URI: missing `,` separator".to_string())?;
    if !header.contains(";base64") {
        return Err("only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Fetch and inspect one image.
///
/// The format check runs before any I/O, so unsupported sources are never
/// fetched.
pub fn embed(src: &str, fetcher: &dyn ImageFetcher) -> Result<EmbeddedImage, ImageError> {
    let format = ImageFormat::from_src(src).ok_or_else(|| ImageError::Unsupported {
        src: src.to_string(),
    })?;

    let bytes = fetcher.fetch(src).map_err(|reason| ImageError::Fetch {
        src: src.to_string(),
        reason,
    })?;

    let decoded = ::image::load_from_memory(&bytes).map_err(|e| ImageError::Decode {
        src: src.to_string(),
        reason: e.to_string(),
    })?;
    let (width_px, height_px) = (decoded.width(), decoded.height());
    if width_px == 0 || height_px == 0 {
        return Err(ImageError::Decode {
            src: src.to_string(),
            reason: "image has zero size".to_string(),
        });
    }

    Ok(EmbeddedImage {
        src: src.to_string(),
        width_px,
        height_px,
        bytes,
        format,
    })
}

/// Embed every source, returning results in input order.
///
/// With `parallel` set, each source is fetched on the rayon pool; the
/// collected order still matches `srcs`.
pub fn embed_all(
    srcs: &[&str],
    fetcher: &dyn ImageFetcher,
    parallel: bool,
) -> Vec<Result<EmbeddedImage, ImageError>> {
    if parallel && srcs.len() > 1 {
        srcs.par_iter().map(|src| embed(src, fetcher)).collect()
    } else {
        srcs.iter().map(|src| embed(src, fetcher)).collect()
    }
}
