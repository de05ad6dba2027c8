//! Fetching the logo shown in export headers.
//!
//! The logo is optional: every failure path logs a warning and yields `None`
//! so the export falls back to the no-logo layout.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{ExportError, Result};

pub const DEFAULT_LOGO_URL: &str = "/logo.png";

const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Resolves a possibly relative logo URL against `base`.
pub fn resolve_url(base: Option<&str>, url: &str) -> String {
    if Url::parse(url).is_ok() {
        return url.to_string();
    }

    match base.map(Url::parse) {
        Some(Ok(base)) => match base.join(url) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                warn!("Cannot resolve '{}' against '{}': {}", url, base, e);
                url.to_string()
            }
        },
        Some(Err(e)) => {
            warn!("Invalid asset base URL: {}", e);
            url.to_string()
        }
        None => url.to_string(),
    }
}

/// GETs `url` and returns its body as a `data:` URL, or `None` on any
/// failure.
pub async fn fetch_image_as_data_url(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to fetch image {}: {}", url, e);
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!("Fetching image {} returned {}", url, status);
        return None;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    match response.bytes().await {
        Ok(bytes) => {
            debug!("Fetched {} bytes of {} from {}", bytes.len(), content_type, url);
            Some(format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes)))
        }
        Err(e) => {
            warn!("Failed to read image body from {}: {}", url, e);
            None
        }
    }
}

/// Splits a base64 `data:` URL into its media type and payload.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::DataUrl("missing data: scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::DataUrl("missing payload separator".to_string()))?;
    let media_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ExportError::DataUrl("only base64 payloads are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ExportError::DataUrl(e.to_string()))?;

    Ok((media_type.to_string(), bytes))
}

/// A decoded logo flattened onto white, ready to embed as a DeviceRGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl LogoImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            for channel in [r, g, b] {
                let blended = (u16::from(channel) * u16::from(a) + 255 * (255 - u16::from(a))) / 255;
                rgb.push(blended as u8);
            }
        }

        Ok(Self { width, height, rgb })
    }

    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let (_, bytes) = decode_data_url(data_url)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_against_base() {
        assert_eq!(
            resolve_url(Some("http://localhost:8080"), "/logo.png"),
            "http://localhost:8080/logo.png"
        );
        assert_eq!(
            resolve_url(Some("http://localhost:8080"), "https://cdn.example.com/logo.png"),
            "https://cdn.example.com/logo.png"
        );
        assert_eq!(resolve_url(None, "/logo.png"), "/logo.png");
    }

    #[test]
    fn test_decode_data_url() {
        let (media_type, bytes) = decode_data_url("data:image/png;base64,AAEC").unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn test_decode_data_url_rejects_plain_urls() {
        assert!(decode_data_url("http://example.com/logo.png").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_logo_from_garbage_bytes_fails() {
        assert!(LogoImage::from_bytes(b"not an image").is_err());
    }
}
