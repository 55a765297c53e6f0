//! Upload of complaint photos to the external media host.
//!
//! Clients send images as base64 (optionally as `data:` URIs). Each one is checked
//! locally, then posted to the host one at a time; the returned URLs are what gets stored.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;

use crate::config::MediaConfig;
use crate::errors::AppError;

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGES_PER_REQUEST: usize = 5;

const ALLOWED_MIME: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// A checked image ready to send, always in data URI form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub mime: String,
    pub data_uri: String,
    pub size: usize,
}

/// Parse a base64 payload or `data:<mime>;base64,<data>` URI.
/// Bare base64 is assumed to be JPEG.
pub fn parse_image(raw: &str) -> Result<ImagePayload, String> {
    let raw = raw.trim();
    let (mime, data) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| "Malformed data URI".to_string())?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| "Image data URI must be base64 encoded".to_string())?;
            (mime.to_ascii_lowercase(), data)
        }
        None => ("image/jpeg".to_string(), raw),
    };

    if !ALLOWED_MIME.contains(&mime.as_str()) {
        return Err(format!("Unsupported image type '{mime}'"));
    }
    let bytes = BASE64
        .decode(data)
        .map_err(|_| "Image is not valid base64".to_string())?;
    if bytes.is_empty() {
        return Err("Image is empty".to_string());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!("Image exceeds {} MB", MAX_IMAGE_BYTES / (1024 * 1024)));
    }

    Ok(ImagePayload {
        data_uri: format!("data:{mime};base64,{data}"),
        mime,
        size: bytes.len(),
    })
}

/// Check every payload up front so a bad image fails before anything is uploaded.
pub fn parse_images(raw: &[String]) -> Result<Vec<ImagePayload>, AppError> {
    if raw.len() > MAX_IMAGES_PER_REQUEST {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_IMAGES_PER_REQUEST} images per request"
        )));
    }
    raw.iter()
        .enumerate()
        .map(|(i, img)| {
            parse_image(img).map_err(|e| AppError::BadRequest(format!("Image {}: {}", i + 1, e)))
        })
        .collect()
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Upload(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.upload_url.is_empty()
    }

    async fn upload_one(&self, image: &ImagePayload) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.config.upload_url)
            .form(&[
                ("file", image.data_uri.as_str()),
                ("upload_preset", self.config.upload_preset.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!("media host returned {}", response.status())));
        }
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("unreadable media host response: {e}")))?;
        Ok(body.secure_url)
    }

    /// Validate and upload `raw` images in order, returning their URLs.
    ///
    /// Uploads run sequentially. A failure aborts the rest; images already sent stay on the host.
    pub async fn upload_all(&self, raw: &[String]) -> Result<Vec<String>, AppError> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let images = parse_images(raw)?;
        if !self.is_configured() {
            return Err(AppError::Upload("MEDIA_UPLOAD_URL is not configured".to_string()));
        }

        let mut urls = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let url = self.upload_one(image).await.inspect_err(|e| {
                log::error!("Upload {} of {} failed after {} succeeded: {}", i + 1, images.len(), urls.len(), e)
            })?;
            log::debug!("Uploaded {} ({} bytes) to {}", image.mime, image.size, url);
            urls.push(url);
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn accepts_data_uri() {
        let img = parse_image(&format!("data:image/png;base64,{PNG}")).unwrap();
        assert_eq!(img.mime, "image/png");
        assert!(img.size > 0);
        assert!(img.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        let img = parse_image(PNG).unwrap();
        assert_eq!(img.mime, "image/jpeg");
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(parse_image("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(parse_image("data:image/png,rawdata").is_err());
        assert!(parse_image("not base64 !!").is_err());
        assert!(parse_image("").is_err());
    }

    #[test]
    fn too_many_images_is_a_bad_request() {
        let many = vec![PNG.to_string(); MAX_IMAGES_PER_REQUEST + 1];
        assert!(matches!(parse_images(&many), Err(AppError::BadRequest(_))));
    }

    #[actix_rt::test]
    async fn no_images_needs_no_media_host() {
        let client = MediaClient::new(MediaConfig::default()).unwrap();
        assert!(client.upload_all(&[]).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn unconfigured_host_fails_after_validation() {
        let client = MediaClient::new(MediaConfig::default()).unwrap();
        let err = client.upload_all(&[PNG.to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
        let err = client.upload_all(&["%%%".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
