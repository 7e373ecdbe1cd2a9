use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::Path;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Public path prefix under which locally stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/products/";

pub struct DataUriImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn is_remote_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:image/")
}

/// Parse a `data:image/<ext>;base64,<payload>` data URI.
pub fn parse_data_uri(value: &str) -> AppResult<DataUriImage> {
    let rest = value
        .strip_prefix("data:image/")
        .ok_or_else(|| AppError::BadRequest("not an image data URI".into()))?;
    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::BadRequest("image data URI is not base64 encoded".into()))?;
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest("invalid image extension".into()));
    }
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("base64 decode failed: {e}")))?;
    Ok(DataUriImage {
        extension: extension.to_ascii_lowercase(),
        bytes,
    })
}

/// Store one incoming image reference. Remote URLs are kept as-is; base64 data
/// URIs are decoded and written under `media_root`, returning the generated
/// public path. Anything else is rejected.
pub async fn store_image(media_root: &str, value: &str) -> AppResult<String> {
    if is_remote_url(value) {
        return Ok(value.to_string());
    }
    if !is_data_uri(value) {
        return Err(AppError::BadRequest(
            "image must be a URL or a base64 data URI".into(),
        ));
    }

    let image = parse_data_uri(value)?;
    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);

    tokio::fs::create_dir_all(media_root)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("media dir create failed: {e}")))?;
    let file_path = Path::new(media_root).join(&file_name);
    tokio::fs::write(&file_path, &image.bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("image write failed: {e}")))?;

    Ok(format!("{PUBLIC_PREFIX}{file_name}"))
}

/// Delete a locally stored image file; remote URLs are left alone. Missing
/// files are ignored so repeated deletes stay safe.
pub async fn remove_image(media_root: &str, image_path: &str) {
    if let Some(file_name) = image_path.strip_prefix(PUBLIC_PREFIX) {
        let file_path = Path::new(media_root).join(file_name);
        if let Err(err) = tokio::fs::remove_file(&file_path).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %file_path.display(), error = %err, "image delete failed");
        }
    }
}

/// Re-encode a locally stored image as a data URI for product detail
/// responses; remote URLs and unreadable files pass through unchanged.
pub async fn to_display_path(media_root: &str, image_path: &str) -> String {
    let Some(file_name) = image_path.strip_prefix(PUBLIC_PREFIX) else {
        return image_path.to_string();
    };
    let file_path = Path::new(media_root).join(file_name);
    match tokio::fs::read(&file_path).await {
        Ok(bytes) => {
            let extension = file_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("png");
            format!("data:image/{};base64,{}", extension, BASE64.encode(bytes))
        }
        Err(_) => image_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_data_uri() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(b"fake-png"));
        let image = parse_data_uri(&uri).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, b"fake-png");
    }

    #[test]
    fn rejects_non_image_scheme() {
        assert!(parse_data_uri("data:text/plain;base64,aGk=").is_err());
        assert!(parse_data_uri("hello").is_err());
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(parse_data_uri("data:image/png;base64,???not-base64???").is_err());
    }

    #[test]
    fn classifies_remote_urls() {
        assert!(is_remote_url("https://cdn.example.com/a.png"));
        assert!(is_remote_url("http://cdn.example.com/a.png"));
        assert!(!is_remote_url("data:image/png;base64,aGk="));
        assert!(!is_remote_url("/uploads/products/a.png"));
    }

    #[tokio::test]
    async fn stores_and_reencodes_local_image() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let uri = format!("data:image/png;base64,{}", BASE64.encode(b"pixels"));

        let path = store_image(root, &uri).await.unwrap();
        assert!(path.starts_with(PUBLIC_PREFIX));
        assert!(path.ends_with(".png"));

        let display = to_display_path(root, &path).await;
        assert_eq!(display, uri);

        remove_image(root, &path).await;
        let display = to_display_path(root, &path).await;
        assert_eq!(display, path);
    }

    #[tokio::test]
    async fn remote_url_is_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let url = "https://cdn.example.com/a.png";
        assert_eq!(store_image(root, url).await.unwrap(), url);
        assert_eq!(to_display_path(root, url).await, url);
    }
}
