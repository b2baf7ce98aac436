//! Fetching image bytes and saving downloads

use crate::{AppError, ImageRecord, ImageSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client shared by image loading and downloads
pub fn build_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(concat!("ImageGallery/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| AppError::Init(format!("HTTP client: {}", e)))
}

/// Bytes of an image, from the network or from memory
pub async fn fetch_bytes(client: &reqwest::Client, source: &ImageSource) -> Result<Arc<[u8]>, AppError> {
    match source {
        ImageSource::Inline { bytes, .. } => Ok(bytes.clone()),
        ImageSource::Remote(url) => {
            let response = client.get(url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::HttpStatus {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }

            let body = response.bytes().await?;
            tracing::debug!(url = %url, size = body.len(), "Fetched image");
            Ok(Arc::from(body.as_ref()))
        }
    }
}

/// Download `record` into `dir` as `{display_name}.{ext}`.
///
/// `ext` is sniffed from the bytes, falling back to `fallback_ext`. Existing
/// files are never overwritten.
pub async fn download_image(
    client: &reqwest::Client,
    record: &ImageRecord,
    dir: PathBuf,
    fallback_ext: &str,
) -> Result<PathBuf, AppError> {
    let bytes = fetch_bytes(client, &record.source).await?;

    let stem = app_fs::sanitize_file_stem(&record.display_name);
    let ext = crate::imaging::sniff_extension(&bytes)
        .unwrap_or(fallback_ext)
        .to_string();

    let saved = tokio::task::spawn_blocking(move || app_fs::save_bytes(&dir, &stem, &ext, &bytes))
        .await
        .map_err(|e| AppError::InvalidState(format!("download task: {}", e)))??;

    tracing::info!(id = %record.id, path = %saved.display(), "Image downloaded");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageId;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R'];

    fn inline(name: &str, bytes: &[u8]) -> ImageRecord {
        ImageRecord {
            id: ImageId::generate(),
            source: ImageSource::Inline {
                bytes: Arc::from(bytes),
                mime: "image/png".into(),
            },
            alt_text: name.into(),
            category: "Art".into(),
            display_name: name.into(),
            size_bytes: Some(bytes.len() as u64),
        }
    }

    fn names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_download_inline_twice() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client().unwrap();
        let record = inline("Golden: Sunset", PNG);

        let first = download_image(&client, &record, dir.path().to_path_buf(), "jpg").await.unwrap();
        let second = download_image(&client, &record, dir.path().to_path_buf(), "jpg").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(names(dir.path()), vec!["Golden_ Sunset (1).png", "Golden_ Sunset.png"]);
        assert_eq!(std::fs::read(first).unwrap(), PNG);
    }

    #[tokio::test]
    async fn test_fallback_extension() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client().unwrap();
        let record = inline("raw", b"not sniffable");

        let saved = download_image(&client, &record, dir.path().to_path_buf(), "jpg").await.unwrap();
        assert_eq!(saved.file_name().unwrap(), "raw.jpg");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client().unwrap();
        let mut record = inline("remote", PNG);
        // Port 9 (discard) is closed on test machines
        record.source = ImageSource::Remote("http://127.0.0.1:9/missing.jpg".into());

        let result = download_image(&client, &record, dir.path().to_path_buf(), "jpg").await;
        assert!(matches!(result, Err(AppError::Network(_))));
        assert!(names(dir.path()).is_empty());
    }
}
