use std::path::Path;

use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::debug;

use crate::{
    errors::FetcherError,
    sniff::{SNIFF_LEN, detect_content_type},
    traits::{FetchedImage, ImageBody},
};

#[derive(Copy, Clone, Default)]
pub struct LocalFetcher {}

impl LocalFetcher {
    pub fn new() -> Self {
        Self {}
    }

    /// Opens `path` and sniffs its content type from a buffered peek. The
    /// peeked bytes stay in the buffer, so the returned body starts at the
    /// beginning of the file without seeking.
    pub async fn fetch_file(&self, path: &Path) -> Result<FetchedImage, FetcherError> {
        let file = File::open(path)
            .await
            .map_err(|err| FetcherError::LocalFileOpen(path.to_path_buf(), err))?;

        let mut reader = BufReader::with_capacity(SNIFF_LEN, file);
        let peeked = reader.fill_buf().await?;

        let content_type = detect_content_type(peeked);

        debug!(
            "Sniffed {} from {} leading bytes of {}",
            content_type,
            peeked.len(),
            path.display()
        );

        Ok(FetchedImage {
            content_type: content_type.to_string(),
            body: ImageBody::Local(reader),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::traits::DEFAULT_CONTENT_TYPE;

    async fn drain(mut body: ImageBody) -> Vec<u8> {
        let mut collected = Vec::new();

        while let Some(chunk) = body.next_chunk().await.unwrap() {
            collected.extend_from_slice(&chunk);
        }

        collected
    }

    #[tokio::test]
    async fn sniffs_text_and_keeps_every_byte() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"launcher-host\n").unwrap();

        let image = LocalFetcher::new().fetch_file(file.path()).await.unwrap();

        assert_eq!(image.content_type, "text/plain; charset=utf-8");
        assert_eq!(drain(image.body).await, b"launcher-host\n");
    }

    #[tokio::test]
    async fn body_larger_than_the_peek_is_complete() {
        let mut contents = b"\x89PNG\x0D\x0A\x1A\x0A".to_vec();
        contents.extend((0..40_000u32).map(|i| (i % 251) as u8));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&contents).unwrap();

        let image = LocalFetcher::new().fetch_file(file.path()).await.unwrap();

        assert_eq!(image.content_type, "image/png");
        assert_eq!(drain(image.body).await, contents);
    }

    #[tokio::test]
    async fn empty_file_is_generic_binary() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let image = LocalFetcher::new().fetch_file(file.path()).await.unwrap();

        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
        assert!(drain(image.body).await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = LocalFetcher::new()
            .fetch_file(&dir.path().join("missing.png"))
            .await;

        assert!(matches!(result, Err(FetcherError::LocalFileOpen(..))));
    }

    #[tokio::test]
    async fn unreadable_source_surfaces_the_peek_error() {
        // opening a directory succeeds on unix, reading it does not
        let dir = tempfile::tempdir().unwrap();

        let result = LocalFetcher::new().fetch_file(dir.path()).await;

        assert!(matches!(result, Err(FetcherError::BodyRead(_))), "{result:?}");
    }
}
