use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use bytes::{Bytes, BytesMut};
use fetcher::ImageBody;
use futures::{Stream, stream};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, info, warn};

use crate::{
    errors::ImageCacheError,
    framing::{self, LENGTH_PREFIX_LEN},
};

const PARTIAL_SUFFIX: &str = ".partial";
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Hash keyed entries on disk, one file per hash. Presence of the file is
/// the only record that an entry exists.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

/// A cache entry whose header has been read. `body` is positioned at the
/// first body byte.
#[derive(Debug)]
pub struct CachedImage {
    pub content_type: String,
    pub body: File,
}

impl CachedImage {
    /// Streams the remaining body in chunks.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        stream::try_unfold(self.body, |mut file| async move {
            let mut buffer = BytesMut::with_capacity(READ_CHUNK_SIZE);

            if file.read_buf(&mut buffer).await? == 0 {
                return Ok::<_, io::Error>(None);
            }

            Ok(Some((buffer.freeze(), file)))
        })
    }
}

fn persistence(path: &Path) -> impl FnOnce(io::Error) -> ImageCacheError + '_ {
    move |err| ImageCacheError::Persistence(path.to_path_buf(), err)
}

impl CacheStore {
    /// Uses `dir` as the cache directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ImageCacheError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).await.map_err(persistence(&dir))?;

        info!("Using image cache directory {}", dir.display());

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(hash)
    }

    fn partial_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{hash}{PARTIAL_SUFFIX}"))
    }

    pub async fn contains(&self, hash: &str) -> Result<bool, ImageCacheError> {
        let path = self.entry_path(hash);

        fs::try_exists(&path).await.map_err(persistence(&path))
    }

    /// Opens the entry for `hash` and reads its header. `Ok(None)` when no
    /// entry exists.
    pub async fn get(&self, hash: &str) -> Result<Option<CachedImage>, ImageCacheError> {
        let path = self.entry_path(hash);

        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(persistence(&path)(err)),
        };

        let entry_len = file.metadata().await.map_err(persistence(&path))?.len();

        if entry_len < LENGTH_PREFIX_LEN {
            return Err(ImageCacheError::Framing(
                path,
                framing::FramingError::MissingLengthPrefix(entry_len),
            ));
        }

        let declared = file.read_u16().await.map_err(persistence(&path))?;

        if let Err(err) = framing::check_declared_length(declared, entry_len) {
            return Err(ImageCacheError::Framing(path, err));
        }

        let mut raw_content_type = vec![0; usize::from(declared)];
        file.read_exact(&mut raw_content_type)
            .await
            .map_err(persistence(&path))?;

        let content_type = match framing::decode_content_type(raw_content_type) {
            Ok(content_type) => content_type,
            Err(err) => return Err(ImageCacheError::Framing(path, err)),
        };

        Ok(Some(CachedImage {
            content_type,
            body: file,
        }))
    }

    /// Writes a complete entry for `hash`, replacing any existing one. The
    /// entry is assembled in a partial file and renamed into place, so
    /// readers never observe a half written container and a failed write
    /// leaves no entry behind. Returns the number of body bytes written.
    pub async fn put(
        &self,
        hash: &str,
        content_type: &str,
        body: ImageBody,
    ) -> Result<u64, ImageCacheError> {
        let entry = self.entry_path(hash);

        let header = framing::encode_header(content_type)
            .map_err(|err| ImageCacheError::Framing(entry.clone(), err))?;

        let partial = self.partial_path(hash);

        let written = match Self::write_partial(&partial, &header, body).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup_err) = fs::remove_file(&partial).await {
                    warn!(
                        "Failed to remove partial cache entry {}: {}",
                        partial.display(),
                        cleanup_err
                    );
                }

                return Err(err);
            }
        };

        fs::rename(&partial, &entry)
            .await
            .map_err(persistence(&entry))?;

        info!("Cached {} ({} bytes, {})", hash, written, content_type);

        Ok(written)
    }

    async fn write_partial(
        path: &Path,
        header: &[u8],
        mut body: ImageBody,
    ) -> Result<u64, ImageCacheError> {
        let mut file = File::create(path).await.map_err(persistence(path))?;

        file.write_all(header).await.map_err(persistence(path))?;

        let mut written = 0u64;

        while let Some(chunk) = body.next_chunk().await? {
            file.write_all(&chunk).await.map_err(persistence(path))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(persistence(path))?;
        file.sync_all().await.map_err(persistence(path))?;

        debug!("Wrote {} body bytes to {}", written, path.display());

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::framing::FramingError;

    const HASH: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    async fn read_body(image: CachedImage) -> Vec<u8> {
        image
            .into_stream()
            .try_fold(Vec::new(), |mut body, chunk| async move {
                body.extend_from_slice(&chunk);
                Ok(body)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();
        let body: Vec<u8> = (0..50_000u32).map(|i| (i % 256) as u8).collect();

        let written = store
            .put(HASH, "image/png", ImageBody::from_bytes(body.clone()))
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);

        let image = store.get(HASH).await.unwrap().unwrap();

        assert_eq!(image.content_type, "image/png");
        assert_eq!(read_body(image).await, body);
    }

    #[tokio::test]
    async fn on_disk_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        store
            .put(HASH, "image/gif", ImageBody::from_bytes(&b"GIF89a"[..]))
            .await
            .unwrap();

        let raw = std::fs::read(dir.path().join(HASH)).unwrap();

        assert_eq!(raw, b"\x00\x09image/gifGIF89a");
        assert!(!dir.path().join(format!("{HASH}.partial")).exists());
    }

    #[tokio::test]
    async fn empty_body_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        store
            .put(HASH, "image/png", ImageBody::from_bytes(Vec::new()))
            .await
            .unwrap();

        let image = store.get(HASH).await.unwrap().unwrap();

        assert_eq!(image.content_type, "image/png");
        assert!(read_body(image).await.is_empty());
    }

    #[tokio::test]
    async fn missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        assert!(store.get(HASH).await.unwrap().is_none());
        assert!(!store.contains(HASH).await.unwrap());
    }

    #[tokio::test]
    async fn open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = CacheStore::open(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[tokio::test]
    async fn longest_content_type_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();
        let content_type = "x".repeat(u16::MAX as usize);

        store
            .put(HASH, &content_type, ImageBody::from_bytes(&b"body"[..]))
            .await
            .unwrap();

        let image = store.get(HASH).await.unwrap().unwrap();

        assert_eq!(image.content_type, content_type);
        assert_eq!(read_body(image).await, b"body");
    }

    #[tokio::test]
    async fn oversized_content_type_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();
        let content_type = "x".repeat(u16::MAX as usize + 1);

        let result = store
            .put(HASH, &content_type, ImageBody::from_bytes(&b"body"[..]))
            .await;

        assert!(matches!(
            result,
            Err(ImageCacheError::Framing(_, FramingError::ContentTypeTooLong(65536)))
        ));
        assert!(!store.contains(HASH).await.unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn truncated_entries_are_framing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join(HASH), b"\x00").unwrap();
        assert!(matches!(
            store.get(HASH).await,
            Err(ImageCacheError::Framing(_, FramingError::MissingLengthPrefix(1)))
        ));

        // declares 9 content type bytes but only holds 5
        std::fs::write(dir.path().join(HASH), b"\x00\x09image").unwrap();
        assert!(matches!(
            store.get(HASH).await,
            Err(ImageCacheError::Framing(
                _,
                FramingError::Truncated {
                    declared: 9,
                    remaining: 5
                }
            ))
        ));

        std::fs::write(dir.path().join(HASH), b"\xFF\xFF").unwrap();
        assert!(matches!(
            store.get(HASH).await,
            Err(ImageCacheError::Framing(_, FramingError::Truncated { .. }))
        ));
    }

    #[tokio::test]
    async fn non_utf8_content_type_is_a_framing_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join(HASH), b"\x00\x02\xFF\xFEbody").unwrap();

        assert!(matches!(
            store.get(HASH).await,
            Err(ImageCacheError::Framing(_, FramingError::InvalidContentType))
        ));
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).await.unwrap();

        store
            .put(HASH, "text/plain", ImageBody::from_bytes(&b"old"[..]))
            .await
            .unwrap();
        store
            .put(HASH, "image/png", ImageBody::from_bytes(&b"new"[..]))
            .await
            .unwrap();

        let image = store.get(HASH).await.unwrap().unwrap();

        assert_eq!(image.content_type, "image/png");
        assert_eq!(read_body(image).await, b"new");
    }
}
