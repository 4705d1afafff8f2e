use std::fmt;

use bytes::{Bytes, BytesMut};
use tokio::{
    fs::File,
    io::{AsyncReadExt, BufReader},
};

use crate::errors::FetcherError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const CHUNK_SIZE: usize = 16 * 1024;

/// Anything that can turn an image source string into a content type and
/// a body stream.
pub trait SourceFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<FetchedImage, FetcherError>> + Send;
}

#[derive(Debug)]
pub struct FetchedImage {
    pub content_type: String,
    pub body: ImageBody,
}

/// Body of a fetched image, read chunk by chunk so it is never held in
/// memory as a whole.
pub enum ImageBody {
    Local(BufReader<File>),
    Remote(reqwest::Response),
    Memory(Option<Bytes>),
}

impl ImageBody {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Memory(Some(bytes.into()))
    }

    /// Returns `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetcherError> {
        match self {
            Self::Local(reader) => {
                let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);

                if reader.read_buf(&mut buffer).await? == 0 {
                    return Ok(None);
                }

                Ok(Some(buffer.freeze()))
            }
            Self::Remote(response) => Ok(response.chunk().await?),
            Self::Memory(bytes) => Ok(bytes.take().filter(|chunk| !chunk.is_empty())),
        }
    }
}

impl fmt::Debug for ImageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(_) => f.write_str("ImageBody::Local"),
            Self::Remote(response) => write!(f, "ImageBody::Remote({})", response.url()),
            Self::Memory(bytes) => write!(
                f,
                "ImageBody::Memory({} bytes)",
                bytes.as_ref().map_or(0, Bytes::len)
            ),
        }
    }
}
