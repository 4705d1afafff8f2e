use std::{path::PathBuf, sync::Arc};

use fetcher::errors::FetcherError;
use thiserror::Error;
use tokio::task::JoinError;

use crate::framing::FramingError;

#[derive(Error, Debug)]
pub enum ImageCacheError {
    #[error("Hash is not in the allow-list: {0}")]
    Unauthorized(String),
    #[error("Failed to fetch image source")]
    Fetch(#[from] FetcherError),
    #[error("Failed to access cache entry {}", .0.display())]
    Persistence(PathBuf, #[source] std::io::Error),
    #[error("Malformed cache entry {}", .0.display())]
    Framing(PathBuf, #[source] FramingError),
    #[error("Cache entry {0} disappeared after it was filled")]
    MissingAfterFill(String),
    #[error("Cache fill task did not complete")]
    TaskFailed(#[from] JoinError),
    /// Outcome of a fill shared by every caller that awaited it.
    #[error(transparent)]
    Fill(Arc<ImageCacheError>),
}
