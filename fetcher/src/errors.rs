use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetcherError {
    #[error("Unsupported image source scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Failed to open local file {}", .0.display())]
    LocalFileOpen(PathBuf, #[source] std::io::Error),
    #[error("Failed to read image body")]
    BodyRead(#[from] std::io::Error),
    #[error("Failed to build remote client")]
    RemoteClientBuild(#[source] reqwest::Error),
    #[error("Remote request failed")]
    RemoteRequest(#[from] reqwest::Error),
    #[error("Remote responded with {status} for {url}")]
    RemoteBadStatus { url: String, status: StatusCode },
}
