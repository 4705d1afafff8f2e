use common::config::ConfigError;
use fetcher::errors::FetcherError;
use image_cache::ImageCacheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to load configuration")]
    Config(#[from] ConfigError),
    #[error("Failed to prepare image cache")]
    ImageCache(#[from] ImageCacheError),
    #[error("Failed to create image fetcher")]
    Fetcher(#[from] FetcherError),
    #[error("Failed to bind {0}")]
    Bind(String, #[source] std::io::Error),
    #[error("Server error")]
    Serve(#[source] std::io::Error),
}
