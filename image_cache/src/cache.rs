use std::sync::Arc;

use fetcher::{ImageFetcher, SourceFetcher};
use tracing::debug;

use crate::{
    coordinator::FetchCoordinator,
    errors::ImageCacheError,
    registry::AllowList,
    store::{CacheStore, CachedImage},
};

/// The image proxy's state: the allow-list, the on-disk store and the
/// fetch coordinator. Built once at startup and shared by every request.
pub struct ImageCache<F = ImageFetcher> {
    allow_list: AllowList,
    store: CacheStore,
    coordinator: Arc<FetchCoordinator<F>>,
}

impl<F: SourceFetcher> ImageCache<F> {
    pub fn new(allow_list: AllowList, store: CacheStore, fetcher: F) -> Self {
        let coordinator = Arc::new(FetchCoordinator::new(store.clone(), fetcher));

        Self {
            allow_list,
            store,
            coordinator,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn is_allowed(&self, hash: &str) -> bool {
        self.allow_list.lookup(hash).is_some()
    }

    /// Returns the cached image for `hash`, fetching and storing it first
    /// on a miss. Hashes outside the allow-list never reach the store or
    /// the fetcher. Only the store decides whether an entry exists, so an
    /// entry removed from disk is fetched again on the next request.
    pub async fn get_image(&self, hash: &str) -> Result<CachedImage, ImageCacheError> {
        let Some(source) = self.allow_list.lookup(hash) else {
            return Err(ImageCacheError::Unauthorized(hash.to_string()));
        };

        if let Some(image) = self.store.get(hash).await? {
            debug!("Serving {} from cache", hash);
            return Ok(image);
        }

        self.coordinator.ensure_cached(hash, source).await?;

        self.store
            .get(hash)
            .await?
            .ok_or_else(|| ImageCacheError::MissingAfterFill(hash.to_string()))
    }
}
