use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use common::config::Config;
use fetcher::ImageFetcher;
use image_cache::{AllowList, CacheStore, ImageCache};
use tracing::info;

use crate::{
    errors::StartupError,
    routes::{dashboard::dashboard_handler, image::image_handler},
    service_layers::build_service_layers,
};

pub mod args;
pub mod dashboard;
pub mod errors;
mod routes;
mod service_layers;

pub struct ServerState {
    pub config: Config,
    pub image_cache: ImageCache,
}

impl ServerState {
    /// Builds the allow-list from `config` and opens the cache in
    /// `cache_dir`, creating the directory if needed.
    pub async fn new(config: Config, cache_dir: &Path) -> Result<Self, StartupError> {
        let allow_list = AllowList::from_config(&config);
        let store = CacheStore::open(cache_dir).await?;
        let fetcher = ImageFetcher::new()?;

        info!("Allowing {} image sources", allow_list.len());

        Ok(Self {
            config,
            image_cache: ImageCache::new(allow_list, store, fetcher),
        })
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/image", get(image_handler))
        .layer(build_service_layers())
        .with_state(state)
}
