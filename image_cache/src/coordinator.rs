use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use fetcher::SourceFetcher;
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use tracing::{debug, info, warn};

use crate::{errors::ImageCacheError, store::CacheStore};

type FillOutcome = Result<(), Arc<ImageCacheError>>;
type Flight = Shared<BoxFuture<'static, FillOutcome>>;

/// Coalesces cache fills per hash. Concurrent callers for the same hash
/// await one shared fill and all receive its outcome, success or failure.
///
/// A flight only lives while its fill runs. The fill task removes it from
/// the table before its outcome is published, so whether an entry exists
/// is only ever decided by the store.
pub struct FetchCoordinator<F> {
    store: CacheStore,
    fetcher: F,
    flights: Mutex<HashMap<String, Flight>>,
}

impl<F: SourceFetcher> FetchCoordinator<F> {
    pub fn new(store: CacheStore, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            flights: Mutex::new(HashMap::new()),
        }
    }

    pub fn flight_count(&self) -> usize {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Makes sure the store holds an entry for `hash`, fetching `source`
    /// if it does not. Joins the fill already in flight for `hash` when
    /// there is one. The fill runs on its own task so it completes even if
    /// every caller goes away.
    pub async fn ensure_cached(
        self: &Arc<Self>,
        hash: &str,
        source: &str,
    ) -> Result<(), ImageCacheError> {
        self.join_or_start(hash, source)
            .await
            .map_err(ImageCacheError::Fill)
    }

    fn join_or_start(self: &Arc<Self>, hash: &str, source: &str) -> Flight {
        // entries are inserted and removed whole, a poisoned guard is still usable
        let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(flight) = flights.get(hash) {
            debug!("Joining fill in flight for {}", hash);
            return flight.clone();
        }

        let task = {
            let coordinator = Arc::clone(self);
            let hash = hash.to_string();
            let source = source.to_string();

            tokio::spawn(async move {
                let outcome = coordinator.fill(&hash, &source).await;
                coordinator.land(&hash);
                outcome.map_err(Arc::new)
            })
        };

        let coordinator = Arc::clone(self);
        let landing_hash = hash.to_string();

        let flight = task
            .map(move |joined| {
                joined.unwrap_or_else(|err| {
                    // the task never reached its own landing
                    coordinator.land(&landing_hash);
                    Err(Arc::new(ImageCacheError::TaskFailed(err)))
                })
            })
            .boxed()
            .shared();

        flights.insert(hash.to_string(), flight.clone());

        flight
    }

    fn land(&self, hash: &str) {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(hash);
    }

    async fn fill(&self, hash: &str, source: &str) -> Result<(), ImageCacheError> {
        // a previous flight may have committed the entry after the caller's miss
        if self.store.contains(hash).await? {
            debug!("Cache entry for {} already present", hash);
            return Ok(());
        }

        info!("Fetching {} for {}", source, hash);

        let image = self.fetcher.fetch(source).await.inspect_err(|err| {
            warn!("Failed to fetch {} for {}: {}", source, hash, err);
        })?;

        self.store
            .put(hash, &image.content_type, image.body)
            .await
            .map(|_| ())
    }
}
