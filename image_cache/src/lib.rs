mod cache;
pub mod coordinator;
pub mod errors;
pub mod framing;
pub mod registry;
pub mod store;

pub use cache::ImageCache;
pub use errors::ImageCacheError;
pub use registry::AllowList;
pub use store::{CacheStore, CachedImage};
