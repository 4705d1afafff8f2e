pub mod errors;
pub mod image_fetcher;
pub mod local;
pub mod remote;
pub mod sniff;
pub mod source;
pub mod traits;

pub use image_fetcher::ImageFetcher;
pub use traits::{FetchedImage, ImageBody, SourceFetcher};
