use crate::{
    errors::FetcherError,
    local::LocalFetcher,
    remote::RemoteFetcher,
    source::Source,
    traits::{FetchedImage, SourceFetcher},
};

/// Routes a source to the local or remote fetcher based on its scheme.
#[derive(Clone)]
pub struct ImageFetcher {
    local: LocalFetcher,
    remote: RemoteFetcher,
}

impl ImageFetcher {
    pub fn new() -> Result<Self, FetcherError> {
        Ok(Self {
            local: LocalFetcher::new(),
            remote: RemoteFetcher::new()?,
        })
    }
}

impl SourceFetcher for ImageFetcher {
    async fn fetch(&self, source: &str) -> Result<FetchedImage, FetcherError> {
        match Source::parse(source)? {
            Source::Local(path) => self.local.fetch_file(path).await,
            Source::Remote(url) => self.remote.fetch_url(url).await,
        }
    }
}
