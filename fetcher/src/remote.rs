use std::time::Duration;

use reqwest::{Client, ClientBuilder, header::CONTENT_TYPE};
use tracing::{debug, info};

use crate::{
    errors::FetcherError,
    traits::{DEFAULT_CONTENT_TYPE, FetchedImage, ImageBody},
};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

const USER_AGENT: &str = concat!("launcher/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    pub fn new() -> Result<Self, FetcherError> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetcherError> {
        let client = ClientBuilder::new()
            .gzip(true)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetcherError::RemoteClientBuild)?;

        Ok(Self { client })
    }

    /// Issues a GET for `url`. The content type comes from the response
    /// headers only; remote bodies are never sniffed.
    pub async fn fetch_url(&self, url: &str) -> Result<FetchedImage, FetcherError> {
        info!("Sending request to {}", url);

        let response = self.client.get(url).send().await?;

        debug!("{response:?}");

        let status = response.status();

        if !status.is_success() {
            return Err(FetcherError::RemoteBadStatus {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(FetchedImage {
            content_type,
            body: ImageBody::Remote(response),
        })
    }
}
