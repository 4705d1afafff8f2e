use std::error::Error as StdError;

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use image_cache::ImageCacheError;
use thiserror::Error;
use tracing::{debug, error};

/// Errors surfaced by the handlers. Full detail is logged here, the caller
/// only ever receives a status and a fixed message.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    QueryExtractorRejection(#[from] QueryRejection),
    #[error("Malformed image hash: {0}")]
    InvalidHash(String),
    #[error("Image hash is not allowed: {0}")]
    HashNotAllowed(String),
    #[error(transparent)]
    ImageCache(#[from] ImageCacheError),
    #[error("Failed to render dashboard")]
    Render(#[from] askama::Error),
}

fn describe(err: &dyn StdError) -> String {
    let mut description = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }

    description
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::QueryExtractorRejection(rejection) => {
                debug!(
                    "Failed to parse incoming request: {}, {}",
                    rejection.status(),
                    rejection.body_text()
                );

                (StatusCode::BAD_REQUEST, "Bad Request: missing hash")
            }
            Self::InvalidHash(_) => {
                debug!("{}", self);

                (StatusCode::BAD_REQUEST, "Bad Request: malformed hash")
            }
            Self::HashNotAllowed(_) | Self::ImageCache(ImageCacheError::Unauthorized(_)) => {
                debug!("{}", self);

                (StatusCode::FORBIDDEN, "Forbidden: hash not allowed")
            }
            Self::ImageCache(err) => {
                error!("Failed to serve image: {}", describe(err));

                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            Self::Render(_) => {
                error!("{}", describe(&self));

                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, message).into_response()
    }
}
