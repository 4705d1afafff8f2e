use std::sync::Arc;

use crate::{ServerState, routes::error_message_erasure::ApiError};

use axum::body::Body;
use axum::debug_handler;
use axum::extract::Query;
use axum::http::header;
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::WithRejection;
use common::deserialize_disallow_empty_string::disallow_empty_string;
use common::utils::is_valid_hash;
use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct Payload {
    #[serde(deserialize_with = "disallow_empty_string")]
    hash: String,
}

#[debug_handler]
pub(crate) async fn image_handler(
    State(state): State<Arc<ServerState>>,
    WithRejection(Query(query), _): WithRejection<Query<Payload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_hash(&query.hash) {
        return Err(ApiError::InvalidHash(query.hash));
    }

    if !state.image_cache.is_allowed(&query.hash) {
        return Err(ApiError::HashNotAllowed(query.hash));
    }

    let image = state.image_cache.get_image(&query.hash).await?;

    let headers = [(header::CONTENT_TYPE, image.content_type.clone())];

    let body = Body::from_stream(image.into_stream());

    Ok((headers, body))
}
