use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{ServerState, dashboard::render_dashboard, routes::error_message_erasure::ApiError};

pub(crate) async fn dashboard_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(render_dashboard(&state.config)?))
}
