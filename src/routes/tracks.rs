use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{FindTracksRequest, FindTracksResponse},
    services::track_search::{self, SearchRequest},
};

use super::AppState;

/// Handler for the find-tracks endpoint
pub async fn find_tracks(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<FindTracksRequest>, JsonRejection>,
) -> AppResult<Json<FindTracksResponse>> {
    // An unreadable body is treated like an empty one and fails validation
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let request = SearchRequest::from_body(body, &state.search_settings)?;

    tracing::info!(
        %request_id,
        query = ?request.query,
        limit = request.limit,
        "Find-tracks request"
    );

    let results =
        track_search::find_tracks(state.provider.as_ref(), &request, &state.search_settings).await;

    Ok(Json(FindTracksResponse { results }))
}
