use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{RecommendRequest, RecommendResponse, SeedInput},
};

use super::AppState;

const TRACK_IDS_REQUIRED: &str = "track_ids (non-empty array) is required";

/// Handler for the recommend endpoint
///
/// Malformed seed entries are skipped; only a missing or empty `track_ids`
/// array is rejected.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(%request_id, error = %rejection, "Rejected recommend body");
        AppError::InvalidInput(TRACK_IDS_REQUIRED.to_string())
    })?;

    let entries = match request.track_ids.as_ref().and_then(|v| v.as_array()) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Err(AppError::InvalidInput(TRACK_IDS_REQUIRED.to_string())),
    };

    let seeds: Vec<SeedInput> = entries.iter().filter_map(SeedInput::from_value).collect();
    let preferences = request.preferences.unwrap_or_default();

    tracing::info!(
        %request_id,
        entries = entries.len(),
        seeds = seeds.len(),
        same_artist_only = preferences.same_artist_only,
        "Recommend request"
    );

    let recommended_tracks = state.engine.recommend(&seeds, &preferences).await?;

    Ok(Json(RecommendResponse { recommended_tracks }))
}
