use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{any::Any, sync::Arc};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        providers::MusicProvider, recommendations::RecommendationEngine,
        track_search::SearchSettings,
    },
};

pub mod recommendations;
pub mod tracks;

/// Shared application state
pub struct AppState {
    pub engine: RecommendationEngine,
    pub provider: Arc<dyn MusicProvider>,
    pub search_settings: SearchSettings,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, search_settings: SearchSettings) -> Self {
        Self {
            provider: engine.provider(),
            engine,
            search_settings,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommend", post(recommendations::recommend))
        .route("/find-tracks", post(tracks::find_tracks))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
