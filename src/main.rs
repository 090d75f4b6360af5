use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_rec_api::{
    config::Config,
    routes::{create_router, AppState},
    services::{
        providers::{LastFmProvider, MusicProvider},
        recommendations::RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "music_rec_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = Config::from_env()?;

    let provider = LastFmProvider::new(
        config.lastfm_api_key.clone(),
        config.lastfm_api_url.clone(),
        config.provider_timeout(),
    )?;
    tracing::info!(provider = provider.name(), "Music provider configured");

    let engine = RecommendationEngine::new(Arc::new(provider), config.recommend_settings());
    let state = Arc::new(AppState::new(engine, config.search_settings()));

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        %address,
        provider_timeout_secs = config.provider_timeout_secs,
        max_recommendations = config.max_recommendations,
        "Server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
