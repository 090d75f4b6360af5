use serde::Deserialize;
use std::time::Duration;

use crate::services::{recommendations::RecommendSettings, track_search::SearchSettings};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Last.fm API key
    pub lastfm_api_key: String,

    /// Last.fm API base URL
    #[serde(default = "default_lastfm_api_url")]
    pub lastfm_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied to every provider call, in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Fetch size for similar-track and tag-top-track lookups
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,

    /// Maximum number of tracks returned by the recommend endpoint
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Maximum number of tag lookups in flight for one seed or one search
    #[serde(default = "default_tag_lookup_concurrency")]
    pub tag_lookup_concurrency: usize,
}

fn default_lastfm_api_url() -> String {
    "http://ws.audioscrobbler.com/2.0/".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_similar_limit() -> usize {
    100
}

fn default_max_recommendations() -> usize {
    3
}

fn default_tag_lookup_concurrency() -> usize {
    25
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the recommendation engine
    pub fn recommend_settings(&self) -> RecommendSettings {
        RecommendSettings {
            similar_limit: self.similar_limit,
            max_results: self.max_recommendations.max(1),
            tag_lookup_concurrency: self.tag_lookup_concurrency.max(1),
        }
    }

    /// Settings for the find-tracks search
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            tag_lookup_concurrency: self.tag_lookup_concurrency.max(1),
            ..SearchSettings::default()
        }
    }
}
