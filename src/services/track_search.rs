use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{fold, FindTracksRequest, Track},
    services::providers::MusicProvider,
};

const INVALID_QUERY: &str =
    "Provide exactly one of 'title' or 'artist'. Optional: 'language', 'limit'.";

/// Tunables of the find-tracks search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Results requested from a title search
    pub title_fetch_limit: usize,
    /// Top tracks requested for an artist
    pub artist_top_limit: usize,
    /// Upper bound of the caller's `limit`
    pub max_output: usize,
    /// `limit` used when the caller gives none
    pub default_output: usize,
    /// Candidates that get a tag lookup under a language filter
    pub tag_lookups_max: usize,
    pub tag_lookup_concurrency: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            title_fetch_limit: 30,
            artist_top_limit: 50,
            max_output: 50,
            default_output: 10,
            tag_lookups_max: 25,
            tag_lookup_concurrency: 25,
        }
    }
}

/// What the caller is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackQuery {
    Title(String),
    Artist(String),
}

/// A validated find-tracks request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: TrackQuery,
    pub language: Option<String>,
    pub limit: usize,
}

impl SearchRequest {
    /// Validates a raw request body
    ///
    /// Exactly one of `title` and `artist` must be non-empty. A missing, zero
    /// or non-numeric `limit` means the default; other numbers are clamped to
    /// `1..=max_output`.
    pub fn from_body(body: FindTracksRequest, settings: &SearchSettings) -> AppResult<Self> {
        let title = non_empty(body.title);
        let artist = non_empty(body.artist);

        let query = match (title, artist) {
            (Some(title), None) => TrackQuery::Title(title),
            (None, Some(artist)) => TrackQuery::Artist(artist),
            _ => return Err(AppError::InvalidInput(INVALID_QUERY.to_string())),
        };

        Ok(Self {
            query,
            language: non_empty(body.language),
            limit: clamp_limit(body.limit.as_ref(), settings),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clamp_limit(limit: Option<&Value>, settings: &SearchSettings) -> usize {
    let requested = limit
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite() && *n != 0.0)
        .map(|n| n.trunc())
        .unwrap_or(settings.default_output as f64);

    requested.clamp(1.0, settings.max_output.max(1) as f64) as usize
}

/// Runs a validated search against the provider
pub async fn find_tracks(
    provider: &dyn MusicProvider,
    request: &SearchRequest,
    settings: &SearchSettings,
) -> Vec<Track> {
    let candidates = match &request.query {
        TrackQuery::Title(title) => {
            provider
                .search_tracks(title, settings.title_fetch_limit)
                .await
        }
        TrackQuery::Artist(artist) => {
            let resolved = provider
                .resolve_artist(artist)
                .await
                .unwrap_or_else(|| artist.clone());
            provider
                .artist_top_tracks(&resolved, settings.artist_top_limit)
                .await
        }
    };

    tracing::debug!(
        query = ?request.query,
        candidates = candidates.len(),
        language = request.language.as_deref().unwrap_or(""),
        "Track search candidates fetched"
    );

    let mut results = match &request.language {
        Some(language) => filter_by_language(provider, candidates, language, settings).await,
        None => candidates,
    };

    results.truncate(request.limit);
    results
}

/// Keeps candidates tagged with `language`, checking only the first
/// `tag_lookups_max` of them
async fn filter_by_language(
    provider: &dyn MusicProvider,
    candidates: Vec<Track>,
    language: &str,
    settings: &SearchSettings,
) -> Vec<Track> {
    let wanted = fold(language);

    let lookups = candidates.into_iter().take(settings.tag_lookups_max);
    let checked: Vec<(Track, bool)> = stream::iter(lookups)
        .map(|track| {
            let wanted = &wanted;
            async move {
                let tags = provider.track_tags(&track.title, &track.artist).await;
                let matches = tags.iter().any(|tag| fold(tag) == *wanted);
                (track, matches)
            }
        })
        .buffered(settings.tag_lookup_concurrency.max(1))
        .collect()
        .await;

    checked
        .into_iter()
        .filter_map(|(track, matches)| matches.then_some(track))
        .collect()
}
