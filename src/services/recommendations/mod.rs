//! Recommendation engine
//!
//! Each seed is autocorrected, run through its fallback chain, scored against
//! the listener's preferences and ranked on its own. The per-seed rankings are
//! then folded into one weighted Borda ranking. When no seed yields anything
//! the engine falls back to the global chart (or, in same-artist mode, to the
//! seed artists' top tracks).

pub mod fallback;
pub mod ranking;
pub mod scoring;
pub mod seed;

use futures::future::join_all;
use std::{sync::Arc, time::Instant};

use crate::{
    error::{AppError, AppResult},
    models::{fold, same_artist, Preferences, SeedInput, Track},
    services::providers::MusicProvider,
};

pub use fallback::{CandidateSource, FallbackChain};
pub use ranking::{aggregate, aggregate_scores, AggregateScore, SeedRanking};
pub use scoring::{preference_boost, score_candidates};
pub use seed::resolve_seed;

const NO_RECOMMENDATIONS: &str = "No recommendations available.";
const NO_SAME_ARTIST_RECOMMENDATIONS: &str = "No same-artist recommendations available.";

/// Tunables of the recommendation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendSettings {
    /// Fetch size for the similar-tracks and tag-top-tracks sources
    pub similar_limit: usize,
    /// Length cap of the final list
    pub max_results: usize,
    /// Tag lookups in flight per seed
    pub tag_lookup_concurrency: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            similar_limit: 100,
            max_results: 3,
            tag_lookup_concurrency: 25,
        }
    }
}

/// What one seed produced
struct SeedOutcome {
    resolved_artist: String,
    ranking: SeedRanking,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    provider: Arc<dyn MusicProvider>,
    settings: RecommendSettings,
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn MusicProvider>, settings: RecommendSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &RecommendSettings {
        &self.settings
    }

    pub fn provider(&self) -> Arc<dyn MusicProvider> {
        Arc::clone(&self.provider)
    }

    /// Recommends up to `max_results` tracks for the given seeds
    ///
    /// Never returns an empty list: exhaustion is reported as
    /// [`AppError::NotFound`].
    pub async fn recommend(
        &self,
        inputs: &[SeedInput],
        prefs: &Preferences,
    ) -> AppResult<Vec<Track>> {
        let started = Instant::now();
        let chain = FallbackChain::for_preferences(prefs, self.settings.similar_limit);

        let outcomes = join_all(
            inputs
                .iter()
                .map(|input| self.process_seed(input, prefs, &chain)),
        )
        .await;

        let seed_artists = distinct_artists(outcomes.iter().map(|o| o.resolved_artist.as_str()));
        let rankings: Vec<SeedRanking> = outcomes
            .into_iter()
            .map(|o| o.ranking)
            .filter(|r| !r.is_empty())
            .collect();

        tracing::debug!(
            seeds = inputs.len(),
            productive_seeds = rankings.len(),
            same_artist_only = prefs.same_artist_only,
            "Seeds processed"
        );

        let tracks = if rankings.is_empty() {
            if prefs.same_artist_only {
                self.same_artist_fallback(&seed_artists).await?
            } else {
                self.global_fallback().await?
            }
        } else {
            let mut ranked = aggregate(&rankings);
            if let Some(leader) = ranked.first() {
                tracing::debug!(
                    leader = %leader.key(),
                    candidates = ranked.len(),
                    "Seed rankings aggregated"
                );
            }
            if prefs.same_artist_only {
                retain_seed_artists(&mut ranked, &seed_artists);
                if ranked.is_empty() {
                    ranked = self.same_artist_fallback(&seed_artists).await?;
                }
            }
            ranked.truncate(self.settings.max_results);
            ranked
        };

        tracing::info!(
            seeds = inputs.len(),
            recommendations = tracks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Ok(tracks)
    }

    async fn process_seed(
        &self,
        input: &SeedInput,
        prefs: &Preferences,
        chain: &FallbackChain,
    ) -> SeedOutcome {
        let provider = self.provider.as_ref();
        let seed = resolve_seed(provider, input).await;
        let candidates = chain.run(provider, &seed).await;
        let scored =
            score_candidates(provider, candidates, prefs, self.settings.tag_lookup_concurrency)
                .await;

        SeedOutcome {
            resolved_artist: seed.resolved_artist,
            ranking: SeedRanking::from_scored(scored),
        }
    }

    /// One chart track, used only when every seed came up empty
    async fn global_fallback(&self) -> AppResult<Vec<Track>> {
        match self.provider.global_top_track().await {
            Some(track) => {
                tracing::info!(title = %track.title, artist = %track.artist, "Using global fallback");
                Ok(vec![track])
            }
            None => Err(AppError::NotFound(NO_RECOMMENDATIONS.to_string())),
        }
    }

    /// Top track of each seed artist, restricted to that artist
    async fn same_artist_fallback(&self, seed_artists: &[String]) -> AppResult<Vec<Track>> {
        let mut tracks = Vec::new();

        for artist in seed_artists {
            if tracks.len() >= self.settings.max_results {
                break;
            }
            if let Some(track) = self.provider.artist_top_track(artist).await {
                if same_artist(&track.artist, artist) && !tracks.contains(&track) {
                    tracks.push(track);
                }
            }
        }

        if tracks.is_empty() {
            return Err(AppError::NotFound(NO_SAME_ARTIST_RECOMMENDATIONS.to_string()));
        }

        tracing::info!(tracks = tracks.len(), "Using same-artist fallback");
        Ok(tracks)
    }
}

/// Artists in first-seen order, ignoring case and surrounding whitespace
fn distinct_artists<'a>(artists: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    artists
        .filter(|artist| !artist.trim().is_empty())
        .filter(|artist| seen.insert(fold(artist)))
        .map(str::to_string)
        .collect()
}

/// Keeps only tracks by one of the seed artists
fn retain_seed_artists(tracks: &mut Vec<Track>, seed_artists: &[String]) {
    tracks.retain(|track| {
        seed_artists
            .iter()
            .any(|artist| same_artist(&track.artist, artist))
    });
}
