use crate::{
    models::{same_artist, Candidate, Preferences, Seed},
    services::providers::MusicProvider,
};

/// A place candidates for a seed can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Tracks the provider considers similar to the seed, with relevance
    SimilarTracks { limit: usize },
    /// Top tracks of the seed's most popular tag
    TagTopTracks { limit: usize },
    /// The seed artist's single most popular track
    ArtistTopTrack,
}

impl CandidateSource {
    pub fn name(&self) -> &'static str {
        match self {
            CandidateSource::SimilarTracks { .. } => "similar_tracks",
            CandidateSource::TagTopTracks { .. } => "tag_top_tracks",
            CandidateSource::ArtistTopTrack => "artist_top_track",
        }
    }

    /// Produces this source's candidates for a seed, in provider order
    pub async fn fetch(&self, provider: &dyn MusicProvider, seed: &Seed) -> Vec<Candidate> {
        match *self {
            CandidateSource::SimilarTracks { limit } => {
                provider
                    .similar_tracks(&seed.resolved_title, &seed.resolved_artist, limit)
                    .await
            }
            CandidateSource::TagTopTracks { limit } => {
                let Some(tag) = provider
                    .top_tag(&seed.resolved_title, &seed.resolved_artist)
                    .await
                else {
                    return Vec::new();
                };

                provider
                    .tag_top_tracks(&tag, limit)
                    .await
                    .into_iter()
                    .map(Candidate::unscored)
                    .collect()
            }
            CandidateSource::ArtistTopTrack => provider
                .artist_top_track(&seed.resolved_artist)
                .await
                .map(Candidate::unscored)
                .into_iter()
                .collect(),
        }
    }
}

/// Ordered candidate sources, tried until one yields something
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    sources: Vec<CandidateSource>,
    same_artist_only: bool,
}

impl FallbackChain {
    pub fn new(sources: Vec<CandidateSource>, same_artist_only: bool) -> Self {
        Self {
            sources,
            same_artist_only,
        }
    }

    /// Similar tracks, then the seed's top tag, then the seed artist
    pub fn standard(limit: usize) -> Self {
        Self::new(
            vec![
                CandidateSource::SimilarTracks { limit },
                CandidateSource::TagTopTracks { limit },
                CandidateSource::ArtistTopTrack,
            ],
            false,
        )
    }

    /// Similar tracks by the seed artist, then the seed artist's top track
    ///
    /// Tag results are skipped entirely: they almost never share the seed
    /// artist.
    pub fn same_artist(limit: usize) -> Self {
        Self::new(
            vec![
                CandidateSource::SimilarTracks { limit },
                CandidateSource::ArtistTopTrack,
            ],
            true,
        )
    }

    pub fn for_preferences(prefs: &Preferences, limit: usize) -> Self {
        if prefs.same_artist_only {
            Self::same_artist(limit)
        } else {
            Self::standard(limit)
        }
    }

    pub fn sources(&self) -> &[CandidateSource] {
        &self.sources
    }

    /// Returns the first non-empty candidate list, or nothing
    pub async fn run(&self, provider: &dyn MusicProvider, seed: &Seed) -> Vec<Candidate> {
        for source in &self.sources {
            let mut candidates = source.fetch(provider, seed).await;

            if self.same_artist_only {
                candidates.retain(|c| same_artist(&c.track.artist, &seed.resolved_artist));
            }

            if !candidates.is_empty() {
                tracing::debug!(
                    seed_title = %seed.resolved_title,
                    seed_artist = %seed.resolved_artist,
                    source = source.name(),
                    candidates = candidates.len(),
                    "Candidate source produced results"
                );
                return candidates;
            }

            tracing::debug!(
                seed_title = %seed.resolved_title,
                seed_artist = %seed.resolved_artist,
                source = source.name(),
                "Candidate source empty, falling back"
            );
        }

        Vec::new()
    }
}
