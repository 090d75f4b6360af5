/// Music metadata provider abstraction
///
/// The recommendation engine and the track search only talk to this trait.
/// Every capability fails closed: transport errors, timeouts and malformed
/// payloads come back as an empty list or `None`, never as an error, so a
/// single failed lookup can only ever shrink a result.
use crate::models::{Candidate, Track};

pub mod lastfm;

pub use lastfm::LastFmProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MusicProvider: Send + Sync {
    /// Best autocorrected match for a (title, artist) pair
    async fn search_best_match(&self, title: &str, artist: &str) -> Option<Track>;

    /// Tracks similar to the given one, each with a relevance in `[0, 1]`
    async fn similar_tracks(&self, title: &str, artist: &str, limit: usize) -> Vec<Candidate>;

    /// The single most popular descriptive tag of a track, lowercased
    async fn top_tag(&self, title: &str, artist: &str) -> Option<String>;

    /// All descriptive tags of a track, lowercased
    async fn track_tags(&self, title: &str, artist: &str) -> Vec<String>;

    /// Most popular tracks carrying a tag
    async fn tag_top_tracks(&self, tag: &str, limit: usize) -> Vec<Track>;

    /// An artist's most popular track
    async fn artist_top_track(&self, artist: &str) -> Option<Track>;

    /// The current top track of the provider-wide chart
    async fn global_top_track(&self) -> Option<Track>;

    /// Title-only track search
    async fn search_tracks(&self, title: &str, limit: usize) -> Vec<Track>;

    /// Canonical spelling of an artist name
    async fn resolve_artist(&self, artist: &str) -> Option<String>;

    /// An artist's most popular tracks
    async fn artist_top_tracks(&self, artist: &str, limit: usize) -> Vec<Track>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
