use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

pub mod lastfm;

/// Separator used when a track key is rendered as a single string
pub const KEY_DELIM: &str = "|||";

/// Trims and lowercases a name for case-insensitive comparison
pub fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive artist comparison
pub fn same_artist(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// A track as returned by the provider and to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Track {
    pub title: String,
    pub artist: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn key(&self) -> TrackKey {
        TrackKey {
            artist: self.artist.clone(),
            title: self.title.clone(),
        }
    }
}

/// Identity of a candidate across seeds
///
/// Case-sensitive, exactly as the provider spelled it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey {
    pub artist: String,
    pub title: String,
}

impl Display for TrackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.artist, KEY_DELIM, self.title)
    }
}

/// A track proposed for a seed, with the provider's relevance
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub track: Track,
    /// Provider-reported affinity in `[0, 1]`, 0 when the source has none
    pub match_score: f64,
}

impl Candidate {
    pub fn new(track: Track, match_score: f64) -> Self {
        Self { track, match_score }
    }

    /// Candidate coming from a source without a relevance signal
    pub fn unscored(track: Track) -> Self {
        Self::new(track, 0.0)
    }
}

/// A candidate after preference scoring
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub track: Track,
    pub match_score: f64,
    pub preference_boost: u32,
}

/// A well-formed seed entry from the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInput {
    pub title: String,
    pub artist: String,
}

impl SeedInput {
    /// Builds a seed from a raw request entry
    ///
    /// Returns `None` for anything that is not an object carrying non-empty
    /// string `title` and `artist` fields.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let title = value.get("title")?.as_str()?;
        let artist = value.get("artist")?.as_str()?;
        if title.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }
}

/// A seed after autocorrection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub original_title: String,
    pub original_artist: String,
    pub resolved_title: String,
    pub resolved_artist: String,
}

impl Seed {
    /// Seed whose resolution produced no correction
    pub fn unresolved(input: &SeedInput) -> Self {
        Self {
            original_title: input.title.clone(),
            original_artist: input.artist.clone(),
            resolved_title: input.title.clone(),
            resolved_artist: input.artist.clone(),
        }
    }
}

/// Listener preferences
///
/// Every field is optional and forgiving: `null` or a value of the wrong
/// type reads as "no preference" instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub favorite_artists: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub preferred_genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub preferred_languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub same_artist_only: bool,
}

/// String entries of an array; anything else is empty
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Truthiness of a loosely typed flag
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => {
            !matches!(s.trim().to_lowercase().as_str(), "" | "false" | "0")
        }
        serde_json::Value::Null => false,
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// Preferences from any JSON value; non-objects mean none
fn lenient_preferences<'de, D>(deserializer: D) -> Result<Option<Preferences>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

impl Preferences {
    /// Whether candidate tags can influence the boost
    pub fn uses_tags(&self) -> bool {
        !self.preferred_genres.is_empty() || !self.preferred_languages.is_empty()
    }
}

/// Request body for `POST /api/recommend`
///
/// `track_ids` stays untyped so that a missing or non-array value is
/// reported as a validation error instead of a JSON rejection, and
/// malformed entries can be skipped one by one.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub track_ids: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_preferences")]
    pub preferences: Option<Preferences>,
}

/// Response body for `POST /api/recommend`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendResponse {
    pub recommended_tracks: Vec<Track>,
}

/// Request body for `POST /api/find-tracks`
#[derive(Debug, Default, Deserialize)]
pub struct FindTracksRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Kept loose: anything that is not a positive number means "default"
    #[serde(default)]
    pub limit: Option<serde_json::Value>,
}

/// Response body for `POST /api/find-tracks`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FindTracksResponse {
    pub results: Vec<Track>,
}
