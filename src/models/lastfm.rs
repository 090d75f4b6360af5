//! Last.fm API response types
//!
//! Last.fm nests JSON awkwardly and is inconsistent between methods: a list
//! with one element may arrive as a bare object, `artist` is a plain string in
//! `track.search` but `{ "name": .. }` elsewhere, and `match` may be a string
//! or a number. These types absorb those differences so the provider only
//! deals with [`Track`] and [`Candidate`].

use serde::Deserialize;

use super::{Candidate, Track};

/// A list that Last.fm may collapse to a single object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArtistField {
    Name(String),
    Object(ArtistObject),
}

impl Default for ArtistField {
    fn default() -> Self {
        ArtistField::Name(String::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistObject {
    #[serde(default)]
    pub name: String,
}

impl ArtistField {
    pub fn name(&self) -> &str {
        match self {
            ArtistField::Name(name) => name,
            ArtistField::Object(obj) => &obj.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Number(f64),
    Text(String),
}

impl MatchValue {
    /// Relevance as a finite number, 0 when unparseable
    pub fn score(&self) -> f64 {
        let score = match self {
            MatchValue::Number(n) => *n,
            MatchValue::Text(s) => s.trim().parse().unwrap_or(0.0),
        };
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }
}

/// A track entry, shared by every track-list method
#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: ArtistField,
    #[serde(rename = "match", default)]
    pub match_score: Option<MatchValue>,
}

impl TrackItem {
    /// Converts to a [`Track`], substituting `fallback_artist` when the
    /// entry has no artist name. Entries without a title are dropped.
    pub fn into_track(self, fallback_artist: &str) -> Option<Track> {
        if self.name.is_empty() {
            return None;
        }
        let artist = match self.artist.name() {
            "" => fallback_artist.to_string(),
            name => name.to_string(),
        };
        Some(Track::new(self.name, artist))
    }

    pub fn into_candidate(self) -> Option<Candidate> {
        let score = self.match_score.as_ref().map(MatchValue::score).unwrap_or(0.0);
        self.into_track("").map(|track| Candidate::new(track, score))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackList {
    #[serde(default)]
    pub track: OneOrMany<TrackItem>,
}

/// `track.search`
#[derive(Debug, Deserialize)]
pub struct TrackSearchResponse {
    #[serde(default)]
    pub results: Option<TrackSearchResults>,
}

#[derive(Debug, Deserialize)]
pub struct TrackSearchResults {
    #[serde(default)]
    pub trackmatches: Option<TrackList>,
}

/// `track.getSimilar`
#[derive(Debug, Deserialize)]
pub struct SimilarTracksResponse {
    #[serde(default)]
    pub similartracks: Option<TrackList>,
}

/// `tag.getTopTracks` and `chart.getTopTracks`
#[derive(Debug, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub tracks: Option<TrackList>,
}

/// `artist.getTopTracks`
#[derive(Debug, Deserialize)]
pub struct ArtistTopTracksResponse {
    #[serde(default)]
    pub toptracks: Option<TrackList>,
}

/// `track.getTopTags`
#[derive(Debug, Deserialize)]
pub struct TopTagsResponse {
    #[serde(default)]
    pub toptags: Option<TopTags>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopTags {
    #[serde(default)]
    pub tag: OneOrMany<TagItem>,
}

#[derive(Debug, Deserialize)]
pub struct TagItem {
    #[serde(default)]
    pub name: String,
}

/// `artist.search`
#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub results: Option<ArtistSearchResults>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistSearchResults {
    #[serde(default)]
    pub artistmatches: Option<ArtistMatches>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistMatches {
    #[serde(default)]
    pub artist: OneOrMany<ArtistObject>,
}

impl TrackList {
    pub fn into_items(self) -> Vec<TrackItem> {
        self.track.into_vec()
    }
}

impl TopTagsResponse {
    /// Tag names, lowercased, in provider order
    pub fn into_tag_names(self) -> Vec<String> {
        self.toptags
            .unwrap_or_default()
            .tag
            .into_vec()
            .into_iter()
            .map(|t| t.name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }
}
