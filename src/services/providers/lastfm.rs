/// Last.fm API provider
///
/// Every capability is a single GET against the Last.fm REST root with the
/// method name in the query string. Calls share one `reqwest` client whose
/// timeout bounds each request; there is no retry. Failures are logged and
/// converted to the capability's empty value.
use crate::{
    error::{AppError, AppResult},
    models::{
        lastfm::{
            ArtistSearchResponse, ArtistTopTracksResponse, SimilarTracksResponse,
            TopTagsResponse, TrackItem, TrackList, TrackSearchResponse, TracksResponse,
        },
        Candidate, Track,
    },
    services::providers::MusicProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

const PROVIDER: &str = "lastfm";

#[derive(Clone)]
pub struct LastFmProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl LastFmProvider {
    /// Creates a provider whose every request is bounded by `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    /// Performs one Last.fm method call and decodes the payload
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("method", method),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Last.fm {} returned status {}: {}",
                method, status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_payload(method, body)
    }

    async fn fetch_search(&self, title: &str, artist: Option<&str>, limit: usize) -> AppResult<Vec<Track>> {
        let limit = limit.to_string();
        let mut params = vec![
            ("track", title),
            ("limit", limit.as_str()),
            ("autocorrect", "1"),
        ];
        if let Some(artist) = artist {
            params.push(("artist", artist));
        }

        let response: TrackSearchResponse = self.call("track.search", &params).await?;
        Ok(into_tracks(
            response.results.and_then(|r| r.trackmatches),
            artist.unwrap_or_default(),
        ))
    }

    async fn fetch_similar(&self, title: &str, artist: &str, limit: usize) -> AppResult<Vec<Candidate>> {
        let limit = limit.to_string();
        let response: SimilarTracksResponse = self
            .call(
                "track.getSimilar",
                &[
                    ("artist", artist),
                    ("track", title),
                    ("limit", limit.as_str()),
                    ("autocorrect", "1"),
                ],
            )
            .await?;

        Ok(response
            .similartracks
            .map(|list| list.into_items())
            .unwrap_or_default()
            .into_iter()
            .filter_map(TrackItem::into_candidate)
            .collect())
    }

    async fn fetch_tags(&self, title: &str, artist: &str) -> AppResult<Vec<String>> {
        let response: TopTagsResponse = self
            .call(
                "track.getTopTags",
                &[("artist", artist), ("track", title), ("autocorrect", "1")],
            )
            .await?;

        Ok(response.into_tag_names())
    }

    async fn fetch_tag_tracks(&self, tag: &str, limit: usize) -> AppResult<Vec<Track>> {
        let limit = limit.to_string();
        let response: TracksResponse = self
            .call("tag.getTopTracks", &[("tag", tag), ("limit", limit.as_str())])
            .await?;

        Ok(into_tracks(response.tracks, ""))
    }

    async fn fetch_artist_tracks(&self, artist: &str, limit: usize) -> AppResult<Vec<Track>> {
        let limit = limit.to_string();
        let response: ArtistTopTracksResponse = self
            .call(
                "artist.getTopTracks",
                &[
                    ("artist", artist),
                    ("limit", limit.as_str()),
                    ("autocorrect", "1"),
                ],
            )
            .await?;

        Ok(into_tracks(response.toptracks, artist))
    }

    async fn fetch_chart(&self, limit: usize) -> AppResult<Vec<Track>> {
        let limit = limit.to_string();
        let response: TracksResponse = self
            .call("chart.getTopTracks", &[("limit", limit.as_str())])
            .await?;

        Ok(into_tracks(response.tracks, ""))
    }

    async fn fetch_artist_match(&self, artist: &str) -> AppResult<Option<String>> {
        let response: ArtistSearchResponse = self
            .call("artist.search", &[("artist", artist), ("limit", "1")])
            .await?;

        Ok(response
            .results
            .and_then(|r| r.artistmatches)
            .unwrap_or_default()
            .artist
            .into_vec()
            .into_iter()
            .map(|a| a.name)
            .find(|name| !name.trim().is_empty()))
    }
}

fn into_tracks(list: Option<TrackList>, fallback_artist: &str) -> Vec<Track> {
    list.map(TrackList::into_items)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.into_track(fallback_artist))
        .collect()
}

/// Decodes a Last.fm payload, treating `{"error": n, "message": ..}` as a failure
fn parse_payload<T: DeserializeOwned>(method: &str, body: serde_json::Value) -> AppResult<T> {
    if let Some(code) = body.get("error") {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        return Err(AppError::ExternalApi(format!(
            "Last.fm {} returned error {}: {}",
            method, code, message
        )));
    }

    serde_json::from_value(body).map_err(|e| {
        AppError::ExternalApi(format!("Failed to parse Last.fm {} response: {}", method, e))
    })
}

/// Collapses a failed call to its empty value
fn or_empty<T: Default>(method: &str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(
            provider = PROVIDER,
            method = %method,
            error = %e,
            "Provider call failed, treating as empty"
        );
        T::default()
    })
}

#[async_trait::async_trait]
impl MusicProvider for LastFmProvider {
    async fn search_best_match(&self, title: &str, artist: &str) -> Option<Track> {
        let matches = or_empty("track.search", self.fetch_search(title, Some(artist), 1).await);
        matches.into_iter().next()
    }

    async fn similar_tracks(&self, title: &str, artist: &str, limit: usize) -> Vec<Candidate> {
        let candidates = or_empty("track.getSimilar", self.fetch_similar(title, artist, limit).await);

        tracing::debug!(
            title = %title,
            artist = %artist,
            results = candidates.len(),
            provider = PROVIDER,
            "Similar tracks fetched"
        );

        candidates
    }

    async fn top_tag(&self, title: &str, artist: &str) -> Option<String> {
        or_empty("track.getTopTags", self.fetch_tags(title, artist).await)
            .into_iter()
            .next()
    }

    async fn track_tags(&self, title: &str, artist: &str) -> Vec<String> {
        or_empty("track.getTopTags", self.fetch_tags(title, artist).await)
    }

    async fn tag_top_tracks(&self, tag: &str, limit: usize) -> Vec<Track> {
        or_empty("tag.getTopTracks", self.fetch_tag_tracks(tag, limit).await)
    }

    async fn artist_top_track(&self, artist: &str) -> Option<Track> {
        or_empty("artist.getTopTracks", self.fetch_artist_tracks(artist, 1).await)
            .into_iter()
            .next()
    }

    async fn global_top_track(&self) -> Option<Track> {
        or_empty("chart.getTopTracks", self.fetch_chart(1).await)
            .into_iter()
            .next()
    }

    async fn search_tracks(&self, title: &str, limit: usize) -> Vec<Track> {
        or_empty("track.search", self.fetch_search(title, None, limit).await)
    }

    async fn resolve_artist(&self, artist: &str) -> Option<String> {
        or_empty("artist.search", self.fetch_artist_match(artist).await)
    }

    async fn artist_top_tracks(&self, artist: &str, limit: usize) -> Vec<Track> {
        or_empty("artist.getTopTracks", self.fetch_artist_tracks(artist, limit).await)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
