use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tower::ServiceExt;

use music_rec_api::{
    models::{Candidate, Track},
    routes::{create_router, AppState},
    services::{
        providers::MusicProvider,
        recommendations::{RecommendSettings, RecommendationEngine},
        track_search::SearchSettings,
    },
};

/// Provider answering from fixed tables, keyed by `title|artist`
#[derive(Default)]
struct ScriptedProvider {
    similar: HashMap<String, Vec<Candidate>>,
    tags: HashMap<String, Vec<String>>,
    search: Vec<Track>,
    artist_tracks: HashMap<String, Vec<Track>>,
    global: Option<Track>,
    calls: AtomicUsize,
}

fn key(title: &str, artist: &str) -> String {
    format!("{title}|{artist}")
}

#[async_trait::async_trait]
impl MusicProvider for ScriptedProvider {
    async fn search_best_match(&self, _title: &str, _artist: &str) -> Option<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }

    async fn similar_tracks(&self, title: &str, artist: &str, limit: usize) -> Vec<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut found = self.similar.get(&key(title, artist)).cloned().unwrap_or_default();
        found.truncate(limit);
        found
    }

    async fn top_tag(&self, _title: &str, _artist: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }

    async fn track_tags(&self, title: &str, artist: &str) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tags.get(&key(title, artist)).cloned().unwrap_or_default()
    }

    async fn tag_top_tracks(&self, _tag: &str, _limit: usize) -> Vec<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }

    async fn artist_top_track(&self, artist: &str) -> Option<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.artist_tracks
            .get(artist)
            .and_then(|tracks| tracks.first().cloned())
    }

    async fn global_top_track(&self) -> Option<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.global.clone()
    }

    async fn search_tracks(&self, _title: &str, limit: usize) -> Vec<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.search.iter().take(limit).cloned().collect()
    }

    async fn resolve_artist(&self, _artist: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }

    async fn artist_top_tracks(&self, artist: &str, limit: usize) -> Vec<Track> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.artist_tracks
            .get(artist)
            .map(|tracks| tracks.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn candidate(title: &str, artist: &str, match_score: f64) -> Candidate {
    Candidate::new(Track::new(title, artist), match_score)
}

fn scripted() -> ScriptedProvider {
    let mut provider = ScriptedProvider {
        global: Some(Track::new("Chart Topper", "Somebody")),
        ..ScriptedProvider::default()
    };
    provider.similar.insert(
        key("A", "X"),
        vec![
            candidate("T1", "X", 0.9),
            candidate("T2", "Y", 0.8),
            candidate("T3", "Z", 0.7),
            candidate("T4", "W", 0.6),
        ],
    );
    provider.tags.insert(key("T1", "X"), vec!["pop".to_string()]);
    provider.tags.insert(key("T3", "Z"), vec!["Pop".to_string()]);
    provider.search = (0..20)
        .map(|i| Track::new(format!("Song {i}"), "Artist"))
        .collect();
    provider
}

fn app_with(provider: Arc<ScriptedProvider>) -> Router {
    let engine = RecommendationEngine::new(provider, RecommendSettings::default());
    create_router(Arc::new(AppState::new(engine, SearchSettings::default())))
}

fn app() -> Router {
    app_with(Arc::new(scripted()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn titles(body: &Value, field: &str) -> Vec<String> {
    body[field]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_recommend_requires_track_ids() {
    let provider = Arc::new(scripted());

    for body in [
        json!({}),
        json!({ "track_ids": [] }),
        json!({ "track_ids": "A - X" }),
        json!({ "track_ids": { "title": "A", "artist": "X" } }),
    ] {
        let (status, body) = send(app_with(provider.clone()), post_json("/api/recommend", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "track_ids (non-empty array) is required");
    }

    // Validation happens before any provider call
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recommend_rejects_non_json_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/recommend")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "track_ids (non-empty array) is required");
}

#[tokio::test]
async fn test_recommend_ranks_by_genre_preference() {
    let request = post_json(
        "/api/recommend",
        json!({
            "track_ids": [{ "title": "A", "artist": "X" }],
            "preferences": { "preferred_genres": ["pop"] }
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["T1", "T3", "T2"]);
    assert_eq!(body["recommended_tracks"][0]["artist"], "X");
}

#[tokio::test]
async fn test_recommend_tolerates_null_and_loose_preferences() {
    let request = post_json(
        "/api/recommend",
        json!({
            "track_ids": [{ "title": "A", "artist": "X" }],
            "preferences": {
                "favorite_artists": null,
                "preferred_genres": ["pop"],
                "preferred_languages": null,
                "same_artist_only": null
            }
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["T1", "T3", "T2"]);

    let request = post_json(
        "/api/recommend",
        json!({
            "track_ids": [{ "title": "A", "artist": "X" }],
            "preferences": "none"
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["T1", "T2", "T3"]);
}

#[tokio::test]
async fn test_recommend_skips_malformed_entries() {
    let request = post_json(
        "/api/recommend",
        json!({
            "track_ids": [
                { "title": "A" },
                "junk",
                { "title": "", "artist": "X" },
                { "title": "A", "artist": "X" }
            ]
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["T1", "T2", "T3"]);
}

#[tokio::test]
async fn test_recommend_all_malformed_uses_global_fallback() {
    let request = post_json("/api/recommend", json!({ "track_ids": [{ "artist": "X" }] }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["Chart Topper"]);
}

#[tokio::test]
async fn test_recommend_not_found_when_nothing_available() {
    let provider = ScriptedProvider::default();
    let request = post_json(
        "/api/recommend",
        json!({ "track_ids": [{ "title": "NoSong", "artist": "NoArtist" }] }),
    );
    let (status, body) = send(app_with(Arc::new(provider)), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No recommendations available.");
}

#[tokio::test]
async fn test_recommend_same_artist_only() {
    let mut provider = scripted();
    provider
        .artist_tracks
        .insert("Y".to_string(), vec![Track::new("Y Hit", "Y")]);
    let request = post_json(
        "/api/recommend",
        json!({
            "track_ids": [{ "title": "B", "artist": "Y" }],
            "preferences": { "same_artist_only": true }
        }),
    );
    let (status, body) = send(app_with(Arc::new(provider)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "recommended_tracks"), vec!["Y Hit"]);
}

#[tokio::test]
async fn test_find_tracks_validation() {
    for body in [
        json!({}),
        json!({ "title": "Song", "artist": "Artist" }),
        json!({ "language": "english" }),
    ] {
        let (status, body) = send(app(), post_json("/api/find-tracks", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Provide exactly one of 'title' or 'artist'. Optional: 'language', 'limit'."
        );
    }
}

#[tokio::test]
async fn test_find_tracks_limit() {
    let (status, body) = send(app(), post_json("/api/find-tracks", json!({ "title": "Song" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 10);

    let (_, body) = send(
        app(),
        post_json("/api/find-tracks", json!({ "title": "Song", "limit": 3 })),
    )
    .await;
    assert_eq!(titles(&body, "results"), vec!["Song 0", "Song 1", "Song 2"]);

    let (_, body) = send(
        app(),
        post_json("/api/find-tracks", json!({ "title": "Song", "limit": 999 })),
    )
    .await;
    assert_eq!(body["results"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_find_tracks_by_artist() {
    let mut provider = scripted();
    provider.artist_tracks.insert(
        "Radiohead".to_string(),
        vec![Track::new("Creep", "Radiohead"), Track::new("Nude", "Radiohead")],
    );
    let request = post_json("/api/find-tracks", json!({ "artist": "Radiohead" }));
    let (status, body) = send(app_with(Arc::new(provider)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body, "results"), vec!["Creep", "Nude"]);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let id = "0b6f2f4e-9d3c-4a51-8e7d-2c1b0a9f8e7d";
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", id)
        .body(Body::empty())
        .unwrap();
    let response = tokio_test::assert_ok!(app().oneshot(request).await);

    assert_eq!(response.headers()["x-request-id"], id);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = tokio_test::assert_ok!(app().oneshot(request).await);
    assert!(response.headers().contains_key("x-request-id"));
}
