use futures::stream::{self, StreamExt};
use std::collections::HashSet;

use crate::{
    models::{fold, same_artist, Candidate, Preferences, ScoredCandidate, Track},
    services::providers::MusicProvider,
};

pub const FAVORITE_ARTIST_BOOST: u32 = 5;
pub const GENRE_BOOST: u32 = 3;
pub const LANGUAGE_BOOST: u32 = 2;

/// Case-folded tag set of one candidate
pub fn tag_set<I>(tags: I) -> HashSet<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter().map(|t| fold(&t)).collect()
}

/// Additive boost for a candidate given listener preferences
///
/// Each rule contributes at most once, however many entries match.
pub fn preference_boost(track: &Track, prefs: &Preferences, tags: &HashSet<String>) -> u32 {
    let mut boost = 0;

    if prefs
        .favorite_artists
        .iter()
        .any(|artist| same_artist(artist, &track.artist))
    {
        boost += FAVORITE_ARTIST_BOOST;
    }

    if prefs
        .preferred_genres
        .iter()
        .any(|genre| tags.contains(&fold(genre)))
    {
        boost += GENRE_BOOST;
    }

    if prefs
        .preferred_languages
        .iter()
        .any(|language| tags.contains(&fold(language)))
    {
        boost += LANGUAGE_BOOST;
    }

    boost
}

/// Fetches tags and scores every candidate of one seed
///
/// Tag lookups run with at most `concurrency` in flight and results keep the
/// input order. When the preferences carry no genre or language the lookups
/// are skipped, since tags could not change any boost.
pub async fn score_candidates(
    provider: &dyn MusicProvider,
    candidates: Vec<Candidate>,
    prefs: &Preferences,
    concurrency: usize,
) -> Vec<ScoredCandidate> {
    let fetch_tags = prefs.uses_tags();

    stream::iter(candidates)
        .map(|candidate| async move {
            let tags = if fetch_tags {
                tag_set(
                    provider
                        .track_tags(&candidate.track.title, &candidate.track.artist)
                        .await,
                )
            } else {
                HashSet::new()
            };

            let preference_boost = preference_boost(&candidate.track, prefs, &tags);
            ScoredCandidate {
                track: candidate.track,
                match_score: candidate.match_score,
                preference_boost,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMusicProvider;
    use mockall::predicate::eq;

    fn prefs() -> Preferences {
        Preferences {
            favorite_artists: vec!["Radiohead".to_string()],
            preferred_genres: vec!["Pop".to_string(), "rock".to_string()],
            preferred_languages: vec!["english".to_string()],
            same_artist_only: false,
        }
    }

    fn tags(names: &[&str]) -> HashSet<String> {
        tag_set(names.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_preferences_no_boost() {
        let track = Track::new("Creep", "Radiohead");
        assert_eq!(
            preference_boost(&track, &Preferences::default(), &tags(&["pop", "english"])),
            0
        );
    }

    #[test]
    fn test_favorite_artist_case_insensitive() {
        let track = Track::new("Creep", "  RADIOHEAD ");
        assert_eq!(preference_boost(&track, &prefs(), &HashSet::new()), 5);
    }

    #[test]
    fn test_genre_and_language_from_tags() {
        let track = Track::new("Song", "Someone");
        assert_eq!(preference_boost(&track, &prefs(), &tags(&["POP"])), 3);
        assert_eq!(preference_boost(&track, &prefs(), &tags(&["English"])), 2);
        assert_eq!(preference_boost(&track, &prefs(), &tags(&["jazz"])), 0);
    }

    #[test]
    fn test_all_rules_add_up_once_each() {
        let track = Track::new("Creep", "Radiohead");
        // Two matching genres still count as one genre match
        let boost = preference_boost(&track, &prefs(), &tags(&["pop", "rock", "english"]));
        assert_eq!(boost, 5 + 3 + 2);
    }

    #[tokio::test]
    async fn test_score_candidates_fetches_tags_per_candidate() {
        let mut provider = MockMusicProvider::new();
        provider
            .expect_track_tags()
            .with(eq("T1"), eq("X"))
            .times(1)
            .returning(|_, _| vec!["pop".to_string()]);
        provider
            .expect_track_tags()
            .with(eq("T2"), eq("Y"))
            .times(1)
            .returning(|_, _| vec!["jazz".to_string()]);

        let candidates = vec![
            Candidate::new(Track::new("T1", "X"), 0.9),
            Candidate::new(Track::new("T2", "Y"), 0.8),
        ];
        let prefs = Preferences {
            preferred_genres: vec!["pop".to_string()],
            ..Preferences::default()
        };

        let scored = score_candidates(&provider, candidates, &prefs, 25).await;

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].track.title, "T1");
        assert_eq!(scored[0].preference_boost, 3);
        assert_eq!(scored[0].match_score, 0.9);
        assert_eq!(scored[1].preference_boost, 0);
    }

    #[tokio::test]
    async fn test_score_candidates_skips_tags_without_tag_preferences() {
        let mut provider = MockMusicProvider::new();
        provider.expect_track_tags().never();

        let candidates = vec![Candidate::unscored(Track::new("T1", "Fav"))];
        let prefs = Preferences {
            favorite_artists: vec!["fav".to_string()],
            ..Preferences::default()
        };

        let scored = score_candidates(&provider, candidates, &prefs, 1).await;
        assert_eq!(scored[0].preference_boost, FAVORITE_ARTIST_BOOST);
    }
}
