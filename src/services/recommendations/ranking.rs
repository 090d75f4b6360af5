use std::collections::{HashMap, HashSet};

use crate::models::{ScoredCandidate, Track, TrackKey};

/// One candidate's place in a seed's ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub track: Track,
    /// `1 + preference boost`, as computed for this seed
    pub weight: u32,
    pub match_score: f64,
}

/// Candidates of one seed, best first, without duplicate keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedRanking {
    entries: Vec<RankedEntry>,
}

impl SeedRanking {
    /// Orders scored candidates by boost, then provider relevance
    ///
    /// The sort is stable, so equal candidates keep provider order. A key
    /// seen twice keeps only its best position.
    pub fn from_scored(mut candidates: Vec<ScoredCandidate>) -> Self {
        candidates.sort_by(|a, b| {
            b.preference_boost
                .cmp(&a.preference_boost)
                .then_with(|| b.match_score.total_cmp(&a.match_score))
        });

        let mut seen = HashSet::new();
        let entries = candidates
            .into_iter()
            .filter(|c| seen.insert(c.track.key()))
            .map(|c| RankedEntry {
                weight: 1 + c.preference_boost,
                match_score: c.match_score,
                track: c.track,
            })
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// Weighted Borda points awarded by this ranking
    ///
    /// Position `i` of a list of length `L` earns `(L - i) * weight`.
    pub fn contribution(&self) -> AggregateScore {
        let len = self.entries.len() as u64;
        self.entries
            .iter()
            .enumerate()
            .fold(AggregateScore::default(), |mut acc, (i, entry)| {
                let points = (len - i as u64) * u64::from(entry.weight);
                acc.accumulate(entry.track.clone(), points, entry.match_score);
                acc
            })
    }
}

#[derive(Debug, Clone)]
struct AggregateEntry {
    track: Track,
    score: u64,
    best_match: f64,
}

/// Accumulated Borda scores, kept in first-seen order
#[derive(Debug, Clone, Default)]
pub struct AggregateScore {
    entries: Vec<AggregateEntry>,
    index: HashMap<TrackKey, usize>,
}

impl AggregateScore {
    fn accumulate(&mut self, track: Track, points: u64, match_score: f64) {
        let key = track.key();
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.score += points;
                entry.best_match = entry.best_match.max(match_score);
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(AggregateEntry {
                    track,
                    score: points,
                    best_match: match_score,
                });
            }
        }
    }

    /// Merges two partial aggregates by summing scores per key
    pub fn merge(mut self, other: AggregateScore) -> Self {
        for entry in other.entries {
            self.accumulate(entry.track, entry.score, entry.best_match);
        }
        self
    }

    pub fn score_of(&self, track: &Track) -> Option<u64> {
        self.index
            .get(&track.key())
            .map(|&i| self.entries[i].score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracks by score, then best match score, then first-seen order
    pub fn into_ranked(self) -> Vec<Track> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.best_match.total_cmp(&a.best_match))
        });
        entries.into_iter().map(|e| e.track).collect()
    }
}

/// Folds every seed's contribution into one aggregate
pub fn aggregate_scores(rankings: &[SeedRanking]) -> AggregateScore {
    rankings
        .iter()
        .map(SeedRanking::contribution)
        .fold(AggregateScore::default(), AggregateScore::merge)
}

/// Global ranking across seeds by weighted Borda count
pub fn aggregate(rankings: &[SeedRanking]) -> Vec<Track> {
    aggregate_scores(rankings).into_ranked()
}
