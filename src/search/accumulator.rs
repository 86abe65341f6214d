//! Per-document score accumulation with a score-ordered index.
//!
//! Every update appends a `(new score, doc)` entry to the order index and leaves
//! the superseded entry in place. Removing and reinserting on each increment
//! costs more than it saves at the corpus sizes involved; selection skips stale
//! entries instead (see [`ScoreAccumulator::is_current`]).

use crate::types::{DocumentId, Score};
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};

use super::span::SpanTracker;

#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    scores: AHashMap<DocumentId, Score>,
    order: BTreeMap<Score, BTreeSet<DocumentId>>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `doc`'s score and index the new total. Returns the new score.
    pub fn add(&mut self, doc: DocumentId, delta: Score) -> Score {
        let score = self.scores.entry(doc).or_insert(0);
        *score += delta;
        let new_score = *score;
        self.order.entry(new_score).or_default().insert(doc);
        new_score
    }

    pub fn score(&self, doc: DocumentId) -> Option<Score> {
        self.scores.get(&doc).copied()
    }

    /// Whether `score` is `doc`'s current score, i.e. an order-index entry
    /// `(score, doc)` is not stale.
    pub fn is_current(&self, doc: DocumentId, score: Score) -> bool {
        self.scores.get(&doc) == Some(&score)
    }

    /// Add `span size * per_position` to every document with coverage.
    pub fn apply_span_bonus(&mut self, spans: &SpanTracker, per_position: Score) {
        let mut bonuses: Vec<(DocumentId, Score)> = spans
            .spans()
            .map(|(doc, size)| (doc, size as Score * per_position))
            .collect();
        bonuses.sort_unstable();

        for (doc, bonus) in bonuses {
            debug_assert!(
                self.scores.contains_key(&doc),
                "document {doc} has span coverage but no score"
            );
            if bonus != 0 {
                self.add(doc, bonus);
            }
        }
    }

    /// Score buckets from highest to lowest. Buckets may hold stale entries.
    pub fn buckets_descending(&self) -> impl Iterator<Item = (Score, &BTreeSet<DocumentId>)> {
        self.order.iter().rev().map(|(&score, docs)| (score, docs))
    }

    /// Number of documents with a score.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Order-index entries that no longer reflect a document's score.
    pub fn stale_entries(&self) -> usize {
        let total: usize = self.order.values().map(BTreeSet::len).sum();
        total - self.scores.len()
    }

    /// Current scores, keyed by document.
    pub fn scores(&self) -> impl Iterator<Item = (DocumentId, Score)> + '_ {
        self.scores.iter().map(|(&doc, &score)| (doc, score))
    }
}
