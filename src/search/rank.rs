//! Top-K selection over the score-ordered index.

use crate::types::DocumentId;
use ahash::AHashSet;
use std::cmp::Reverse;
use std::collections::HashSet;

use super::accumulator::ScoreAccumulator;
use super::span::SpanTracker;

/// Walks score buckets from highest to lowest and picks unique documents.
#[derive(Debug)]
pub struct RankSelector<'a> {
    accumulator: &'a ScoreAccumulator,
    spans: &'a SpanTracker,
    eligible: Option<&'a HashSet<DocumentId>>,
}

impl<'a> RankSelector<'a> {
    pub const fn new(accumulator: &'a ScoreAccumulator, spans: &'a SpanTracker) -> Self {
        Self {
            accumulator,
            spans,
            eligible: None,
        }
    }

    /// Only select documents from `eligible`.
    pub const fn with_eligible(mut self, eligible: Option<&'a HashSet<DocumentId>>) -> Self {
        self.eligible = eligible;
        self
    }

    /// Select up to `desired` documents without re-ranking.
    pub fn select(&self, desired: usize) -> Vec<DocumentId> {
        self.select_with(desired, |bucket| bucket)
    }

    /// Select up to `desired` documents.
    ///
    /// Within a score bucket candidates are ordered by span size (descending),
    /// then document id (ascending). `reorder` receives each non-empty bucket
    /// after truncation and may permute it.
    pub fn select_with(
        &self,
        desired: usize,
        mut reorder: impl FnMut(Vec<DocumentId>) -> Vec<DocumentId>,
    ) -> Vec<DocumentId> {
        let mut selected = Vec::with_capacity(desired);
        let mut picked: AHashSet<DocumentId> = AHashSet::with_capacity(desired);

        for (score, docs) in self.accumulator.buckets_descending() {
            if selected.len() >= desired {
                break;
            }
            if score == 0 {
                continue;
            }

            let mut bucket: Vec<DocumentId> = docs
                .iter()
                .copied()
                .filter(|&doc| self.accumulator.is_current(doc, score))
                .filter(|doc| self.eligible.is_none_or(|eligible| eligible.contains(doc)))
                .filter(|doc| !picked.contains(doc))
                .collect();
            if bucket.is_empty() {
                continue;
            }

            bucket.sort_by_key(|&doc| (Reverse(self.spans.span_size(doc)), doc));
            bucket.truncate(desired - selected.len());
            picked.extend(bucket.iter().copied());

            tracing::trace!("Selected bucket score={} docs={:?}", score, bucket);
            selected.extend(reorder(bucket));
        }

        selected
    }
}
