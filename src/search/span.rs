//! Per-document coverage of query positions.

use crate::types::DocumentId;
use ahash::AHashMap;
use std::collections::BTreeSet;

use super::term::TokenKind;

/// Records which query positions each document has matched.
///
/// Singletons, 2-grams and 3-grams share one coverage unit per position, so a
/// word covered by a phrase is not counted again by its own singleton match.
#[derive(Debug, Default)]
pub struct SpanTracker {
    covered: AHashMap<DocumentId, BTreeSet<usize>>,
}

impl SpanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a match of `kind` at `position` would duplicate coverage in `doc`.
    ///
    /// - singleton: its position is covered
    /// - 2-gram: both of its positions are covered
    /// - 3-gram: never blocked
    pub fn is_covered(&self, doc: DocumentId, position: usize, kind: TokenKind) -> bool {
        let Some(positions) = self.covered.get(&doc) else {
            return false;
        };

        match kind {
            TokenKind::Singleton => positions.contains(&position),
            TokenKind::TwoGram => {
                positions.contains(&position) && positions.contains(&(position + 1))
            }
            TokenKind::ThreeGram => false,
        }
    }

    /// Mark every position spanned by a match of `kind` at `position`.
    pub fn mark_covered(&mut self, doc: DocumentId, position: usize, kind: TokenKind) {
        self.covered
            .entry(doc)
            .or_default()
            .extend(position..position + kind.width());
    }

    /// Number of distinct positions covered in `doc`.
    pub fn span_size(&self, doc: DocumentId) -> usize {
        self.covered.get(&doc).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, doc: DocumentId) -> bool {
        self.covered.contains_key(&doc)
    }

    /// Largest span over all documents; zero when nothing matched.
    pub fn largest_span(&self) -> usize {
        self.covered.values().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// `(document, span size)` for every document with coverage, in no particular order.
    pub fn spans(&self) -> impl Iterator<Item = (DocumentId, usize)> + '_ {
        self.covered
            .iter()
            .map(|(&doc, positions)| (doc, positions.len()))
    }

    pub fn len(&self) -> usize {
        self.covered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }
}
