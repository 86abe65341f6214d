//! Read-only lookup interfaces consumed by the search engine.
//!
//! Index construction and persistence live outside this crate. Whatever builds
//! the tables hands them over behind these traits once at start-up; they are
//! never mutated during a search, so one [`Lexicon`] can serve any number of
//! concurrent queries.

use crate::error::LookupError;
use crate::search::AuthorQuery;
use crate::types::{DocumentId, Score};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Word and phrase → documents, plus the static word-score table.
pub trait WordIndex: Send + Sync {
    /// Documents containing `term`, ascending and without duplicates.
    /// Empty when the term is unknown.
    fn lookup(&self, term: &str) -> &[DocumentId];

    /// Base score of `term`, or `None` when it has no table entry.
    fn score(&self, term: &str) -> Option<Score>;
}

/// Membership test for recognized fixed phrases of one width.
pub trait NGramDictionary: Send + Sync {
    fn contains(&self, phrase: &str) -> bool;
}

/// Semantically related words for a term.
pub trait RelatedWords: Send + Sync {
    /// Related words in preference order. Empty when none are known.
    fn related(&self, word: &str) -> &[String];
}

/// Access to document text, used only by the literal fallback.
pub trait Corpus: Send + Sync {
    fn document_count(&self) -> usize;

    fn text(&self, doc: DocumentId) -> Option<&str>;
}

/// External author search (typically a database query).
pub trait AuthorLookup: Send + Sync {
    /// Documents written by the queried authors. Implementations should give
    /// up once `deadline` passes and report [`LookupError::DeadlineExceeded`].
    fn search(
        &self,
        query: &AuthorQuery,
        deadline: Option<Instant>,
    ) -> Result<HashSet<DocumentId>, LookupError>;
}

/// Secondary ordering signal applied to documents that share a score.
pub trait Reranker: Send + Sync {
    /// Return `tuple` reordered. The output must be a permutation of the input.
    fn reorder(
        &self,
        query: &str,
        tuple: &[DocumentId],
        tuple_size: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<DocumentId>, LookupError>;
}

/// Dictionary that recognizes no phrase. Used when no n-gram table is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPhrases;

impl NGramDictionary for NoPhrases {
    fn contains(&self, _phrase: &str) -> bool {
        false
    }
}

/// Related-word table with no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelatedWords;

impl RelatedWords for NoRelatedWords {
    fn related(&self, _word: &str) -> &[String] {
        &[]
    }
}

/// The full set of read-only tables a search runs against.
#[derive(Clone)]
pub struct Lexicon {
    pub words: Arc<dyn WordIndex>,
    pub two_grams: Arc<dyn NGramDictionary>,
    pub three_grams: Arc<dyn NGramDictionary>,
    pub related: Arc<dyn RelatedWords>,
}

impl Lexicon {
    /// A lexicon with only a word index: no phrases, no related words.
    pub fn new(words: Arc<dyn WordIndex>) -> Self {
        Self {
            words,
            two_grams: Arc::new(NoPhrases),
            three_grams: Arc::new(NoPhrases),
            related: Arc::new(NoRelatedWords),
        }
    }

    pub fn with_two_grams(mut self, two_grams: Arc<dyn NGramDictionary>) -> Self {
        self.two_grams = two_grams;
        self
    }

    pub fn with_three_grams(mut self, three_grams: Arc<dyn NGramDictionary>) -> Self {
        self.three_grams = three_grams;
        self
    }

    pub fn with_related(mut self, related: Arc<dyn RelatedWords>) -> Self {
        self.related = related;
        self
    }

    /// Phrase dictionary for an n-gram width (2 or 3).
    pub(crate) fn ngrams(&self, width: usize) -> &dyn NGramDictionary {
        if width >= 3 {
            self.three_grams.as_ref()
        } else {
            self.two_grams.as_ref()
        }
    }
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon").finish_non_exhaustive()
    }
}
