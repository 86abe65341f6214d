//! Shared test fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `recipe_index`: three short recipe documents with word scores and no phrases
//! - `theorem_index`: theorem statements with 2/3-gram phrases and related words
//!
//! Engines are assembled per test with [`engine`] so collaborators (author
//! lookup, rerankers) can be swapped in. Collaborator doubles record their calls
//! so tests can check whether the engine consulted them.

use rstest::fixture;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use theorem_search::{
    AuthorLookup, AuthorQuery, DocumentId, LogConfig, LookupError, MemoryIndex, Reranker,
    SearchConfig, SearchEngine,
};

/// `{0: "flour and salt combine", 1: "pour batter bowl", 2: "banana mixture"}`
#[fixture]
#[allow(dead_code)]
pub fn recipe_index() -> Arc<MemoryIndex> {
    theorem_search::tracing::init(&LogConfig::default());
    Arc::new(
        MemoryIndex::builder()
            .document("flour and salt combine")
            .document("pour batter bowl")
            .document("banana mixture")
            .score("flour", 5)
            .score("salt", 5)
            .score("combine", 3)
            .score("pour", 4)
            .score("batter", 6)
            .score("bowl", 2)
            .score("banana", 7)
            .score("mixture", 3)
            .build(),
    )
}

/// Theorem statements exercising phrases, plural phrases and related words.
#[fixture]
#[allow(dead_code)]
pub fn theorem_index() -> Arc<MemoryIndex> {
    theorem_search::tracing::init(&LogConfig::default());
    Arc::new(
        MemoryIndex::builder()
            .document("Every closed range of a bounded operator is a Banach space")
            .document("A compact operator on a Hilbert space has closed range")
            .document("The image of a compact operator is separable")
            .document("Every bounded linear map between Banach spaces is continuous")
            .document("The range and image of a linear map coincide")
            .document("Every Hilbert space is a Banach space")
            .document("The spectrum of a commutative ring is quasi-compact")
            .score("closed", 2)
            .score("range", 3)
            .score("compact", 4)
            .score("operator", 3)
            .score("hilbert", 6)
            .score("banach", 6)
            .score("space", 1)
            .score("linear", 2)
            .score("map", 2)
            .score("bounded", 3)
            .score("continuous", 3)
            .score("separable", 4)
            .score("image", 3)
            .phrase("closed range")
            .phrase("compact operator")
            .phrase("banach space")
            .phrase("hilbert space")
            .phrase("linear map")
            .phrase("bounded linear map")
            .related("range", &["image"])
            .build(),
    )
}

/// Engine over `index` with default weights, using the index as its corpus.
pub fn engine(index: &Arc<MemoryIndex>) -> SearchEngine {
    engine_with_config(index, SearchConfig::default())
}

#[allow(dead_code)]
pub fn engine_with_config(index: &Arc<MemoryIndex>, config: SearchConfig) -> SearchEngine {
    SearchEngine::new(index.lexicon(), config)
        .expect("Test config should be valid")
        .with_corpus(index.clone())
}

/// Author lookup returning a fixed outcome and recording every query it receives.
#[allow(dead_code)] // Used by a subset of integration test crates
pub struct ScriptedAuthors {
    outcome: Result<HashSet<DocumentId>, String>,
    pub queries: Mutex<Vec<AuthorQuery>>,
}

#[allow(dead_code)]
impl ScriptedAuthors {
    pub fn returning(documents: &[DocumentId]) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(documents.iter().copied().collect()),
            queries: Mutex::new(vec![]),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            queries: Mutex::new(vec![]),
        })
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().expect("Lock poisoned").len()
    }
}

impl AuthorLookup for ScriptedAuthors {
    fn search(
        &self,
        query: &AuthorQuery,
        _deadline: Option<Instant>,
    ) -> Result<HashSet<DocumentId>, LookupError> {
        self.queries
            .lock()
            .expect("Lock poisoned")
            .push(query.clone());
        self.outcome
            .clone()
            .map_err(LookupError::Unavailable)
    }
}

/// Reranker that reverses each tuple and counts its invocations.
#[allow(dead_code)]
#[derive(Default)]
pub struct ReversingReranker {
    pub calls: AtomicUsize,
    pub tuple_sizes: Mutex<Vec<usize>>,
}

#[allow(dead_code)]
impl ReversingReranker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Reranker for ReversingReranker {
    fn reorder(
        &self,
        _query: &str,
        tuple: &[DocumentId],
        tuple_size: usize,
        _deadline: Option<Instant>,
    ) -> Result<Vec<DocumentId>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tuple_sizes
            .lock()
            .expect("Lock poisoned")
            .push(tuple_size);
        Ok(tuple.iter().rev().copied().collect())
    }
}

/// Reranker whose backend is always down.
#[allow(dead_code)]
pub struct FailingReranker;

impl Reranker for FailingReranker {
    fn reorder(
        &self,
        _query: &str,
        _tuple: &[DocumentId],
        _tuple_size: usize,
        _deadline: Option<Instant>,
    ) -> Result<Vec<DocumentId>, LookupError> {
        Err(LookupError::Unavailable("context model offline".to_string()))
    }
}

/// Asserts that `documents` holds no repeated id.
#[allow(dead_code)]
pub fn assert_unique(documents: &[DocumentId]) {
    let unique: HashSet<&DocumentId> = documents.iter().collect();
    assert_eq!(
        unique.len(),
        documents.len(),
        "Duplicate documents in {:?}",
        documents
    );
}
