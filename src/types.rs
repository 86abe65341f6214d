use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Instant;

/// Index of a theorem in the loaded corpus. Stable for the lifetime of the index.
pub type DocumentId = u32;

/// Relevance score. Word-table scores and accumulated document scores share this type.
pub type Score = i64;

/// How the final document list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// The query was blank; nothing was searched.
    #[default]
    Blank,
    /// Ranked by accumulated intersection score.
    Intersection,
    /// Coverage was too sparse; documents come from literal text matching.
    Literal,
}

/// Outcome of one search. Always produced, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    /// Documents, best first. Never contains duplicates.
    pub documents: Vec<DocumentId>,
    pub mode: SearchMode,
    /// Score contributed by each resolved token (singleton or n-gram).
    pub token_scores: BTreeMap<String, Score>,
    /// Final score of every document that accumulated any.
    pub scores: BTreeMap<DocumentId, Score>,
    /// Number of distinct query positions each document covers.
    pub spans: BTreeMap<DocumentId, usize>,
    pub largest_span: usize,
    /// Query positions whose word resolved to a score-table entry.
    pub total_terms_resolved: usize,
    /// Words that contributed score, plus their surface forms when normalized.
    pub search_terms: BTreeSet<String>,
    /// Whether an author lookup restricted the candidate set.
    pub author_filtered: bool,
}

impl RankedResult {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// A fully specified search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Restrict ranking to these documents, e.g. from an external author filter.
    pub eligible: Option<HashSet<DocumentId>>,
    pub desired_count: usize,
    pub use_context_rerank: bool,
    pub use_relational_rerank: bool,
    /// Collaborator calls are skipped once this instant has passed.
    pub deadline: Option<Instant>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, desired_count: usize) -> Self {
        Self {
            query: query.into(),
            eligible: None,
            desired_count,
            use_context_rerank: false,
            use_relational_rerank: false,
            deadline: None,
        }
    }

    /// Build a request from raw user input, honoring a leading result count
    /// such as `"5 compact operator"`.
    pub fn parse(input: &str, default_count: usize) -> Self {
        let (count, rest) = split_leading_count(input);
        Self::new(rest, count.unwrap_or(default_count))
    }

    pub fn with_eligible(mut self, eligible: HashSet<DocumentId>) -> Self {
        self.eligible = Some(eligible);
        self
    }

    pub const fn with_context_rerank(mut self, enabled: bool) -> Self {
        self.use_context_rerank = enabled;
        self
    }

    pub const fn with_relational_rerank(mut self, enabled: bool) -> Self {
        self.use_relational_rerank = enabled;
        self
    }

    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Split a leading positive integer off the query.
///
/// Returns the count (if the first token is a positive integer followed by more
/// text) and the remaining query.
pub fn split_leading_count(input: &str) -> (Option<usize>, &str) {
    let trimmed = input.trim_start();
    let Some((first, rest)) = trimmed.split_once(char::is_whitespace) else {
        return (None, input);
    };

    match first.parse::<usize>() {
        Ok(count) if count > 0 && !rest.trim().is_empty() => (Some(count), rest.trim_start()),
        _ => (None, input),
    }
}
