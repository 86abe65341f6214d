//! Query execution: author filtering, intersection scoring, literal fallback
//! and re-ranking.

use crate::config::SearchConfig;
use crate::error::{ConfigError, LookupError};
use crate::lexicon::{AuthorLookup, Corpus, Lexicon, Reranker};
use crate::types::{DocumentId, RankedResult, Score, SearchMode, SearchRequest};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::accumulator::ScoreAccumulator;
use super::author::parse_author_query;
use super::literal::{LiteralSearch, span_below_threshold};
use super::rank::RankSelector;
use super::rerank::{RerankStage, reorder_tuple};
use super::span::SpanTracker;
use super::term::{Resolution, TermScorer, TokenKind};
use super::tokenize::tokenize;

/// Ranks documents against free-text queries.
///
/// Holds only read-only tables and collaborators, so a single engine can be
/// shared across threads and serve queries concurrently.
#[derive(Clone)]
pub struct SearchEngine {
    lexicon: Lexicon,
    config: SearchConfig,
    corpus: Option<Arc<dyn Corpus>>,
    authors: Option<Arc<dyn AuthorLookup>>,
    relational: Option<Arc<dyn Reranker>>,
    contextual: Option<Arc<dyn Reranker>>,
}

impl SearchEngine {
    /// Create an engine over `lexicon`. Fails if `config` holds invalid weights.
    pub fn new(lexicon: Lexicon, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            lexicon,
            config,
            corpus: None,
            authors: None,
            relational: None,
            contextual: None,
        })
    }

    /// Document text for the literal fallback. Without it the fallback finds nothing.
    pub fn with_corpus(mut self, corpus: Arc<dyn Corpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_author_lookup(mut self, authors: Arc<dyn AuthorLookup>) -> Self {
        self.authors = Some(authors);
        self
    }

    pub fn with_relational_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.relational = Some(reranker);
        self
    }

    pub fn with_context_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.contextual = Some(reranker);
        self
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank documents for `query`, returning at most `desired` of them.
    pub fn search(
        &self,
        query: &str,
        eligible: Option<&HashSet<DocumentId>>,
        desired: usize,
        use_context_rerank: bool,
        use_relational_rerank: bool,
    ) -> RankedResult {
        let mut request = SearchRequest::new(query, desired)
            .with_context_rerank(use_context_rerank)
            .with_relational_rerank(use_relational_rerank);
        request.eligible = eligible.cloned();
        self.execute(&request)
    }

    /// Search raw user input, honoring a leading result count ("5 compact operator").
    pub fn search_input(&self, input: &str) -> RankedResult {
        self.execute(&SearchRequest::parse(
            input,
            self.config.default_result_count,
        ))
    }

    /// Run a search request. Never fails: collaborator errors degrade to the
    /// next safest mode and a query with no matches yields an empty result.
    pub fn execute(&self, request: &SearchRequest) -> RankedResult {
        let start = Instant::now();

        let (query, author_set) = self.apply_author_filter(&request.query, request.deadline);
        let author_filtered = author_set.is_some();
        let eligible: Option<HashSet<DocumentId>> = match (request.eligible.as_ref(), author_set) {
            (Some(given), Some(authors)) => Some(given.intersection(&authors).copied().collect()),
            (Some(given), None) => Some(given.clone()),
            (None, authors) => authors,
        };

        let words = tokenize(&query);
        if words.is_empty() {
            tracing::debug!("Blank query, nothing to search");
            return RankedResult {
                author_filtered,
                ..RankedResult::default()
            };
        }

        let mut state =
            SearchState::new(&self.lexicon, &self.config, &words, eligible.as_ref());
        state.accumulate();

        let largest_span = state.spans.largest_span();
        let mut result = if span_below_threshold(
            largest_span,
            words.len(),
            self.config.min_span_fraction,
        ) {
            tracing::info!(
                "Largest span {} of {} query words is too sparse, using literal search",
                largest_span,
                words.len()
            );
            let documents = self.corpus.as_deref().map_or_else(Vec::new, |corpus| {
                LiteralSearch::new(corpus, self.config.literal_similarity).search(
                    &query,
                    request.desired_count,
                    eligible.as_ref(),
                )
            });
            state.finish(documents, SearchMode::Literal)
        } else {
            state
                .accumulator
                .apply_span_bonus(&state.spans, self.config.span_bonus_per_position);

            let stages = self.rerank_stages(request, largest_span);
            let selector =
                RankSelector::new(&state.accumulator, &state.spans).with_eligible(eligible.as_ref());
            let documents = if stages.is_empty() {
                selector.select(request.desired_count)
            } else {
                selector.select_with(request.desired_count, |bucket| {
                    reorder_tuple(&query, bucket, &stages, request.deadline)
                })
            };
            state.finish(documents, SearchMode::Intersection)
        };
        result.author_filtered = author_filtered;

        tracing::debug!(
            "Search '{}' ({:?}) returned {} documents in {:?}",
            query,
            result.mode,
            result.len(),
            start.elapsed()
        );
        result
    }

    /// Strip an author clause from `query` and look up the authors' documents.
    ///
    /// Returns the remaining query and, when the lookup succeeded, the documents
    /// to restrict ranking to. Any failure leaves the search unfiltered.
    fn apply_author_filter(
        &self,
        query: &str,
        deadline: Option<Instant>,
    ) -> (String, Option<HashSet<DocumentId>>) {
        let Some((stripped, author_query)) = parse_author_query(query) else {
            return (query.to_string(), None);
        };

        let Some(authors) = &self.authors else {
            tracing::warn!(
                "Query names authors '{}' but no author lookup is configured; searching unfiltered",
                author_query.expression
            );
            return (stripped, None);
        };

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!(
                "Deadline passed before author lookup for '{}'; searching unfiltered",
                author_query.expression
            );
            return (stripped, None);
        }

        match authors.search(&author_query, deadline) {
            Ok(documents) => {
                tracing::info!(
                    "Author filter '{}' ({:?}) matched {} documents",
                    author_query.expression,
                    author_query.relation,
                    documents.len()
                );
                (stripped, Some(documents))
            }
            Err(LookupError::DeadlineExceeded) => {
                tracing::warn!(
                    "Author lookup for '{}' timed out; searching unfiltered",
                    author_query.expression
                );
                (stripped, None)
            }
            Err(e) => {
                tracing::error!(
                    "Author lookup for '{}' failed: {}; searching unfiltered",
                    author_query.expression,
                    e
                );
                (stripped, None)
            }
        }
    }

    /// Re-ranking stages for this request: relational first, then context.
    fn rerank_stages(&self, request: &SearchRequest, largest_span: usize) -> Vec<RerankStage<'_>> {
        if largest_span <= 1 {
            return vec![];
        }

        let mut stages = Vec::with_capacity(2);
        if request.use_relational_rerank
            && let Some(reranker) = &self.relational
        {
            stages.push(RerankStage {
                name: "relational",
                reranker: reranker.as_ref(),
            });
        }
        if request.use_context_rerank
            && let Some(reranker) = &self.contextual
        {
            stages.push(RerankStage {
                name: "context",
                reranker: reranker.as_ref(),
            });
        }
        stages
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("corpus", &self.corpus.is_some())
            .field("authors", &self.authors.is_some())
            .field("relational", &self.relational.is_some())
            .field("contextual", &self.contextual.is_some())
            .finish_non_exhaustive()
    }
}

/// Mutable bookkeeping for one query. Never shared between queries.
///
/// Documents outside `eligible` are never scored or span-marked, so the
/// largest span and the fallback decision only reflect rankable documents.
struct SearchState<'a> {
    scorer: TermScorer<'a>,
    words: &'a [String],
    eligible: Option<&'a HashSet<DocumentId>>,
    singletons: Vec<Option<Resolution<'a>>>,
    singleton_scores: Vec<Score>,
    total_terms_resolved: usize,
    accumulator: ScoreAccumulator,
    spans: SpanTracker,
    token_scores: BTreeMap<String, Score>,
    search_terms: BTreeSet<String>,
}

impl<'a> SearchState<'a> {
    fn new(
        lexicon: &'a Lexicon,
        config: &'a SearchConfig,
        words: &'a [String],
        eligible: Option<&'a HashSet<DocumentId>>,
    ) -> Self {
        let scorer = TermScorer::new(lexicon, config);
        let singletons: Vec<Option<Resolution<'a>>> =
            words.iter().map(|word| scorer.resolve(word)).collect();
        let singleton_scores = singletons
            .iter()
            .map(|resolution| resolution.as_ref().map_or(0, |r| r.score))
            .collect();
        // a table hit counts even when its score is zero
        let total_terms_resolved = singletons.iter().filter(|r| r.is_some()).count();

        Self {
            scorer,
            words,
            eligible,
            singletons,
            singleton_scores,
            total_terms_resolved,
            accumulator: ScoreAccumulator::new(),
            spans: SpanTracker::new(),
            token_scores: BTreeMap::new(),
            search_terms: BTreeSet::new(),
        }
    }

    /// Score every query position: 3-gram, then 2-gram, then the word itself.
    fn accumulate(&mut self) {
        for position in 0..self.words.len() {
            for kind in [TokenKind::ThreeGram, TokenKind::TwoGram] {
                let resolution = self.scorer.resolve_ngram(
                    kind,
                    position,
                    self.words,
                    &self.singleton_scores,
                );
                if let Some(resolution) = resolution {
                    let surface = self.words[position..position + kind.width()].join(" ");
                    self.add_term(kind, position, &surface, Some(resolution));
                }
            }

            let resolution = self.singletons[position].take();
            let surface = self.words[position].clone();
            self.add_term(TokenKind::Singleton, position, &surface, resolution);
        }
    }

    /// Credit a token's documents and its related words' documents.
    fn add_term(
        &mut self,
        kind: TokenKind,
        position: usize,
        surface: &str,
        resolution: Option<Resolution<'a>>,
    ) {
        let (form, own) = match resolution {
            Some(resolution) if resolution.score != 0 => {
                for &doc in resolution.documents {
                    if self.is_eligible(doc) && !self.spans.is_covered(doc, position, kind) {
                        self.accumulator.add(doc, resolution.score);
                        self.spans.mark_covered(doc, position, kind);
                    }
                }
                self.record_term(kind, &resolution.form, surface, resolution.score);
                (resolution.form, resolution.score)
            }
            Some(resolution) => (resolution.form, 0),
            None => (surface.to_string(), 0),
        };

        for related in self.scorer.related_words(&form, surface) {
            let contribution = match self.scorer.related_contribution(own, related) {
                Some(contribution) if contribution != 0 => contribution,
                _ => continue,
            };

            let documents = self.scorer.related_documents(related);
            if documents.is_empty() {
                continue;
            }
            for &doc in documents {
                if !self.is_eligible(doc) {
                    continue;
                }
                self.accumulator.add(doc, contribution);
                if !self.spans.is_covered(doc, position, kind) {
                    self.spans.mark_covered(doc, position, kind);
                }
            }
            tracing::trace!(
                "Related word '{}' of '{}' added {} to {} documents",
                related,
                form,
                contribution,
                documents.len()
            );
            self.token_scores.insert(related.clone(), contribution);
            self.search_terms.insert(related.clone());
        }
    }

    fn is_eligible(&self, doc: DocumentId) -> bool {
        self.eligible.is_none_or(|eligible| eligible.contains(&doc))
    }

    fn record_term(&mut self, kind: TokenKind, form: &str, surface: &str, score: Score) {
        self.token_scores.insert(form.to_string(), score);
        match kind {
            TokenKind::Singleton => {
                self.search_terms.insert(form.to_string());
                if form != surface {
                    self.search_terms.insert(surface.to_string());
                }
            }
            TokenKind::TwoGram | TokenKind::ThreeGram => {
                self.search_terms
                    .extend(form.split(' ').map(ToString::to_string));
            }
        }
    }

    fn finish(self, documents: Vec<DocumentId>, mode: SearchMode) -> RankedResult {
        RankedResult {
            documents,
            mode,
            token_scores: self.token_scores,
            scores: self.accumulator.scores().collect(),
            spans: self.spans.spans().collect(),
            largest_span: self.spans.largest_span(),
            total_terms_resolved: self.total_terms_resolved,
            search_terms: self.search_terms,
            author_filtered: false,
        }
    }
}
