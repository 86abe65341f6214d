//! Intersection search and ranking over theorem statements.
//!
//! Query words are resolved to scored document sets (singletons, 2-grams and
//! 3-grams), accumulated per document with span tracking, and ranked by score,
//! span and document id. Sparse coverage falls back to literal text matching.

mod accumulator;
mod author;
mod engine;
mod index;
mod literal;
mod rank;
mod rerank;
mod span;
mod term;
mod tokenize;

pub use accumulator::ScoreAccumulator;
pub use author::{AuthorName, AuthorQuery, AuthorRelation, parse_author_query};
pub use engine::SearchEngine;
pub use index::{MemoryIndex, MemoryIndexBuilder, PhraseSet};
pub use literal::{LiteralSearch, span_below_threshold};
pub use rank::RankSelector;
pub use span::SpanTracker;
pub use term::{Resolution, TermScorer, TokenKind};
pub use tokenize::{WordNormalizer, normalized_text, singular_form, tokenize};
