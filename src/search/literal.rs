//! Literal text matching, the terminal fallback when intersection coverage is too sparse.

use crate::lexicon::Corpus;
use crate::types::DocumentId;
use rapidfuzz::distance::jaro_winkler;
use std::collections::HashSet;

use super::tokenize::{normalized_text, tokenize};

/// Whether the best document's span is too small to trust intersection ranking.
///
/// Sparse when nothing matched at all, or when the best document covers less
/// than `min_fraction` of the query positions.
pub fn span_below_threshold(largest_span: usize, query_len: usize, min_fraction: f64) -> bool {
    largest_span == 0 || (largest_span as f64) < min_fraction * query_len as f64
}

/// Verbatim and near-verbatim search over document text.
pub struct LiteralSearch<'a> {
    corpus: &'a dyn Corpus,
    min_similarity: f64,
}

impl<'a> LiteralSearch<'a> {
    pub fn new(corpus: &'a dyn Corpus, min_similarity: f64) -> Self {
        Self {
            corpus,
            min_similarity,
        }
    }

    /// Up to `desired` documents containing `query`.
    ///
    /// Documents containing the normalized query as a whole-word substring come
    /// first, in document order. Then documents with a word window whose
    /// Jaro-Winkler similarity to the query reaches the threshold, most similar first.
    pub fn search(
        &self,
        query: &str,
        desired: usize,
        eligible: Option<&HashSet<DocumentId>>,
    ) -> Vec<DocumentId> {
        let needle = normalized_text(query);
        if needle.is_empty() || desired == 0 {
            return vec![];
        }
        let needle_words = needle.split(' ').count();
        let padded_needle = format!(" {needle} ");

        let mut exact = vec![];
        let mut near: Vec<(f64, DocumentId)> = vec![];

        for doc in 0..self.corpus.document_count() as DocumentId {
            if eligible.is_some_and(|eligible| !eligible.contains(&doc)) {
                continue;
            }
            let Some(text) = self.corpus.text(doc) else {
                continue;
            };

            let words = tokenize(text);
            let haystack = format!(" {} ", words.join(" "));
            if haystack.contains(&padded_needle) {
                exact.push(doc);
                if exact.len() >= desired {
                    break;
                }
                continue;
            }

            let similarity = best_window_similarity(&words, &needle, needle_words);
            if similarity >= self.min_similarity {
                near.push((similarity, doc));
            }
        }

        near.sort_by(|(a_sim, a_doc), (b_sim, b_doc)| {
            b_sim.total_cmp(a_sim).then(a_doc.cmp(b_doc))
        });

        exact
            .into_iter()
            .chain(near.into_iter().map(|(_, doc)| doc))
            .take(desired)
            .collect()
    }
}

/// Highest similarity between `needle` and any run of `width` consecutive words.
fn best_window_similarity(words: &[String], needle: &str, width: usize) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let width = width.min(words.len());
    words
        .windows(width)
        .map(|window| jaro_winkler::similarity(window.join(" ").chars(), needle.chars()))
        .fold(0.0, f64::max)
}
