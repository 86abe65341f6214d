//! Secondary re-ranking of documents that share a score.

use crate::lexicon::Reranker;
use crate::types::DocumentId;
use std::time::Instant;

/// One named re-ranking signal.
#[derive(Clone, Copy)]
pub(crate) struct RerankStage<'a> {
    pub(crate) name: &'static str,
    pub(crate) reranker: &'a dyn Reranker,
}

/// Apply `stages` in order to a tuple of same-score documents.
///
/// A stage that fails, runs past the deadline, or returns something other than
/// a permutation of its input is skipped and the previous order kept.
pub(crate) fn reorder_tuple(
    query: &str,
    tuple: Vec<DocumentId>,
    stages: &[RerankStage<'_>],
    deadline: Option<Instant>,
) -> Vec<DocumentId> {
    if tuple.len() < 2 {
        return tuple;
    }

    let tuple_size = tuple.len();
    stages.iter().fold(tuple, |current, stage| {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::debug!("Deadline passed, skipping {} re-ranking", stage.name);
            return current;
        }

        match stage.reranker.reorder(query, &current, tuple_size, deadline) {
            Ok(reordered) if is_permutation(&current, &reordered) => reordered,
            Ok(reordered) => {
                tracing::warn!(
                    "{} re-ranker returned {:?}, not a permutation of {:?}; keeping previous order",
                    stage.name,
                    reordered,
                    current
                );
                current
            }
            Err(e) => {
                tracing::warn!("{} re-ranking failed: {}", stage.name, e);
                current
            }
        }
    })
}

fn is_permutation(original: &[DocumentId], candidate: &[DocumentId]) -> bool {
    if original.len() != candidate.len() {
        return false;
    }
    let mut a = original.to_vec();
    let mut b = candidate.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
