mod common;

use assert2::{check, let_assert};
use common::{assert_unique, engine, engine_with_config, recipe_index, theorem_index};
use rstest::rstest;
use std::collections::HashSet;
use std::sync::Arc;
use theorem_search::search::{ScoreAccumulator, SpanTracker, TokenKind};
use theorem_search::{DocumentId, MemoryIndex, SearchConfig, SearchMode, SearchRequest};

// --- Worked examples ---

/// Test: The document matching every scored recipe word ranks alone; zero-score
/// documents are never padded in.
#[rstest]
fn recipe_query_returns_only_scoring_document(recipe_index: Arc<MemoryIndex>) {
    let result = engine(&recipe_index).search("combine flour and salt", None, 2, false, false);

    check!(result.mode == SearchMode::Intersection);
    check!(result.documents == vec![0]);
    check!(result.spans.get(&0) == Some(&3));
    check!(result.largest_span == 3);
    check!(result.total_terms_resolved == 3);
    check!(result.token_scores.get("flour") == Some(&5));
    check!(result.token_scores.get("combine") == Some(&3));
    check!(!result.token_scores.contains_key("and"));
}

/// Test: A recognized 2-gram outscores its parts and suppresses their singleton
/// matches in the same documents.
#[rstest]
fn two_gram_covers_both_positions(theorem_index: Arc<MemoryIndex>) {
    let result = engine(&theorem_index).search("closed range", None, 10, false, false);

    check!(result.documents == vec![0, 1, 4, 2]);
    // max(2 + 3 + 1, no own score) plus a span bonus of 2 * 2
    check!(result.scores.get(&0) == Some(&10));
    check!(result.scores.get(&1) == Some(&10));
    check!(result.token_scores.get("closed range") == Some(&6));
    check!(result.search_terms.contains("closed"));
    check!(result.search_terms.contains("range"));
}

/// Test: A related word adds score to a document the primary term already
/// covers, without growing its span.
#[rstest]
fn related_word_adds_score_but_not_span(theorem_index: Arc<MemoryIndex>) {
    let result = engine(&theorem_index).search("closed range", None, 10, false, false);

    // doc 4 has "range" and its related word "image" at the same query position
    check!(result.spans.get(&4) == Some(&1));
    check!(result.scores.get(&4) == Some(&(3 + 3 + 2)));
    // doc 2 only has "image": ceil(3 * 0.8) plus its span bonus
    check!(result.spans.get(&2) == Some(&1));
    check!(result.scores.get(&2) == Some(&(3 + 2)));
    check!(result.token_scores.get("image") == Some(&3));
}

/// Test: A plural phrase resolves to its singular dictionary entry.
#[rstest]
fn plural_phrase_resolves_to_singular(theorem_index: Arc<MemoryIndex>) {
    let result = engine(&theorem_index).search("compact operators", None, 10, false, false);

    check!(result.documents == vec![1, 2, 0]);
    check!(result.token_scores.get("compact operator") == Some(&8));
    check!(result.search_terms.contains("operator"));
    check!(result.search_terms.contains("operators"));
}

/// Test: A 3-gram wins its documents; overlapping 2-grams only score elsewhere.
#[rstest]
fn three_gram_blocks_overlapping_two_gram(theorem_index: Arc<MemoryIndex>) {
    let result = engine(&theorem_index).search("bounded linear map", None, 10, false, false);

    check!(result.documents == vec![3, 4, 0]);
    check!(result.scores.get(&3) == Some(&(3 + 2 + 2 + 1 + 3 * 2)));
    check!(result.scores.get(&4) == Some(&(2 + 2 + 1 + 2 * 2)));
    check!(result.token_scores.get("bounded linear map") == Some(&8));
    check!(result.token_scores.get("linear map") == Some(&5));
}

/// Test: Documents sharing a score are ordered by span, then by id.
#[rstest]
fn ties_break_by_span_then_id(theorem_index: Arc<MemoryIndex>) {
    let result = engine(&theorem_index).search("banach space", None, 10, false, false);

    check!(result.documents == vec![0, 3, 5, 1]);
    check!(result.scores.get(&0) == result.scores.get(&5));
}

// --- Properties ---

/// Test: Repeated searches return identical results.
#[rstest]
#[case("closed range")]
#[case("compact operators on hilbert spaces")]
#[case("every bounded linear map")]
#[case("spectrum of a commutative ring")]
fn search_is_deterministic(theorem_index: Arc<MemoryIndex>, #[case] query: &str) {
    let engine = engine(&theorem_index);
    let first = engine.search(query, None, 10, false, false);
    for _ in 0..5 {
        check!(engine.search(query, None, 10, false, false) == first);
    }
}

/// Test: Results never repeat a document and honor the requested count.
#[rstest]
#[case("closed range", 1)]
#[case("closed range", 3)]
#[case("banach space", 2)]
#[case("compact operator banach space hilbert space", 4)]
#[case("bounded linear map", 10)]
fn results_unique_and_bounded(
    theorem_index: Arc<MemoryIndex>,
    #[case] query: &str,
    #[case] desired: usize,
) {
    let result = engine(&theorem_index).search(query, None, desired, false, false);

    assert_unique(&result.documents);
    check!(result.len() <= desired);
    let scoring = result.scores.values().filter(|&&score| score > 0).count();
    if result.mode == SearchMode::Intersection && scoring >= desired {
        check!(result.len() == desired);
    }
}

/// Test: More covered positions never lower a document's final score.
#[rstest]
#[case(0)]
#[case(2)]
#[case(5)]
fn span_bonus_is_monotonic(#[case] per_position: i64) {
    let mut previous = i64::MIN;
    for covered in 1..=4 {
        let mut accumulator = ScoreAccumulator::new();
        let mut spans = SpanTracker::new();
        accumulator.add(0, 10);
        for position in 0..covered {
            spans.mark_covered(0, position, TokenKind::Singleton);
        }
        accumulator.apply_span_bonus(&spans, per_position);

        let_assert!(Some(score) = accumulator.score(0));
        check!(score >= previous);
        previous = score;
    }
}

/// Test: The eligibility filter restricts which documents accumulate score.
#[rstest]
fn eligibility_filter_restricts_results(theorem_index: Arc<MemoryIndex>) {
    let eligible: HashSet<DocumentId> = [2, 4].into_iter().collect();
    let engine = engine(&theorem_index);
    let filtered = engine.search("closed range", Some(&eligible), 10, false, false);
    let unfiltered = engine.search("closed range", None, 10, false, false);

    check!(filtered.documents == vec![4, 2]);
    check!(filtered.scores.keys().copied().collect::<Vec<_>>() == vec![2, 4]);
    check!(filtered.scores.get(&4) == unfiltered.scores.get(&4));
    // docs 0 and 1 cover both words but are not eligible
    check!(unfiltered.largest_span == 2);
    check!(filtered.largest_span == 1);
    check!(!filtered.author_filtered);
}

/// Test: A blank query yields an empty result, not an error.
#[rstest]
#[case("")]
#[case("   ")]
#[case(" -- ")]
fn blank_query_is_empty(recipe_index: Arc<MemoryIndex>, #[case] query: &str) {
    let result = engine(&recipe_index).search(query, None, 10, false, false);
    check!(result.mode == SearchMode::Blank);
    check!(result.is_empty());
    check!(result.token_scores.is_empty());
}

/// Test: A leading number in raw input sets the result count.
#[rstest]
fn leading_count_in_input(theorem_index: Arc<MemoryIndex>) {
    let engine = engine(&theorem_index);
    check!(engine.search_input("1 closed range").documents == vec![0]);
    check!(engine.search_input("closed range").len() == 4);

    let request = SearchRequest::parse("2 closed range", 10);
    check!(engine.execute(&request).documents == vec![0, 1]);
}

/// Test: Many threads can share one engine.
#[rstest]
fn concurrent_searches_share_engine(theorem_index: Arc<MemoryIndex>) {
    let engine = engine(&theorem_index);
    let queries = [
        "closed range",
        "compact operators",
        "bounded linear map",
        "banach space",
        "galois cohomology",
    ];
    let expected: Vec<_> = queries
        .iter()
        .map(|query| engine.search(query, None, 10, false, false))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|offset| {
                let engine = &engine;
                scope.spawn(move || {
                    (0..queries.len())
                        .map(|i| {
                            let index = (i + offset) % queries.len();
                            (index, engine.search(queries[index], None, 10, false, false))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            let_assert!(Ok(results) = handle.join());
            for (index, result) in results {
                check!(result == expected[index]);
            }
        }
    });
}

/// Test: Weights loaded from a config file change scoring.
#[rstest]
fn config_file_weights_apply(recipe_index: Arc<MemoryIndex>) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "span_bonus_per_position = 0\n").expect("Failed to write config");

    let_assert!(Ok(config) = SearchConfig::from_path(&path));
    let result = engine_with_config(&recipe_index, config).search(
        "combine flour and salt",
        None,
        10,
        false,
        false,
    );
    check!(result.scores.get(&0) == Some(&13));
}
