//! Resolution of query tokens to scored document sets.
//!
//! A token is a singleton word or a 2/3-word phrase rooted at a query position.
//! Singletons fall back through their singular and stemmed forms; phrases are
//! recognized through the n-gram dictionaries and scored at least as high as
//! their parts combined.

use crate::config::SearchConfig;
use crate::lexicon::Lexicon;
use crate::types::{DocumentId, Score};

use super::tokenize::{WordNormalizer, singular_form, singular_phrase};

/// Width class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Singleton,
    TwoGram,
    ThreeGram,
}

impl TokenKind {
    /// Number of consecutive query positions the token spans.
    pub const fn width(self) -> usize {
        match self {
            Self::Singleton => 1,
            Self::TwoGram => 2,
            Self::ThreeGram => 3,
        }
    }
}

/// A token matched against the score table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The form found in the table. Replaces the surface form for all bookkeeping.
    pub form: String,
    /// Documents containing `form`.
    pub documents: &'a [DocumentId],
    pub score: Score,
}

/// Per-query view of the lexicon that turns tokens into [`Resolution`]s.
pub struct TermScorer<'a> {
    lexicon: &'a Lexicon,
    config: &'a SearchConfig,
    normalizer: WordNormalizer,
}

impl<'a> TermScorer<'a> {
    pub fn new(lexicon: &'a Lexicon, config: &'a SearchConfig) -> Self {
        Self {
            lexicon,
            config,
            normalizer: WordNormalizer::default(),
        }
    }

    /// Resolve a single query word: exact form, then singular, then stemmed.
    ///
    /// Returns `None` without touching the document index when no form has a
    /// table entry.
    pub fn resolve(&self, word: &str) -> Option<Resolution<'a>> {
        let singular = singular_form(word);
        let candidates = [
            Some(word.to_string()),
            (singular != word).then(|| singular.to_string()),
            Some(self.normalizer.normalize(&singular).into_owned()),
            Some(self.normalizer.normalize(word).into_owned()),
        ];

        let words = self.lexicon.words.as_ref();
        candidates.into_iter().flatten().find_map(|form| {
            let score = words.score(&form)?;
            Some(Resolution {
                documents: words.lookup(&form),
                form,
                score,
            })
        })
    }

    /// Resolve the phrase of `kind`'s width starting at `position`.
    ///
    /// The phrase must be recognized by the n-gram dictionary. Its score is the
    /// larger of its own table score and the sum of its component singleton
    /// scores plus the configured n-gram bonus.
    pub fn resolve_ngram(
        &self,
        kind: TokenKind,
        position: usize,
        words: &[String],
        singleton_scores: &[Score],
    ) -> Option<Resolution<'a>> {
        let width = kind.width();
        if width < 2 || position + width > words.len() {
            return None;
        }

        let phrase = words[position..position + width].join(" ");
        let dictionary = self.lexicon.ngrams(width);
        let form = if dictionary.contains(&phrase) {
            phrase
        } else {
            singular_phrase(&phrase).filter(|alt| dictionary.contains(alt))?
        };

        let component_sum: Score = singleton_scores[position..position + width].iter().sum();
        let own_score = self.lexicon.words.score(&form).unwrap_or(0);
        let score = (component_sum + self.config.ngram_bonus).max(own_score);

        Some(Resolution {
            documents: self.lexicon.words.lookup(&form),
            form,
            score,
        })
    }

    /// Related words of a token, looked up by resolved form, then by surface form.
    pub fn related_words(&self, form: &str, surface: &str) -> &'a [String] {
        let related = self.lexicon.related.as_ref();
        match related.related(form) {
            [] if form != surface => related.related(surface),
            found => found,
        }
    }

    /// Documents containing a related word.
    pub fn related_documents(&self, related_word: &str) -> &'a [DocumentId] {
        self.lexicon.words.lookup(related_word)
    }

    /// Score a related word adds to each of its documents.
    ///
    /// Discounts the token's own contribution when it scored; otherwise falls
    /// back to the related word's own table score. `None` when neither exists.
    pub fn related_contribution(&self, own_contribution: Score, related_word: &str) -> Option<Score> {
        let base = if own_contribution != 0 {
            own_contribution
        } else {
            self.lexicon.words.score(related_word)?
        };
        Some(discount(base, self.config.related_word_factor))
    }
}

impl std::fmt::Debug for TermScorer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermScorer").finish_non_exhaustive()
    }
}

/// `ceil(score * factor)`.
fn discount(score: Score, factor: f64) -> Score {
    ((score as f64) * factor).ceil() as Score
}
