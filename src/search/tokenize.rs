//! Query tokenization and word-form normalization.
//!
//! The boundary rule here must match the one used when the word index was
//! built: a word is a maximal run of alphanumerics, optionally joined by single
//! inner connectors (`-`, `_`, `'`) so technical terms like `non-degenerate` or
//! `c_0` survive as one token.

use rust_stemmers::{Algorithm, Stemmer};
use std::borrow::Cow;

/// Characters that join two alphanumeric runs into a single word.
const CONNECTORS: &[char] = &['-', '_', '\''];

/// Suffixes whose plural adds `es` rather than `s`.
const ES_PLURAL_SUFFIXES: &[&str] = &["sses", "xes", "ches", "shes", "zzes"];

/// Words ending in `s` that are already singular.
const SINGULAR_S_SUFFIXES: &[&str] = &["ss", "us", "is"];

/// Words at or below this length are never singularized ("gas", "has").
const MIN_SINGULARIZE_LENGTH: usize = 3;

/// Splits text into lower-cased words.
///
/// Tokens never overlap; n-grams are formed downstream by reading ahead in the
/// returned list.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = vec![];

    // Start of the open word and end of its last alphanumeric char
    let mut word_start: Option<usize> = None;
    let mut word_end = 0;

    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if word_start.is_none() {
                word_start = Some(i);
            }
            word_end = i + c.len_utf8();
        } else if CONNECTORS.contains(&c) && word_start.is_some() && word_end == i {
            // A single connector right after an alphanumeric keeps the word open.
            // Whether it joins anything is decided by the next char.
        } else if let Some(start) = word_start.take() {
            tokens.push(text[start..word_end].to_lowercase());
        }
    }

    if let Some(start) = word_start {
        tokens.push(text[start..word_end].to_lowercase());
    }

    tokens
}

/// Lower-cased words of `text` joined by single spaces, for verbatim comparison.
pub fn normalized_text(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Rule-based singular form of an English noun. Returns the input unchanged
/// when no rule applies.
pub fn singular_form(word: &str) -> Cow<'_, str> {
    if word.len() <= MIN_SINGULARIZE_LENGTH {
        return Cow::Borrowed(word);
    }

    if let Some(stem) = word.strip_suffix("ies")
        && stem.len() > 1
    {
        return Cow::Owned(format!("{stem}y"));
    }

    if ES_PLURAL_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return Cow::Borrowed(&word[..word.len() - 2]);
    }

    if word.ends_with('s') && !SINGULAR_S_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return Cow::Borrowed(&word[..word.len() - 1]);
    }

    Cow::Borrowed(word)
}

/// Reduces words to their Snowball stem, the last resolution stage.
pub struct WordNormalizer {
    stemmer: Stemmer,
}

impl Default for WordNormalizer {
    fn default() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl WordNormalizer {
    pub fn normalize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        self.stemmer.stem(word)
    }
}

impl std::fmt::Debug for WordNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordNormalizer").finish_non_exhaustive()
    }
}

/// Alternative spelling of a phrase with its last word singularized, if that differs.
pub(crate) fn singular_phrase(phrase: &str) -> Option<String> {
    let (head, last) = phrase.rsplit_once(' ')?;
    match singular_form(last) {
        Cow::Borrowed(same) if same == last => None,
        singular => Some(format!("{head} {singular}")),
    }
}
