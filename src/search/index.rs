//! In-memory implementation of the read-only lookup tables.
//!
//! Builds word and phrase postings from document text with the same tokenizer
//! the query side uses. Score tables and phrase dictionaries are supplied by
//! the caller; nothing here derives weights from corpus statistics.

use crate::lexicon::{Corpus, Lexicon, NGramDictionary, RelatedWords, WordIndex};
use crate::types::{DocumentId, Score};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use super::tokenize::{WordNormalizer, singular_form, singular_phrase, tokenize};

/// Set of recognized phrases of one width.
#[derive(Debug, Clone, Default)]
pub struct PhraseSet {
    phrases: HashSet<String>,
}

impl PhraseSet {
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl NGramDictionary for PhraseSet {
    fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }
}

impl FromIterator<String> for PhraseSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            phrases: iter.into_iter().collect(),
        }
    }
}

/// Word/phrase postings, score table, related words and document text.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    /// Map from term (word or phrase) to ascending document ids
    postings: HashMap<String, Vec<DocumentId>>,
    scores: HashMap<String, Score>,
    related: HashMap<String, Vec<String>>,
    two_grams: Arc<PhraseSet>,
    three_grams: Arc<PhraseSet>,
    documents: Vec<String>,
}

impl MemoryIndex {
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::default()
    }

    /// Bundle this index into a [`Lexicon`] serving every lookup table.
    pub fn lexicon(self: &Arc<Self>) -> Lexicon {
        Lexicon::new(self.clone())
            .with_two_grams(self.two_grams.clone())
            .with_three_grams(self.three_grams.clone())
            .with_related(self.clone())
    }

    /// Get the number of distinct terms (words and phrases) with postings
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Get the number of documents in the index
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl WordIndex for MemoryIndex {
    fn lookup(&self, term: &str) -> &[DocumentId] {
        self.postings.get(term).map_or(&[], Vec::as_slice)
    }

    fn score(&self, term: &str) -> Option<Score> {
        self.scores.get(term).copied()
    }
}

impl RelatedWords for MemoryIndex {
    fn related(&self, word: &str) -> &[String] {
        self.related.get(word).map_or(&[], Vec::as_slice)
    }
}

impl Corpus for MemoryIndex {
    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn text(&self, doc: DocumentId) -> Option<&str> {
        self.documents.get(doc as usize).map(String::as_str)
    }
}

/// Builder for accumulating documents and tables before postings are computed.
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    documents: Vec<String>,
    scores: HashMap<String, Score>,
    phrases: Vec<String>,
    related: HashMap<String, Vec<String>>,
}

impl MemoryIndexBuilder {
    /// Append a document. Its id is its insertion position.
    pub fn document(mut self, text: impl Into<String>) -> Self {
        self.documents.push(text.into());
        self
    }

    /// Set the base score of a word or phrase.
    pub fn score(mut self, term: impl Into<String>, score: Score) -> Self {
        self.scores.insert(term.into(), score);
        self
    }

    /// Register a fixed phrase of two or three words.
    pub fn phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrases.push(phrase.into());
        self
    }

    /// Set the related words of `word`, in preference order.
    pub fn related(mut self, word: impl Into<String>, related: &[&str]) -> Self {
        self.related.insert(
            word.into(),
            related.iter().map(|r| (*r).to_string()).collect(),
        );
        self
    }

    /// Compute postings for every word form and registered phrase.
    ///
    /// Each document word is indexed under its surface, singular and stemmed
    /// forms, matching the fallback order used when resolving query words.
    pub fn build(self) -> MemoryIndex {
        let start = std::time::Instant::now();
        let normalizer = WordNormalizer::default();

        let mut two_grams = HashSet::new();
        let mut three_grams = HashSet::new();
        for phrase in self.phrases {
            let normalized = tokenize(&phrase).join(" ");
            match normalized.split(' ').count() {
                2 => {
                    two_grams.insert(normalized);
                }
                3 => {
                    three_grams.insert(normalized);
                }
                n => tracing::warn!("Ignoring phrase '{}' with {} words", phrase, n),
            }
        }

        let mut postings: HashMap<String, BTreeSet<DocumentId>> = HashMap::new();
        for (doc, text) in self.documents.iter().enumerate() {
            let doc = doc as DocumentId;
            let words = tokenize(text);

            for word in &words {
                let singular = singular_form(word);
                let forms = [
                    word.clone(),
                    singular.to_string(),
                    normalizer.normalize(&singular).into_owned(),
                    normalizer.normalize(word).into_owned(),
                ];
                for form in forms {
                    postings.entry(form).or_default().insert(doc);
                }
            }

            for (width, dictionary) in [(2, &two_grams), (3, &three_grams)] {
                for window in words.windows(width) {
                    let phrase = window.join(" ");
                    let recognized = if dictionary.contains(&phrase) {
                        Some(phrase)
                    } else {
                        singular_phrase(&phrase).filter(|alt| dictionary.contains(alt))
                    };
                    if let Some(phrase) = recognized {
                        postings.entry(phrase).or_default().insert(doc);
                    }
                }
            }
        }

        let postings: HashMap<String, Vec<DocumentId>> = postings
            .into_iter()
            .map(|(term, docs)| (term, docs.into_iter().collect()))
            .collect();

        let index = MemoryIndex {
            postings,
            scores: self.scores,
            related: self.related,
            two_grams: Arc::new(two_grams.into_iter().collect()),
            three_grams: Arc::new(three_grams.into_iter().collect()),
            documents: self.documents,
        };

        tracing::info!(
            "Built in-memory index: {} terms, {} documents, {} phrases in {:?}",
            index.term_count(),
            index.document_count(),
            index.two_grams.len() + index.three_grams.len(),
            start.elapsed()
        );

        index
    }
}
