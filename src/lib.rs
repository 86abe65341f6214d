pub mod config;
pub mod error;
pub mod lexicon;
pub mod search;
pub mod tracing;
pub mod types;

pub use config::{LogConfig, LogFormat, SearchConfig};
pub use error::{ConfigError, LookupError};
pub use lexicon::{AuthorLookup, Corpus, Lexicon, NGramDictionary, RelatedWords, Reranker, WordIndex};
pub use search::{AuthorQuery, AuthorRelation, MemoryIndex, SearchEngine};
pub use types::{DocumentId, RankedResult, Score, SearchMode, SearchRequest};
