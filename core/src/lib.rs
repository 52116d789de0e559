pub mod corpus;
pub mod document;
pub mod error;
pub mod frequency;
pub mod highlight;
pub mod index;
pub mod query;
pub mod tokenizer;

pub use corpus::{open_corpus, CorpusFormat, CorpusReader, InMemoryCorpus, JsonCorpus, ReutersCorpus};
pub use document::Document;
pub use error::{Result, SearchError};
pub use frequency::{CorpusFrequencies, TermFrequencyMap};
pub use highlight::Highlighter;
pub use index::{build_index, InvertedIndex, Posting, PostingsList};
pub use query::{matching_postings, search, Hit, Ranking, SearchEngine, SearchOptions, SearchResults};
