use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a corpus, building an index or fetching documents.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("failed to read corpus at {}: {reason}", .path.display())]
    CorpusRead { path: PathBuf, reason: String },

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document {0} is in the index but missing from the corpus")]
    InconsistentIndex(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn corpus_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SearchError::CorpusRead { path: path.into(), reason: reason.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchError::DocumentNotFound(_))
    }
}
