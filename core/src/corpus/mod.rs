//! Corpus Reader boundary.
//!
//! The index and the query engine only see a [`CorpusReader`]: a restartable enumeration of
//! documents plus random access by identifier. File-backed readers re-read their source on every
//! call; wrap them in [`InMemoryCorpus::load`] to serve fetches from memory.

mod json;
mod memory;
mod reuters;

pub use json::JsonCorpus;
pub use memory::InMemoryCorpus;
pub use reuters::ReutersCorpus;

use crate::document::Document;
use crate::error::{Result, SearchError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

pub trait CorpusReader: Send + Sync {
    /// Every usable document, once. Each call starts a fresh pass.
    fn documents(&self) -> Result<Box<dyn Iterator<Item = Document> + '_>>;

    /// Look up one document. Misses are [`SearchError::DocumentNotFound`].
    fn fetch_document(&self, id: &str) -> Result<Document>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpusFormat {
    /// Reuters when the path is an `.sgm` file or a directory holding one, JSON otherwise.
    #[default]
    Auto,
    Json,
    Reuters,
}

impl FromStr for CorpusFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(CorpusFormat::Auto),
            "json" | "jsonl" => Ok(CorpusFormat::Json),
            "reuters" | "sgml" | "sgm" => Ok(CorpusFormat::Reuters),
            other => Err(format!("unknown corpus format `{other}` (expected auto, jsonl or reuters)")),
        }
    }
}

impl fmt::Display for CorpusFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorpusFormat::Auto => "auto",
            CorpusFormat::Json => "jsonl",
            CorpusFormat::Reuters => "reuters",
        };
        f.write_str(name)
    }
}

/// Open the corpus at `path` with the reader matching `format`.
pub fn open_corpus(path: impl AsRef<Path>, format: CorpusFormat) -> Result<Box<dyn CorpusReader>> {
    let path = path.as_ref();
    let format = match format {
        CorpusFormat::Auto => detect_format(path)?,
        explicit => explicit,
    };
    tracing::debug!(path = %path.display(), %format, "opening corpus");
    Ok(match format {
        CorpusFormat::Reuters => Box::new(ReutersCorpus::open(path)?),
        _ => Box::new(JsonCorpus::open(path)?),
    })
}

fn detect_format(path: &Path) -> Result<CorpusFormat> {
    let files = collect_files(path, &["sgm", "json", "jsonl"])?;
    let reuters = files.iter().any(|p| has_extension(p, &["sgm"]));
    Ok(if reuters { CorpusFormat::Reuters } else { CorpusFormat::Json })
}

/// The file itself, or every file under the directory with one of `extensions`, sorted.
pub(crate) fn collect_files(path: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(SearchError::corpus_read(path, "no such file or directory"));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| SearchError::corpus_read(path, e))?;
        let p = entry.path();
        if p.is_file() && has_extension(p, extensions) {
            files.push(p.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_format_names() {
        assert_eq!("JSONL".parse::<CorpusFormat>(), Ok(CorpusFormat::Json));
        assert_eq!("sgml".parse::<CorpusFormat>(), Ok(CorpusFormat::Reuters));
        assert!("xml".parse::<CorpusFormat>().is_err());
        assert_eq!(CorpusFormat::Reuters.to_string(), "reuters");
    }

    #[test]
    fn detects_reuters_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("reut2-000.sgm"), "<REUTERS NEWID=\"1\"><BODY>grain</BODY></REUTERS>").unwrap();
        let corpus = open_corpus(dir.path(), CorpusFormat::Auto).unwrap();
        assert_eq!(corpus.fetch_document("1").unwrap().body, "grain");
    }

    #[test]
    fn missing_path_is_a_read_failure() {
        let dir = tempdir().unwrap();
        let err = open_corpus(dir.path().join("nope"), CorpusFormat::Auto).err().unwrap();
        assert!(matches!(err, SearchError::CorpusRead { .. }));
    }
}
