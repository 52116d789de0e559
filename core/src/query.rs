use crate::corpus::{open_corpus, CorpusFormat, CorpusReader, InMemoryCorpus};
use crate::document::Document;
use crate::error::{Result, SearchError};
use crate::index::{build_index, rank_order, InvertedIndex, Posting};
use crate::tokenizer::tokenize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How a conjunctive result set is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranking {
    /// The first query term's postings order, restricted to documents holding every other term.
    #[default]
    FirstTerm,
    /// Sum of the matched terms' weights, descending.
    Combined,
}

impl FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first-term" | "first" => Ok(Ranking::FirstTerm),
            "combined" | "sum" => Ok(Ranking::Combined),
            other => Err(format!("unknown ranking `{other}` (expected first-term or combined)")),
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ranking::FirstTerm => "first-term",
            Ranking::Combined => "combined",
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub ranking: Ranking,
    /// Applied after ranking, before documents are fetched.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub document: Document,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Size of the whole conjunctive result set, before `limit`.
    pub total_hits: usize,
    pub hits: Vec<Hit>,
}

/// Distinct query terms in first-occurrence order.
fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query).filter(|t| seen.insert(t.clone())).collect()
}

/// Evaluate `query` against the index alone: identifiers of the documents holding every term,
/// ranked, with the score `ranking` assigns them.
pub fn matching_postings(index: &InvertedIndex, query: &str, ranking: Ranking) -> Vec<Posting> {
    let terms = query_terms(query);
    let mut lists = Vec::with_capacity(terms.len());
    for term in &terms {
        match index.postings(term) {
            Some(list) => lists.push(list),
            None => {
                tracing::debug!(%term, "query term not in index");
                return Vec::new();
            }
        }
    }
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };

    let matches = first.ranked().iter().filter(|p| rest.iter().all(|list| list.contains(&p.doc_id)));
    match ranking {
        Ranking::FirstTerm => matches.cloned().collect(),
        Ranking::Combined => {
            let mut scored: Vec<Posting> = matches
                .map(|p| Posting {
                    doc_id: p.doc_id.clone(),
                    weight: p.weight + rest.iter().filter_map(|list| list.weight(&p.doc_id)).sum::<f64>(),
                })
                .collect();
            scored.sort_by(rank_order);
            scored
        }
    }
}

/// Fetch each ranked document, skipping any the reader no longer has.
fn fetch_hits(ranked: Vec<Posting>, corpus: &dyn CorpusReader) -> Vec<Hit> {
    let mut hits = Vec::with_capacity(ranked.len());
    for posting in ranked {
        match corpus.fetch_document(&posting.doc_id) {
            Ok(document) => hits.push(Hit { document, score: posting.weight }),
            Err(cause) => {
                let err = SearchError::InconsistentIndex(posting.doc_id);
                tracing::warn!(error = %err, %cause, "skipping result");
            }
        }
    }
    hits
}

/// Conjunctive search ranked by the first query term.
pub fn search(query: &str, index: &InvertedIndex, corpus: &dyn CorpusReader) -> Vec<Document> {
    let ranked = matching_postings(index, query, Ranking::FirstTerm);
    fetch_hits(ranked, corpus).into_iter().map(|hit| hit.document).collect()
}

/// A built index together with the reader it was built from.
pub struct SearchEngine {
    index: InvertedIndex,
    corpus: Box<dyn CorpusReader>,
}

impl SearchEngine {
    /// Scan `corpus` once and index it.
    pub fn build(corpus: Box<dyn CorpusReader>) -> Result<Self> {
        let index = build_index(corpus.as_ref())?;
        Ok(Self { index, corpus })
    }

    /// Open the corpus at `path` and index it. With `cache`, documents are copied into memory
    /// first and fetches never touch the source again.
    pub fn open(path: impl AsRef<Path>, format: CorpusFormat, cache: bool) -> Result<Self> {
        let source = open_corpus(path, format)?;
        let corpus: Box<dyn CorpusReader> = if cache { Box::new(InMemoryCorpus::load(source.as_ref())?) } else { source };
        Self::build(corpus)
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn search(&self, query: &str) -> Vec<Document> {
        search(query, &self.index, self.corpus.as_ref())
    }

    pub fn search_with(&self, query: &str, options: &SearchOptions) -> SearchResults {
        let mut ranked = matching_postings(&self.index, query, options.ranking);
        let total_hits = ranked.len();
        if let Some(limit) = options.limit {
            ranked.truncate(limit);
        }
        SearchResults { total_hits, hits: fetch_hits(ranked, self.corpus.as_ref()) }
    }

    pub fn document(&self, id: &str) -> Result<Document> {
        self.corpus.fetch_document(id)
    }
}
