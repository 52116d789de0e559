use crate::corpus::CorpusReader;
use crate::error::{Result, SearchError};
use crate::frequency::CorpusFrequencies;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: String,
    pub weight: f64, // raw tf * idf, may be negative
}

/// Ranked postings for one term plus a membership map for intersection.
#[derive(Debug, Clone, Default)]
pub struct PostingsList {
    ranked: Vec<Posting>, // weight desc, doc_id asc
    weights: HashMap<String, f64>,
}

impl PostingsList {
    fn from_unsorted(mut entries: Vec<Posting>) -> Self {
        entries.sort_by(rank_order);
        let weights = entries.iter().map(|p| (p.doc_id.clone(), p.weight)).collect();
        Self { ranked: entries, weights }
    }

    pub fn ranked(&self) -> &[Posting] { &self.ranked }

    pub fn contains(&self, doc_id: &str) -> bool { self.weights.contains_key(doc_id) }

    pub fn weight(&self, doc_id: &str) -> Option<f64> { self.weights.get(doc_id).copied() }

    pub fn len(&self) -> usize { self.ranked.len() }

    pub fn is_empty(&self) -> bool { self.ranked.is_empty() }
}

/// Ordering used for every ranked list: weight descending, identifier ascending.
pub(crate) fn rank_order(a: &Posting, b: &Posting) -> Ordering {
    b.weight.total_cmp(&a.weight).then_with(|| id_order(&a.doc_id, &b.doc_id))
}

/// Identifier order: all-digit ids first by numeric value ("9" < "10"), then the rest as strings.
pub(crate) fn id_order(a: &str, b: &str) -> Ordering {
    fn key(id: &str) -> Option<u128> {
        id.bytes().all(|c| c.is_ascii_digit()).then(|| id.parse().ok()).flatten()
    }
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// `ln(N / (1 + df))`.
pub fn idf(num_docs: usize, doc_frequency: usize) -> f64 {
    (num_docs as f64 / (1 + doc_frequency) as f64).ln()
}

/// Term to ranked postings. Immutable once built.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingsList>,
    num_docs: usize,
}

impl InvertedIndex {
    /// Compute document frequencies and TF-IDF weights and assemble ranked postings.
    pub fn from_frequencies(freqs: &CorpusFrequencies) -> Result<Self> {
        let num_docs = freqs.num_docs();
        if num_docs == 0 {
            return Err(SearchError::EmptyCorpus);
        }

        // Each document lists a term at most once, so a term's entry count is its df.
        let mut raw: HashMap<&str, Vec<(&str, u32)>> = HashMap::new();
        for (doc_id, counts) in freqs.iter() {
            for (term, &count) in counts {
                if count > 0 {
                    raw.entry(term.as_str()).or_default().push((doc_id, count));
                }
            }
        }

        let postings: HashMap<String, PostingsList> = raw
            .into_iter()
            .map(|(term, entries)| {
                let term_idf = idf(num_docs, entries.len());
                let weighted = entries
                    .into_iter()
                    .map(|(doc_id, count)| Posting { doc_id: doc_id.to_string(), weight: f64::from(count) * term_idf })
                    .collect();
                (term.to_string(), PostingsList::from_unsorted(weighted))
            })
            .collect();

        tracing::info!(num_docs, num_terms = postings.len(), "built inverted index");
        Ok(Self { postings, num_docs })
    }

    pub fn postings(&self, term: &str) -> Option<&PostingsList> { self.postings.get(term) }

    /// Number of documents containing `term`; zero for unknown terms.
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, PostingsList::len)
    }

    pub fn num_docs(&self) -> usize { self.num_docs }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}

/// Scan the corpus once and build its index.
pub fn build_index(corpus: &dyn CorpusReader) -> Result<InvertedIndex> {
    let freqs = CorpusFrequencies::from_documents(corpus.documents()?);
    InvertedIndex::from_frequencies(&freqs)
}
