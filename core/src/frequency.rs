use crate::document::Document;
use crate::tokenizer::tokenize;
use std::collections::{HashMap, HashSet};

/// Raw occurrence count of each term within one document.
pub type TermFrequencyMap = HashMap<String, u32>;

/// Count term occurrences in a body of text.
pub fn term_frequencies(body: &str) -> TermFrequencyMap {
    let mut counts = TermFrequencyMap::new();
    for term in tokenize(body) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Per-document term frequencies, plus the count of every distinct document enumerated.
///
/// Documents whose body yields no terms count toward N but hold no map.
#[derive(Debug, Default, Clone)]
pub struct CorpusFrequencies {
    docs: HashMap<String, TermFrequencyMap>,
    seen: HashSet<String>,
}

impl CorpusFrequencies {
    pub fn new() -> Self { Self::default() }

    /// Build frequencies from a stream of documents.
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut freqs = Self::new();
        for doc in documents {
            freqs.add(&doc);
        }
        freqs
    }

    /// Add one document. Returns false when it was a repeated identifier.
    ///
    /// The first occurrence of an identifier decides, even when its body is empty, matching the
    /// readers' first-wins `fetch_document`.
    pub fn add(&mut self, doc: &Document) -> bool {
        if !self.seen.insert(doc.id.clone()) {
            tracing::warn!(doc_id = %doc.id, "duplicate document id, keeping first occurrence");
            return false;
        }
        let counts = term_frequencies(&doc.body);
        if counts.is_empty() {
            tracing::debug!(doc_id = %doc.id, "document has no usable terms");
        } else {
            self.docs.insert(doc.id.clone(), counts);
        }
        true
    }

    /// N, the number of distinct documents enumerated.
    pub fn num_docs(&self) -> usize { self.seen.len() }

    pub fn is_empty(&self) -> bool { self.seen.is_empty() }

    pub fn get(&self, doc_id: &str) -> Option<&TermFrequencyMap> { self.docs.get(doc_id) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermFrequencyMap)> {
        self.docs.iter().map(|(id, tf)| (id.as_str(), tf))
    }
}
