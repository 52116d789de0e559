use super::CorpusReader;
use crate::document::Document;
use crate::error::{Result, SearchError};
use std::collections::HashMap;

/// Identifier-indexed documents held in memory, enumerated in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCorpus {
    order: Vec<String>,
    docs: HashMap<String, Document>,
}

impl InMemoryCorpus {
    pub fn new() -> Self { Self::default() }

    pub fn from_documents<I: IntoIterator<Item = Document>>(documents: I) -> Self {
        let mut corpus = Self::new();
        for doc in documents {
            corpus.insert(doc);
        }
        corpus
    }

    /// Drain one pass of `source` into memory.
    pub fn load(source: &dyn CorpusReader) -> Result<Self> {
        let corpus = Self::from_documents(source.documents()?);
        tracing::debug!(documents = corpus.len(), "cached corpus in memory");
        Ok(corpus)
    }

    /// Insert a document unless its identifier is already present.
    pub fn insert(&mut self, doc: Document) -> bool {
        if self.docs.contains_key(&doc.id) {
            return false;
        }
        self.order.push(doc.id.clone());
        self.docs.insert(doc.id.clone(), doc);
        true
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

impl CorpusReader for InMemoryCorpus {
    fn documents(&self) -> Result<Box<dyn Iterator<Item = Document> + '_>> {
        Ok(Box::new(self.order.iter().filter_map(|id| self.docs.get(id).cloned())))
    }

    fn fetch_document(&self, id: &str) -> Result<Document> {
        self.docs.get(id).cloned().ok_or_else(|| SearchError::DocumentNotFound(id.to_string()))
    }
}
