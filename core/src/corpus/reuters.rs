use super::{collect_files, CorpusReader};
use crate::document::Document;
use crate::error::{Result, SearchError};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref ARTICLE: Regex = Regex::new(r"(?is)<REUTERS\b([^>]*)>(.*?)</REUTERS>").expect("valid regex");
    static ref NEWID: Regex = Regex::new(r#"(?i)\bNEWID\s*=\s*"([^"]*)""#).expect("valid regex");
    static ref TITLE: Regex = Regex::new(r"(?is)<TITLE>(.*?)</TITLE>").expect("valid regex");
    static ref BODY: Regex = Regex::new(r"(?is)<BODY>(.*?)</BODY>").expect("valid regex");
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("valid regex");
}

/// Reuters-21578 SGML archives (`reut2-*.sgm`), one file or a directory of them.
#[derive(Debug, Clone)]
pub struct ReutersCorpus {
    files: Vec<PathBuf>,
}

impl ReutersCorpus {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let files = collect_files(path.as_ref(), &["sgm"])?;
        Ok(Self { files })
    }

    fn read_all(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for file in &self.files {
            let bytes = fs::read(file).map_err(|e| SearchError::corpus_read(file, e))?;
            let parsed = parse_articles(&String::from_utf8_lossy(&bytes));
            tracing::debug!(file = %file.display(), documents = parsed.len(), "parsed reuters archive");
            docs.extend(parsed);
        }
        Ok(docs)
    }
}

impl CorpusReader for ReutersCorpus {
    fn documents(&self) -> Result<Box<dyn Iterator<Item = Document> + '_>> {
        Ok(Box::new(self.read_all()?.into_iter()))
    }

    fn fetch_document(&self, id: &str) -> Result<Document> {
        self.read_all()?
            .into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| SearchError::DocumentNotFound(id.to_string()))
    }
}

/// Extract every article that carries both a NEWID and a BODY.
pub(crate) fn parse_articles(sgml: &str) -> Vec<Document> {
    ARTICLE
        .captures_iter(sgml)
        .filter_map(|article| {
            let attrs = article.get(1).map_or("", |m| m.as_str());
            let inner = article.get(2).map_or("", |m| m.as_str());
            let Some(id) = NEWID.captures(attrs).and_then(|c| c.get(1)) else {
                tracing::debug!("skipping article without NEWID");
                return None;
            };
            let body = BODY.captures(inner).and_then(|c| c.get(1))?;
            let title = TITLE.captures(inner).and_then(|c| c.get(1)).map_or(String::new(), |m| text_of(m.as_str()));
            Some(Document { id: id.as_str().to_string(), title, body: text_of(body.as_str()) })
        })
        .collect()
}

fn text_of(markup: &str) -> String {
    decode_entities(&TAG.replace_all(markup, "")).into_owned()
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        let decoded = match name {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => numeric_entity(name),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
