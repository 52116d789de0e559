use super::{collect_files, has_extension, CorpusReader};
use crate::document::Document;
use crate::error::{Result, SearchError};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(default)]
    title: String,
    body: Option<String>,
}

impl InputDoc {
    fn into_document(self) -> Option<Document> {
        let body = self.body?;
        Some(Document { id: self.id, title: self.title, body })
    }
}

/// Documents stored as JSON: a `.json` file holding one object or an array of objects, a
/// `.jsonl` file with one object per line, or a directory of either.
#[derive(Debug, Clone)]
pub struct JsonCorpus {
    files: Vec<PathBuf>,
}

impl JsonCorpus {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let files = collect_files(path.as_ref(), &["json", "jsonl"])?;
        Ok(Self { files })
    }

    fn read_all(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for file in &self.files {
            if has_extension(file, &["jsonl"]) {
                read_jsonl(file, &mut docs)?;
            } else {
                read_json(file, &mut docs)?;
            }
        }
        Ok(docs)
    }
}

impl CorpusReader for JsonCorpus {
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

fn open(file: &Path) -> Result<BufReader<File>> {
    let f = File::open(file).map_err(|e| SearchError::corpus_read(file, e))?;
    Ok(BufReader::new(f))
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let mut reader = open(file)?;
    let mut buf = Vec::new();
    let mut lineno = 0usize;
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| SearchError::corpus_read(file, e))?;
        if read == 0 { break; }
        lineno += 1;
        // A bad record only loses itself, never the rest of the file.
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(file = %file.display(), line = lineno, error = %e, "skipping record with invalid UTF-8");
                continue;
            }
        };
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<InputDoc>(line) {
            Ok(doc) => push(doc, file, docs),
            Err(e) => tracing::warn!(file = %file.display(), line = lineno, error = %e, "skipping malformed record"),
        }
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let json: serde_json::Value = serde_json::from_reader(open(file)?).map_err(|e| SearchError::corpus_read(file, e))?;
    let records = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => return Err(SearchError::corpus_read(file, "expected a JSON object or array")),
    };
    for record in records {
        match serde_json::from_value::<InputDoc>(record) {
            Ok(doc) => push(doc, file, docs),
            Err(e) => tracing::warn!(file = %file.display(), error = %e, "skipping malformed record"),
        }
    }
    Ok(())
}

fn push(doc: InputDoc, file: &Path, docs: &mut Vec<Document>) {
    let id = doc.id.clone();
    match doc.into_document() {
        Some(doc) => docs.push(doc),
        None => tracing::debug!(file = %file.display(), doc_id = %id, "skipping record without body"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_jsonl_and_skips_bad_lines() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("docs.jsonl");
        fs::write(
            &file,
            "{\"id\":\"1\",\"title\":\"Grain\",\"body\":\"wheat\",\"url\":\"http://x\"}\n\nnot json\n{\"id\":\"2\",\"title\":\"No body\"}\n{\"id\":\"3\",\"body\":\"corn\"}\n",
        )
        .unwrap();
        let corpus = JsonCorpus::open(&file).unwrap();
        let ids: Vec<String> = corpus.documents().unwrap().map(|d| d.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(corpus.fetch_document("3").unwrap().title, "");
        assert!(corpus.fetch_document("2").unwrap_err().is_not_found());
    }

    #[test]
    fn reads_directories_of_json_arrays_and_objects() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id":"a1","body":"x"},{"id":"a2","body":"y"}]"#).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.json"), r#"{"id":"b1","title":"B","body":"z"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let corpus = JsonCorpus::open(dir.path()).unwrap();
        assert_eq!(corpus.documents().unwrap().count(), 3);
        assert_eq!(corpus.fetch_document("b1").unwrap().title, "B");
    }

    #[test]
    fn invalid_utf8_line_skips_only_that_record() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("docs.jsonl");
        let mut bytes = b"{\"id\":\"1\",\"body\":\"wheat\"}\n".to_vec();
        bytes.extend_from_slice(b"{\"id\":\"2\",\"body\":\"bad \xff byte\"}\n");
        bytes.extend_from_slice(b"{\"id\":\"3\",\"body\":\"corn\"}");
        fs::write(&file, bytes).unwrap();
        let corpus = JsonCorpus::open(&file).unwrap();
        let ids: Vec<String> = corpus.documents().unwrap().map(|d| d.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(corpus.fetch_document("2").unwrap_err().is_not_found());
    }

    #[test]
    fn malformed_array_element_is_skipped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("docs.json");
        fs::write(&file, r#"[{"id":"a1","body":"x"},{"title":"no id"},42,{"id":"a3","body":"z"}]"#).unwrap();
        let corpus = JsonCorpus::open(&file).unwrap();
        let ids: Vec<String> = corpus.documents().unwrap().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn unparsable_json_file_is_a_read_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("broken.json");
        fs::write(&file, "{ not json").unwrap();
        let corpus = JsonCorpus::open(&file).unwrap();
        assert!(matches!(corpus.documents().err(), Some(SearchError::CorpusRead { .. })));
    }
}
