use crate::domain::error::DomainError;
use crate::domain::ports::document_source::{Document, DocumentSource};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Reads one JSON document per line: `{"text": ..., "metadata": {...}, "id": ...}`.
///
/// Only `text` is required. Blank lines are skipped.
pub struct JsonlDocumentSource {
    path: PathBuf,
}

impl JsonlDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse<R: BufRead>(reader: R, origin: &str) -> Result<Vec<Document>, DomainError> {
        let mut documents = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let doc: Document = serde_json::from_str(line).map_err(|e| {
                DomainError::InvalidInput(format!("{origin}:{}: {e}", n + 1))
            })?;
            documents.push(doc);
        }
        Ok(documents)
    }
}

impl DocumentSource for JsonlDocumentSource {
    fn documents(&self) -> Result<Vec<Document>, DomainError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                DomainError::NotFound(format!("input file {}", self.path.display()))
            }
            _ => DomainError::StorageIo(e),
        })?;
        Self::parse(BufReader::new(file), &self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let input = concat!(
            "{\"text\": \"秽翼的尤斯蒂娅\\n一部奇幻作品\", \"metadata\": {\"prompt\": \"秽翼的尤斯蒂娅\"}}\n",
            "\n",
            "{\"id\": \"fixed\", \"text\": \"千恋万花\"}\n",
        );
        let docs = JsonlDocumentSource::parse(input.as_bytes(), "inline").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, None);
        assert_eq!(docs[0].metadata["prompt"], "秽翼的尤斯蒂娅");
        assert_eq!(docs[1].id.as_deref(), Some("fixed"));
        assert!(docs[1].metadata.is_empty());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = "{\"text\": \"ok\"}\n{\"metadata\": {}}\n";
        let err = JsonlDocumentSource::parse(input.as_bytes(), "corpus.jsonl").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.starts_with("corpus.jsonl:2:")));
    }

    #[test]
    fn test_missing_file() {
        let source = JsonlDocumentSource::new("/definitely/not/here.jsonl");
        assert!(matches!(source.documents(), Err(DomainError::NotFound(_))));
    }
}
