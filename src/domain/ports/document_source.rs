use crate::domain::error::DomainError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One unit of ingestion. Chunking is done before documents reach the index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id: None,
            text: text.into(),
            metadata,
        }
    }
}

pub trait DocumentSource: Send + Sync {
    fn documents(&self) -> Result<Vec<Document>, DomainError>;
}
