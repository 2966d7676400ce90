use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data stored alongside a vector: the text that was embedded and its metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payload {
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Payload {
    pub fn new(text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Metadata field rendered as a string. Missing or null fields yield `""`.
    pub fn field(&self, name: &str) -> String {
        match self.metadata.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

impl Record {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }
}

/// One hit of a similarity query, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub record_id: String,
    pub score: f64,
    pub payload: Payload,
}
