//! Shared test helpers.
#![allow(dead_code)]

use galindex::domain::entities::record::Payload;
use galindex::domain::error::DomainError;
use galindex::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use galindex::domain::values::metric::Metric;
use galindex::infrastructure::embeddings::hashing::HashingProvider;
use galindex::infrastructure::persistence::file_store::BinaryFileStore;
use galindex::GalIndex;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DIM: usize = 64;

pub fn setup(data_dir: &Path) -> GalIndex {
    GalIndex::with_providers(
        data_dir.to_path_buf(),
        Metric::Cosine,
        Arc::new(HashingProvider::new(DIM).unwrap()),
        Arc::new(BinaryFileStore::new()),
    )
}

pub fn payload(text: &str) -> Payload {
    Payload::new(text, Map::new())
}

pub fn payload_with(text: &str, metadata: Value) -> Payload {
    Payload::new(text, metadata.as_object().cloned().unwrap_or_default())
}

pub fn random_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    (0..dim).map(|_| rng.gen_range(-1.0_f32..1.0)).collect()
}

pub fn write_jsonl(dir: &Path, name: &str, lines: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

/// Intro-style corpus: title on the first line, description after it.
pub fn intro_corpus() -> Vec<Value> {
    vec![
        json!({"text": "千恋万花\n柚子社出品的和风恋爱游戏", "metadata": {"prompt": "千恋万花"}}),
        json!({"text": "秽翼的尤斯蒂娅\n奇幻题材视觉小说", "metadata": {"prompt": "秽翼的尤斯蒂娅"}}),
        json!({"text": "Summer Pockets\nKey社的夏日作品", "metadata": {"prompt": "Summer Pockets"}}),
    ]
}

/// Embedder that always fails, for checking that failures leave indexes alone.
pub struct FailingEmbedder {
    pub dimension: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Err(DomainError::EmbeddingFailure("model unavailable".into()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embedder that claims one dimension but returns another.
pub struct LyingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for LyingEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts.iter().map(|_| vec![0.5; 3]).collect())
    }

    fn dimension(&self) -> usize {
        4
    }
}

/// Embedder whose model produces NaN components.
pub struct NanEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for NanEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts.iter().map(|_| vec![f32::NAN, 1.0]).collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}
