use crate::domain::entities::record::{Payload, QueryResult};
use crate::domain::error::DomainError;
use crate::domain::index::VectorIndex;
use crate::domain::ports::document_source::Document;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::index_store::{IndexStore, StoreInfo};
use crate::domain::values::collection::Collection;
use crate::domain::values::metric::Metric;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One collection's embed / insert / query / save / load capability.
pub struct Retriever {
    collection: Collection,
    location: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IndexStore>,
    index: VectorIndex,
}

impl Retriever {
    pub fn new(
        collection: Collection,
        location: PathBuf,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn IndexStore>,
        index: VectorIndex,
    ) -> Result<Self, DomainError> {
        if index.dimension() != embedder.dimension() {
            return Err(DomainError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }
        Ok(Self {
            collection,
            location,
            embedder,
            store,
            index,
        })
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Embeds `texts`, checking every vector against the index dimension.
    /// Non-finite output is an embedder fault, not bad caller input.
    pub async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let vectors = self.embedder.embed(texts, input_type).await?;
        if vectors.len() != texts.len() {
            return Err(DomainError::EmbeddingFailure(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.index.dimension()) {
            return Err(DomainError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: bad.len(),
            });
        }
        if vectors.iter().flatten().any(|v| !v.is_finite()) {
            return Err(DomainError::EmbeddingFailure(
                "embedder returned non-finite components".into(),
            ));
        }
        Ok(vectors)
    }

    /// Embeds and inserts a batch. Embedding happens before any insert, so an
    /// embedding failure leaves the index untouched.
    pub async fn insert_batch(&self, documents: &[Document]) -> Result<Vec<String>, DomainError> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embed(&texts, InputType::Document).await?;

        let mut ids = Vec::with_capacity(documents.len());
        for (doc, vector) in documents.iter().zip(vectors) {
            let id = doc
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            self.index.insert(
                id.clone(),
                vector,
                Payload::new(doc.text.clone(), doc.metadata.clone()),
            )?;
            ids.push(id);
        }
        Ok(ids)
    }

    pub async fn insert(&self, document: Document) -> Result<String, DomainError> {
        let mut ids = self.insert_batch(std::slice::from_ref(&document)).await?;
        ids.pop()
            .ok_or_else(|| DomainError::EmbeddingFailure("no id produced".into()))
    }

    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<QueryResult>, DomainError> {
        if k == 0 {
            return Err(DomainError::InvalidK(k));
        }
        let started = Instant::now();
        let vector = self
            .embed(&[text.to_string()], InputType::Query)
            .await?
            .pop()
            .ok_or_else(|| DomainError::EmbeddingFailure("empty embedding response".into()))?;
        let results = self.index.query(&vector, k)?;
        debug!(
            collection = %self.collection,
            k,
            hits = results.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "query"
        );
        Ok(results)
    }

    pub fn save(&self) -> Result<StoreInfo, DomainError> {
        self.store.save(&self.index, &self.location)
    }
}

/// Creates and opens retrievers for the collections under one data directory.
#[derive(Clone)]
pub struct RetrieverFactory {
    data_dir: PathBuf,
    metric: Metric,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IndexStore>,
}

impl RetrieverFactory {
    pub fn new(
        data_dir: PathBuf,
        metric: Metric,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            data_dir,
            metric,
            embedder,
            store,
        }
    }

    pub fn location(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    /// An empty retriever; nothing is written until `save`.
    pub fn create(&self, collection: Collection) -> Result<Retriever, DomainError> {
        let index = VectorIndex::new(self.embedder.dimension(), self.metric)?;
        Retriever::new(
            collection,
            self.location(collection),
            self.embedder.clone(),
            self.store.clone(),
            index,
        )
    }

    pub fn open(&self, collection: Collection) -> Result<Retriever, DomainError> {
        let location = self.location(collection);
        let index = self.store.load(&location).map_err(|e| {
            if let DomainError::CorruptStore(reason) = &e {
                warn!(
                    collection = %collection,
                    path = %location.display(),
                    %reason,
                    "store is corrupt, rebuild it with `galindex build`"
                );
            }
            e
        })?;
        if index.dimension() != self.embedder.dimension() {
            warn!(
                collection = %collection,
                stored = index.dimension(),
                provider = self.embedder.dimension(),
                "stored vectors do not match the embedding provider, rebuild the collection"
            );
        }
        Retriever::new(
            collection,
            location,
            self.embedder.clone(),
            self.store.clone(),
            index,
        )
    }
}
