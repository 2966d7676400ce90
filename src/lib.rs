pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::build_index::{BuildIndexUseCase, BuildReport};
use crate::application::inspect::InspectUseCase;
use crate::application::retrieval::{IntroMatch, RetrievalService};
use crate::application::retriever::RetrieverFactory;
use crate::config::{Config, ProviderKind};
use crate::domain::entities::record::QueryResult;
use crate::domain::error::DomainError;
use crate::domain::ports::document_source::DocumentSource;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::index_store::{IndexStore, StoreInfo};
use crate::domain::values::collection::Collection;
use crate::domain::values::metric::Metric;
use crate::infrastructure::embeddings::hashing::HashingProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::persistence::file_store::BinaryFileStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct GalIndex {
    build_uc: BuildIndexUseCase,
    inspect_uc: InspectUseCase,
    retrieval: RetrievalService,
}

impl GalIndex {
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                config.api_key.clone(),
                config.model.clone(),
                config.base_url.clone(),
                config.dimension,
            )),
            ProviderKind::Hashing => Arc::new(HashingProvider::new(config.hashing_dimension())?),
        };
        Ok(Self::with_providers(
            config.data_dir.clone(),
            config.metric,
            embedder,
            Arc::new(BinaryFileStore::new()),
        ))
    }

    pub fn with_providers(
        data_dir: PathBuf,
        metric: Metric,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn IndexStore>,
    ) -> Self {
        let factory = RetrieverFactory::new(data_dir, metric, embedder, store);
        Self {
            build_uc: BuildIndexUseCase::new(factory.clone()),
            inspect_uc: InspectUseCase::new(factory.clone()),
            retrieval: RetrievalService::new(factory),
        }
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Builds `collection` from `source`, persists it, and serves the new index.
    pub async fn build(
        &self,
        collection: Collection,
        source: &dyn DocumentSource,
        batch_size: usize,
    ) -> Result<BuildReport, DomainError> {
        let (report, retriever) = self.build_uc.execute(collection, source, batch_size).await?;
        self.retrieval.install(Arc::new(retriever));
        Ok(report)
    }

    pub async fn lookup_single(&self, query_text: &str) -> Result<Option<IntroMatch>, DomainError> {
        self.retrieval.lookup_single(query_text).await
    }

    pub async fn lookup_many(
        &self,
        query_text: &str,
        k: usize,
        field: &str,
    ) -> Result<Vec<String>, DomainError> {
        self.retrieval.lookup_many(query_text, k, field).await
    }

    pub async fn query(
        &self,
        collection: Collection,
        text: &str,
        k: usize,
    ) -> Result<Vec<QueryResult>, DomainError> {
        self.retrieval.query(collection, text, k).await
    }

    pub fn info(&self, collection: Collection) -> Result<StoreInfo, DomainError> {
        self.inspect_uc.execute(collection)
    }
}
