use crate::application::retriever::{Retriever, RetrieverFactory};
use crate::domain::error::DomainError;
use crate::domain::ports::document_source::DocumentSource;
use crate::domain::ports::index_store::StoreInfo;
use crate::domain::values::collection::Collection;
use serde::Serialize;
use tracing::info;

pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub collection: Collection,
    pub documents: usize,
    pub location: String,
    pub store: StoreInfo,
}

pub struct BuildIndexUseCase {
    factory: RetrieverFactory,
}

impl BuildIndexUseCase {
    pub fn new(factory: RetrieverFactory) -> Self {
        Self { factory }
    }

    /// Embeds every document into a fresh index and replaces the persisted store.
    ///
    /// The previous store stays in place until the final atomic save, so a
    /// failed build never leaves the collection without an index.
    pub async fn execute(
        &self,
        collection: Collection,
        source: &dyn DocumentSource,
        batch_size: usize,
    ) -> Result<(BuildReport, Retriever), DomainError> {
        if batch_size == 0 {
            return Err(DomainError::InvalidInput("batch size must be at least 1".into()));
        }
        let documents = source.documents()?;
        let retriever = self.factory.create(collection)?;
        info!(collection = %collection, documents = documents.len(), "building index");

        for (n, chunk) in documents.chunks(batch_size).enumerate() {
            retriever.insert_batch(chunk).await?;
            info!(
                collection = %collection,
                embedded = (n * batch_size + chunk.len()),
                total = documents.len(),
                "embedded batch"
            );
        }

        let store = retriever.save()?;
        let report = BuildReport {
            collection,
            documents: documents.len(),
            location: retriever.location().display().to_string(),
            store,
        };
        Ok((report, retriever))
    }
}
