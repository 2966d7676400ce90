use crate::application::retriever::{Retriever, RetrieverFactory};
use crate::domain::entities::record::QueryResult;
use crate::domain::error::DomainError;
use crate::domain::values::collection::Collection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

pub const DEFAULT_FINDNAME_K: usize = 12;
pub const DEFAULT_FINDNAME_FIELD: &str = "prompt";

/// Best intro document for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntroMatch {
    /// The query as given by the caller.
    pub name: String,
    /// First line of the matched document, usually the game title.
    pub title: String,
    pub content: String,
    pub score: f64,
}

/// Serves the intro and findname lookups.
///
/// Each collection is opened on first use and then shared; lookups only touch
/// the cache mutex briefly and run their search against an index snapshot.
pub struct RetrievalService {
    factory: RetrieverFactory,
    loaded: Mutex<HashMap<Collection, Arc<Retriever>>>,
}

impl RetrievalService {
    pub fn new(factory: RetrieverFactory) -> Self {
        Self {
            factory,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Makes `retriever` the served instance for its collection.
    pub fn install(&self, retriever: Arc<Retriever>) {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        loaded.insert(retriever.collection(), retriever);
    }

    /// The served retriever for `collection`, loading it from disk on first use.
    ///
    /// The store is read without holding the cache lock. If another caller
    /// installs or loads the same collection meanwhile, the first one wins.
    pub fn retriever(&self, collection: Collection) -> Result<Arc<Retriever>, DomainError> {
        if let Some(retriever) = self.cached(collection) {
            return Ok(retriever);
        }
        let opened = Arc::new(self.factory.open(collection)?);
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(loaded.entry(collection).or_insert(opened).clone())
    }

    fn cached(&self, collection: Collection) -> Option<Arc<Retriever>> {
        let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        loaded.get(&collection).cloned()
    }

    pub async fn query(
        &self,
        collection: Collection,
        text: &str,
        k: usize,
    ) -> Result<Vec<QueryResult>, DomainError> {
        let text = non_empty(text)?;
        if k == 0 {
            return Err(DomainError::InvalidK(k));
        }
        let retriever = match self.retriever(collection) {
            Ok(retriever) => retriever,
            // not built yet: answer as an empty index
            Err(DomainError::NotFound(what)) => {
                warn!(
                    collection = %collection,
                    missing = %what,
                    "collection has not been built, run `galindex build`"
                );
                return Ok(vec![]);
            }
            Err(e) => return Err(e),
        };
        retriever.query(text, k).await
    }

    /// `None` when the intro collection holds nothing to match or is not built.
    pub async fn lookup_single(&self, query_text: &str) -> Result<Option<IntroMatch>, DomainError> {
        let results = self.query(Collection::Intro, query_text, 1).await?;
        Ok(results.into_iter().next().map(|hit| IntroMatch {
            name: query_text.to_string(),
            title: hit.payload.text.lines().next().unwrap_or_default().to_string(),
            content: hit.payload.text,
            score: hit.score,
        }))
    }

    /// Metadata `field` of the top `k` findname hits, best first.
    pub async fn lookup_many(
        &self,
        query_text: &str,
        k: usize,
        field: &str,
    ) -> Result<Vec<String>, DomainError> {
        let results = self.query(Collection::FindName, query_text, k).await?;
        Ok(results.iter().map(|hit| hit.payload.field(field)).collect())
    }
}

fn non_empty(text: &str) -> Result<&str, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput("query text must not be empty".into()));
    }
    Ok(trimmed)
}
