use crate::domain::error::DomainError;
use crate::domain::index::VectorIndex;
use crate::domain::values::metric::Metric;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Header of a persisted index, readable without loading the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreInfo {
    pub format_version: u16,
    pub metric: Metric,
    pub dimension: usize,
    pub record_count: u64,
    pub saved_at: DateTime<Utc>,
}

/// Durable storage for a whole index.
///
/// `save` replaces the store at `location` atomically: after a failed or
/// interrupted save the previously saved store is still loadable.
pub trait IndexStore: Send + Sync {
    fn save(&self, index: &VectorIndex, location: &Path) -> Result<StoreInfo, DomainError>;
    fn load(&self, location: &Path) -> Result<VectorIndex, DomainError>;
    fn inspect(&self, location: &Path) -> Result<StoreInfo, DomainError>;
}
