use crate::domain::entities::record::{Payload, QueryResult, Record};
use crate::domain::error::DomainError;
use crate::domain::index::search;
use crate::domain::values::metric::Metric;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Append-only collection of records sharing one dimension and one metric.
///
/// Records live behind `RwLock<Arc<Vec<Record>>>`. Readers clone the `Arc` and
/// release the lock before scanning, so a query or a save always works on one
/// consistent [`Snapshot`]. Writers append through `Arc::make_mut`, which copies
/// the sequence only while an older snapshot is still alive.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    metric: Metric,
    state: RwLock<IndexState>,
}

#[derive(Debug, Default)]
struct IndexState {
    records: Arc<Vec<Record>>,
    positions: HashMap<String, usize>,
}

impl VectorIndex {
    pub fn new(dimension: usize, metric: Metric) -> Result<Self, DomainError> {
        if dimension == 0 {
            return Err(DomainError::InvalidInput(
                "Index dimension must be at least 1".into(),
            ));
        }
        Ok(Self {
            dimension,
            metric,
            state: RwLock::new(IndexState::default()),
        })
    }

    /// Rebuilds an index from records in their original insertion order.
    pub fn from_records(
        dimension: usize,
        metric: Metric,
        records: Vec<Record>,
    ) -> Result<Self, DomainError> {
        let index = Self::new(dimension, metric)?;
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.validate(&record.id, &record.vector)?;
            if positions.insert(record.id.clone(), position).is_some() {
                return Err(DomainError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self {
            state: RwLock::new(IndexState {
                records: Arc::new(records),
                positions,
            }),
            ..index
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn insert(
        &self,
        id: impl Into<String>,
        vector: Vec<f32>,
        payload: Payload,
    ) -> Result<(), DomainError> {
        let id = id.into();
        self.validate(&id, &vector)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.positions.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        let position = state.records.len();
        Arc::make_mut(&mut state.records).push(Record::new(id.clone(), vector, payload));
        state.positions.insert(id, position);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Record, DomainError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .positions
            .get(id)
            .map(|&position| state.records[position].clone())
            .ok_or_else(|| DomainError::NotFound(format!("record {id}")))
    }

    pub fn contains(&self, id: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.positions.contains_key(id)
    }

    pub fn size(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            dimension: self.dimension,
            metric: self.metric,
            records: Arc::clone(&state.records),
        }
    }

    /// Top-k records for `vector`, best first, ties going to the earlier insert.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>, DomainError> {
        self.snapshot().query(vector, k)
    }

    fn validate(&self, id: &str, vector: &[f32]) -> Result<(), DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidInput("Record id must not be empty".into()));
        }
        check_vector(self.dimension, vector)
    }
}

pub(crate) fn check_vector(dimension: usize, vector: &[f32]) -> Result<(), DomainError> {
    if vector.len() != dimension {
        return Err(DomainError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(DomainError::InvalidInput(format!(
            "Vector component {pos} is not finite"
        )));
    }
    Ok(())
}

/// Immutable view of an index at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    dimension: usize,
    metric: Metric,
    records: Arc<Vec<Record>>,
}

impl Snapshot {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>, DomainError> {
        check_vector(self.dimension, vector)?;
        if k == 0 {
            return Err(DomainError::InvalidK(k));
        }
        Ok(search::top_k(self.metric, &self.records, vector, k))
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.metric == other.metric
            && self.records == other.records
    }
}
