pub mod search;
pub mod vector_index;

pub use vector_index::{Snapshot, VectorIndex};
