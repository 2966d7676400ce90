pub mod embeddings;
pub mod ingestion;
pub mod persistence;
