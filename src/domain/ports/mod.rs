pub mod document_source;
pub mod embedding_port;
pub mod index_store;
