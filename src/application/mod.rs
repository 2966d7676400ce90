pub mod build_index;
pub mod inspect;
pub mod retrieval;
pub mod retriever;
