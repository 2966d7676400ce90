pub mod collection;
pub mod metric;
