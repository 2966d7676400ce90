pub mod entities;
pub mod error;
pub mod index;
pub mod ports;
pub mod values;
