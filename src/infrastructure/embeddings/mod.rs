pub mod hashing;
pub mod openai;
