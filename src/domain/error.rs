use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    #[error("Embedding error: {0}")]
    EmbeddingFailure(String),

    #[error("Storage I/O error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Errors caused by the caller's input rather than by the index or its storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidInput(_)
                | DomainError::InvalidK(_)
                | DomainError::DimensionMismatch { .. }
        )
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(DomainError::InvalidK(0).is_client_error());
        assert!(DomainError::from("empty query").is_client_error());
        assert!(DomainError::DimensionMismatch { expected: 3, actual: 2 }.is_client_error());
        assert!(!DomainError::CorruptStore("bad magic".into()).is_client_error());
        assert!(!DomainError::EmbeddingFailure("timeout".into()).is_client_error());
    }

    #[test]
    fn test_display_names_dimensions() {
        let err = DomainError::DimensionMismatch { expected: 1024, actual: 512 };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 1024, got 512");
    }
}
