//! Catalog error types.

use crate::domain::DomainError;

/// Errors that can occur when loading or reading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Backing store could not be reached; the caller may retry
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// Data violates a catalog invariant
    #[error("invalid catalog data: {0}")]
    Invalid(String),

    /// Failed to read a snapshot file
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a snapshot file
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Whether retrying the same read may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_))
    }
}

impl From<DomainError> for CatalogError {
    fn from(e: DomainError) -> Self {
        CatalogError::Invalid(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathId;

    #[test]
    fn error_display() {
        let err = CatalogError::Unavailable("connection refused".into());
        assert_eq!(err.to_string(), "catalog unavailable: connection refused");
        assert!(err.is_retryable());

        let err = CatalogError::Invalid("unknown route 4".into());
        assert_eq!(err.to_string(), "invalid catalog data: unknown route 4");
        assert!(!err.is_retryable());
    }

    #[test]
    fn domain_errors_become_invalid() {
        let err: CatalogError = DomainError::PolylineTooShort {
            path: PathId(2),
            points: 0,
        }
        .into();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }
}
