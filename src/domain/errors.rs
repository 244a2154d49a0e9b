//! Domain errors for the engagement engine.

use thiserror::Error;

/// Domain-level errors raised by reconciliation and evaluation.
///
/// The recorder and interval reconciler never fail; everything that talks to a
/// collaborator port surfaces one of these instead of substituting a default.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Scope resolution failed for {scope}: {reason}")]
    ScopeResolutionFailed { scope: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Short machine-friendly name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch",
            Self::DecryptionFailed(_) => "decryption",
            Self::ScopeResolutionFailed { .. } => "scope_resolution",
            Self::ValidationFailed(_) => "validation",
            Self::WriteFailed(_) => "write",
            Self::SerializationError(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_error_message() {
        let err = DomainError::ScopeResolutionFailed {
            scope: "eu-west".to_string(),
            reason: "unknown scope".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Scope resolution failed for eu-west: unknown scope"
        );
        assert_eq!(err.kind(), "scope_resolution");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: DomainError = parse_err.into();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }
}
