//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations detected while building a tree.
/// They reach the caller without being retried or logged away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// `index` is the position in the input sequence. Adapters leave it `None`;
    /// `TreeBuilder::build` fills it in.
    #[error("invalid record{}: {reason}", describe_index(.index))]
    InvalidRecord {
        index: Option<usize>,
        reason: String,
    },

    #[error("invalid tree configuration: {0}")]
    Configuration(String),

    #[error("cycle detected in hierarchy at node: {0}")]
    CycleDetected(String),
}

impl DomainError {
    /// Adapter-side constructor; the record position is not known yet.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        DomainError::InvalidRecord {
            index: None,
            reason: reason.into(),
        }
    }

    /// Attach the input position to an `InvalidRecord`; other variants pass through.
    pub fn at_index(self, position: usize) -> Self {
        match self {
            DomainError::InvalidRecord { index: None, reason } => DomainError::InvalidRecord {
                index: Some(position),
                reason,
            },
            other => other,
        }
    }
}

fn describe_index(index: &Option<usize>) -> String {
    index.map(|i| format!(" at index {}", i)).unwrap_or_default()
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
