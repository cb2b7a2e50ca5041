use crate::OperationKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

/// Failure to build the operation for a single root field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("schema declares no {kind} root type")]
    MissingRootType { kind: OperationKind },

    #[error("{kind} root type has no field '{field}'{}", suggestion_suffix(.suggestion))]
    UnknownField {
        kind: OperationKind,
        field: String,
        suggestion: Option<String>,
    },

    #[error("field '{field}' exceeds the selection depth limit of {limit}")]
    DepthLimitExceeded { field: String, limit: usize },
}

#[allow(clippy::ref_option)]
fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_deref()
        .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

/// Failure of a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to synthesize {kind} '{field}': {source}")]
    Synthesis {
        kind: OperationKind,
        field: String,
        #[source]
        source: SynthesisError,
    },

    #[error(
        "{kind} fields '{first}' and '{second}' both derive the identifier '{identifier}'"
    )]
    IdentifierCollision {
        kind: OperationKind,
        identifier: String,
        first: String,
        second: String,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error concerns one field and may be isolated under
    /// [`FailurePolicy::Isolate`](crate::FailurePolicy::Isolate).
    #[must_use]
    pub const fn is_field_local(&self) -> bool {
        matches!(
            self,
            Self::Synthesis { .. } | Self::IdentifierCollision { .. }
        )
    }
}
