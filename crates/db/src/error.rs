//! Store-level error type and the structured failure body.

use muster_core::types::DbId;
use muster_core::CoreError;
use serde::Serialize;
use validator::Validate;

/// Error type for all repository and reporting operations.
///
/// Wraps [`CoreError`] for domain-rule failures and `sqlx::Error` for
/// storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error from `muster-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for repository return values.
pub type StoreResult<T> = Result<T, StoreError>;

/// Structured failure body for the external interface layer.
///
/// Carries a stable code and a human-readable message; internal state never
/// leaks through here.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub code: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }.into()
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into()).into()
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidState(message.into()).into()
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into()).into()
    }

    /// Render the structured failure body.
    ///
    /// Database errors are logged here and reported as a generic internal
    /// failure.
    pub fn failure(&self) -> Failure {
        match self {
            StoreError::Core(core) => Failure {
                code: core.code(),
                message: core.to_string(),
            },
            StoreError::Database(err) => {
                tracing::error!(error = %err, "database error");
                Failure {
                    code: "INTERNAL_ERROR",
                    message: "An internal error occurred".to_string(),
                }
            }
        }
    }
}

/// Run a DTO's `validator` rules, mapping failures into the taxonomy.
pub(crate) fn validate_input<T: Validate>(input: &T) -> StoreResult<()> {
    input
        .validate()
        .map_err(|err| StoreError::validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_code_and_message() {
        let failure = StoreError::conflict("Library already imported").failure();
        assert_eq!(failure.code, "CONFLICT");
        assert_eq!(failure.message, "Conflict: Library already imported");
    }

    #[test]
    fn database_errors_are_sanitized() {
        let failure = StoreError::Database(sqlx::Error::RowNotFound).failure();
        assert_eq!(failure.code, "INTERNAL_ERROR");
        assert!(!failure.message.contains("row"));
    }
}
