use crate::types::DbId;

/// Domain-level error for catalog, campaign, pool and timeline operations.
///
/// The surrounding interface layer maps these onto its own status codes via
/// [`CoreError::code`]; messages are safe to show to a caller.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Stable machine-readable code for structured failure responses.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::InvalidState(_) => "INVALID_STATE",
            CoreError::Forbidden(_) => "FORBIDDEN",
        }
    }
}
