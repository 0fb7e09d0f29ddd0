use crate::types::DbId;

/// Domain-level error type shared across all crates.
///
/// Carries no HTTP knowledge; the API layer maps each variant to a status
/// code and a stable machine-readable error code.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by primary key found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed a domain validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state (e.g. duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected internal failure. Message is logged, never leaked.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for domain-level results.
pub type CoreResult<T> = Result<T, CoreError>;
