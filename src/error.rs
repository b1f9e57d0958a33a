use thiserror::Error;

/// Error taxonomy for the record-service surface.
///
/// Maps one-to-one onto the status contract an HTTP frontend would expose:
/// 400 for invalid parameters or bodies, 404 for lookup misses, 409 for
/// duplicate records, 500 for storage failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("record not found")]
    NotFound,

    #[error("record exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    /// Status code equivalent for transport layers.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Store(_) => 500,
        }
    }
}
