use relay_core::error::CoreError;

/// Error type for the service layer.
///
/// Domain errors pass through unchanged so the HTTP layer can map them to
/// status codes; storage failures are wrapped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
