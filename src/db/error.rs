use thiserror::Error;

/// Failures raised by the job store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored job {id} is unreadable: {reason}")]
    CorruptRow { id: String, reason: String },
}
