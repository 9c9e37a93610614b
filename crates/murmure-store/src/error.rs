use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected an append.
    #[error("Append rejected: {0}")]
    Rejected(String),

    /// The store connection or subscription is gone.
    #[error("Store unavailable")]
    Unavailable,

    /// Record (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
