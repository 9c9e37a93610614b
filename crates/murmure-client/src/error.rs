use thiserror::Error;

use murmure_shared::CryptoError;
use murmure_store::{EntryKey, StoreError};

/// Failures when opening a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("User identifier must not be empty")]
    EmptyUserId,
}

/// Failures reported by [`crate::ChatSession::send`].
#[derive(Error, Debug)]
pub enum SendError {
    /// The session was closed; no further sends are accepted.
    #[error("Session is closed")]
    Closed,

    /// The primary append was rejected; the mirror was never attempted
    /// and nothing is visible anywhere.
    #[error("Send failed: {0}")]
    Transport(#[from] StoreError),

    /// The primary append succeeded but the mirror append failed: the
    /// message is visible in the sender's own channel and was not
    /// delivered to the counterpart. The caller decides whether to
    /// retry; the core does not.
    #[error("Message stored under {primary} but mirror delivery failed: {source}")]
    PartialDelivery {
        primary: EntryKey,
        #[source]
        source: StoreError,
    },
}
