use thiserror::Error;

/// Errors produced by the crypto layer.
///
/// The decryption variants are deliberately distinct so callers can log
/// the cause, but none of them carries plaintext or key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The OS entropy source failed its startup probe. Fatal: nothing
    /// in this crate may run without working randomness.
    #[error("Entropy source failure")]
    EntropyFailure,

    #[error("Decryption failed: payload shorter than one cipher block")]
    PayloadTooShort,

    #[error("Decryption failed: ciphertext is not block-aligned")]
    NotBlockAligned,

    #[error("Decryption failed: invalid padding or wrong key")]
    InvalidPadding,

    #[error("Decryption failed: plaintext is not valid UTF-8")]
    NotText,

    #[error("Invalid transport encoding: {0}")]
    Encoding(String),

    #[error("Key agreement produced a degenerate shared secret")]
    KeyAgreement,
}

impl CryptoError {
    /// True for the per-message failures that a session recovers from
    /// with a placeholder, as opposed to fatal setup errors.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            CryptoError::PayloadTooShort
                | CryptoError::NotBlockAligned
                | CryptoError::InvalidPadding
                | CryptoError::NotText
                | CryptoError::Encoding(_)
        )
    }
}
