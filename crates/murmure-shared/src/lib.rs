//! # murmure-shared
//!
//! Cryptography and addressing primitives for the Murmure chat core:
//! the AES-256-CBC message cipher, the mirrored-room channel derivation
//! and the X25519 room key agreement. This crate is a leaf; it knows
//! nothing about the remote store or the session layer.

pub mod constants;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod rooms;
pub mod types;

pub use crypto::{CryptoEngine, CryptoProvider, SymmetricKey};
pub use error::CryptoError;
pub use rooms::Room;
pub use types::{ChannelId, UserId};
