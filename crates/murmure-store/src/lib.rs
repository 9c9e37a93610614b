//! # murmure-store
//!
//! Abstraction over the remote ordered store backing Murmure
//! conversations: a path-addressable, hierarchical key-value store that
//! appends values under generated keys and pushes the full, ordered
//! child set to subscribers on every change. The core treats each
//! channel as an append-only log with at-least-once snapshot delivery.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and
//! local development shells; production shells plug in an adapter for
//! their hosted backend behind the same [`RemoteStore`] trait.

pub mod memory;
pub mod path;
pub mod record;
pub mod store;

mod error;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use path::{EntryKey, StorePath};
pub use record::MessageRecord;
pub use store::{Entry, RemoteStore, Snapshot};
