use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use murmure_shared::constants::{CHATS_ROOT, MESSAGES_COLLECTION};
use murmure_shared::types::ChannelId;

/// Hierarchical location in the remote store, e.g. `chats/u2u1/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath(String);

impl StorePath {
    /// Message collection of one conversation channel.
    pub fn messages(channel: &ChannelId) -> Self {
        Self(format!(
            "{CHATS_ROOT}/{}/{MESSAGES_COLLECTION}",
            channel.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Process-wide tie-breaker for keys generated within one millisecond.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generated push key for one appended entry.
///
/// Zero-padded hex milliseconds, a process-wide monotonic sequence and
/// a random suffix: the sequence breaks ties within one millisecond, so
/// lexicographic order equals append order for a single writer, and the
/// random suffix keeps keys from concurrent writers from colliding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(String);

impl EntryKey {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{millis:012x}{seq:016x}-{}",
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
