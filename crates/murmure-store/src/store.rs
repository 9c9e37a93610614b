use std::future::Future;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::path::{EntryKey, StorePath};

/// One child entry under a store path.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: EntryKey,
    pub value: Value,
}

/// The complete, ordered child set under one path.
///
/// Every subscription event carries the whole set. Events are
/// authoritative and complete, never deltas; consumers rebuild their
/// state from each one.
pub type Snapshot = Vec<Entry>;

/// Path-addressable remote store.
///
/// Append-only from the core's perspective: values land under generated
/// unique keys and are never updated or deleted. Subscriptions are
/// push-based with at-least-once, full-snapshot delivery in
/// non-decreasing append order relative to a single writer; there is no
/// cross-client ordering guarantee.
pub trait RemoteStore: Send + Sync + 'static {
    /// Append `value` under a freshly generated unique key beneath `path`.
    fn append(
        &self,
        path: &StorePath,
        value: Value,
    ) -> impl Future<Output = Result<EntryKey, StoreError>> + Send;

    /// Subscribe to `path`. The receiver gets the current full snapshot
    /// immediately and the new full snapshot after every change, for as
    /// long as it is held.
    fn subscribe(&self, path: &StorePath) -> mpsc::UnboundedReceiver<Snapshot>;
}
