use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::path::{EntryKey, StorePath};
use crate::store::{Entry, RemoteStore, Snapshot};

// Sentinel for "no injected failure pending".
const NO_FAILURE: usize = usize::MAX;

/// In-process [`RemoteStore`] used by tests and local development
/// shells.
///
/// Children are kept ordered by entry key, which for generated push
/// keys equals append order per writer. Every append fans the complete
/// snapshot out to all live subscribers of that path, mirroring the
/// hosted backend's full-snapshot listener semantics.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_countdown: AtomicUsize,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<StorePath, BTreeMap<EntryKey, Value>>,
    subscribers: Vec<(StorePath, mpsc::UnboundedSender<Snapshot>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_countdown: AtomicUsize::new(NO_FAILURE),
        }
    }

    /// Make the n-th upcoming append fail (1-based), then clear the
    /// switch. Lets tests exercise transport and partial-delivery paths.
    pub fn fail_nth_append(&self, n: usize) {
        self.fail_countdown.store(n, Ordering::SeqCst);
    }

    /// Ordered copy of everything stored under `path`.
    pub fn entries(&self, path: &StorePath) -> Snapshot {
        let inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(_) => return Vec::new(),
        };
        snapshot_of(&inner, path)
    }

    fn should_fail(&self) -> bool {
        // Single atomic step so concurrent appends cannot both observe
        // the trigger or both decrement past it.
        self.fail_countdown
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                match remaining {
                    NO_FAILURE | 0 => None,
                    1 => Some(NO_FAILURE),
                    n => Some(n - 1),
                }
            })
            .map(|previous| previous == 1)
            .unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_of(inner: &Inner, path: &StorePath) -> Snapshot {
    inner
        .entries
        .get(path)
        .map(|children| {
            children
                .iter()
                .map(|(key, value)| Entry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn notify(inner: &mut Inner, path: &StorePath) {
    let snapshot = snapshot_of(inner, path);
    // Dropped receivers are pruned here rather than on unsubscribe.
    inner
        .subscribers
        .retain(|(p, tx)| p != path || tx.send(snapshot.clone()).is_ok());
}

impl RemoteStore for MemoryStore {
    async fn append(&self, path: &StorePath, value: Value) -> Result<EntryKey, StoreError> {
        if self.should_fail() {
            warn!(path = %path, "Injected append failure");
            return Err(StoreError::Rejected("injected failure".into()));
        }

        let key = EntryKey::generate();
        let mut inner = self.inner.lock().map_err(|_| StoreError::Unavailable)?;
        inner
            .entries
            .entry(path.clone())
            .or_default()
            .insert(key.clone(), value);
        debug!(path = %path, key = %key, "Appended entry");

        notify(&mut inner, path);
        Ok(key)
    }

    fn subscribe(&self, path: &StorePath) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let Ok(mut inner) = self.inner.lock() else {
            // Poisoned store: hand back a closed receiver.
            return rx;
        };
        // Initial snapshot, then one per change.
        let _ = tx.send(snapshot_of(&inner, path));
        inner.subscribers.push((path.clone(), tx));
        debug!(path = %path, "Subscriber attached");
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmure_shared::types::ChannelId;
    use serde_json::json;

    fn messages_path() -> StorePath {
        StorePath::messages(&ChannelId("u2u1".into()))
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = MemoryStore::new();
        let path = messages_path();

        let first = store.append(&path, json!({ "n": 1 })).await.unwrap();
        let second = store.append(&path, json!({ "n": 2 })).await.unwrap();

        let entries = store.entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, first);
        assert_eq!(entries[1].key, second);
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_snapshot() {
        let store = MemoryStore::new();
        let path = messages_path();
        store.append(&path, json!({ "n": 1 })).await.unwrap();

        let mut rx = store.subscribe(&path);
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_pushes_full_snapshots() {
        let store = MemoryStore::new();
        let path = messages_path();
        let mut rx = store.subscribe(&path);

        assert!(rx.recv().await.unwrap().is_empty());

        store.append(&path, json!({ "n": 1 })).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().len(), 1);

        // Each event is the whole set, not a delta.
        store.append(&path, json!({ "n": 2 })).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_paths_are_isolated() {
        let store = MemoryStore::new();
        let ours = messages_path();
        let theirs = StorePath::messages(&ChannelId("u1u2".into()));
        let mut rx = store.subscribe(&ours);
        assert!(rx.recv().await.unwrap().is_empty());

        store.append(&theirs, json!({ "n": 1 })).await.unwrap();

        assert!(rx.try_recv().is_err());
        assert!(store.entries(&ours).is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = MemoryStore::new();
        let path = messages_path();

        store.fail_nth_append(1);
        assert!(store.append(&path, json!({})).await.is_err());
        assert!(store.append(&path, json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once_under_concurrency() {
        let store = MemoryStore::new();
        let path = messages_path();

        store.fail_nth_append(1);
        let (a, b) = tokio::join!(
            store.append(&path, json!({ "n": 1 })),
            store.append(&path, json!({ "n": 2 })),
        );

        assert_eq!(
            usize::from(a.is_err()) + usize::from(b.is_err()),
            1,
            "exactly one append must hit the injected failure"
        );
        assert_eq!(store.entries(&path).len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_skips_earlier_appends() {
        let store = MemoryStore::new();
        let path = messages_path();

        store.fail_nth_append(2);
        assert!(store.append(&path, json!({})).await.is_ok());
        assert!(store.append(&path, json!({})).await.is_err());
        assert!(store.append(&path, json!({})).await.is_ok());
    }
}
