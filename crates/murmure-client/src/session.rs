use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use murmure_shared::crypto::{self, CryptoEngine, CryptoProvider};
use murmure_shared::keys;
use murmure_shared::rooms::Room;
use murmure_shared::types::UserId;
use murmure_store::{Entry, MessageRecord, RemoteStore, Snapshot, StorePath};

use crate::config::SessionConfig;
use crate::error::{SendError, SessionError};
use crate::view::{classify, Direction, MessageBody, MessageView};

/// Outcome of a successful [`ChatSession::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was appended to both mirrored channels.
    Delivered,
    /// Input was empty after trimming; nothing was appended anywhere.
    Nothing,
}

/// One open conversation between the local user and one counterpart.
///
/// Opening a session resolves the mirrored room, derives the shared
/// room key and subscribes to the local channel; the session is Active
/// when [`ChatSession::open`] returns. Closing it tears the
/// subscription down before the key is dropped with the session, and
/// rejects further sends.
pub struct ChatSession<S: RemoteStore> {
    store: Arc<S>,
    engine: Arc<CryptoEngine>,
    local_user: UserId,
    room: Room,
    local_path: StorePath,
    remote_path: StorePath,
    views_rx: watch::Receiver<Arc<Vec<MessageView>>>,
    sync_task: JoinHandle<()>,
    closed: Arc<AtomicBool>,
}

impl<S: RemoteStore> ChatSession<S> {
    /// Open a conversation with the counterpart named in `config`.
    ///
    /// The subscription to the local channel is established before this
    /// returns, so no snapshot published afterwards can be missed.
    pub async fn open(config: SessionConfig, store: Arc<S>) -> Result<Self, SessionError> {
        if config.local_user.is_empty() || config.remote_user.is_empty() {
            return Err(SessionError::EmptyUserId);
        }

        let provider = CryptoProvider::global()?;
        let room = Room::resolve(&config.local_user, &config.remote_user);
        let key = keys::agree_room_key(&config.local_secret, &config.remote_public, &room)?;
        let engine = Arc::new(CryptoEngine::new(provider, key));

        let local_path = StorePath::messages(&room.local_channel);
        let remote_path = StorePath::messages(&room.remote_channel);

        let snapshots = store.subscribe(&local_path);
        let (views_tx, views_rx) = watch::channel(Arc::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let sync_task = tokio::spawn(sync_loop(
            snapshots,
            Arc::clone(&engine),
            views_tx,
            Arc::clone(&closed),
        ));

        info!(
            local = %config.local_user,
            remote = %config.remote_user,
            channel = %room.local_channel,
            key_fp = %engine.key_fingerprint(),
            "Chat session opened"
        );

        Ok(Self {
            store,
            engine,
            local_user: config.local_user,
            room,
            local_path,
            remote_path,
            views_rx,
            sync_task,
            closed,
        })
    }

    /// Encrypt `text` and append it to both mirrored channels, local
    /// channel first. The mirror append only runs once the primary has
    /// been confirmed; a mirror failure is reported as
    /// [`SendError::PartialDelivery`], never folded into total failure.
    ///
    /// Empty input after trimming is a silent no-op.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, SendError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SendError::Closed);
        }
        if text.trim().is_empty() {
            debug!("Ignoring empty message");
            return Ok(SendOutcome::Nothing);
        }

        let payload = self.engine.encrypt(text);
        let record = MessageRecord::new(
            crypto::encode_payload(&payload),
            self.local_user.clone(),
        );
        let value = record.to_value()?;

        let primary = self.store.append(&self.local_path, value.clone()).await?;
        debug!(key = %primary, channel = %self.room.local_channel, "Appended to local channel");

        match self.store.append(&self.remote_path, value).await {
            Ok(mirror) => {
                debug!(key = %mirror, channel = %self.room.remote_channel, "Appended to mirror channel");
                Ok(SendOutcome::Delivered)
            }
            Err(source) => {
                warn!(
                    primary = %primary,
                    error = %source,
                    "Mirror append failed; message visible locally but not delivered"
                );
                Err(SendError::PartialDelivery { primary, source })
            }
        }
    }

    /// Renderer subscription point. Every observed value is a complete,
    /// atomically swapped render list; a reader can never see a
    /// partially rebuilt one.
    pub fn updates(&self) -> watch::Receiver<Arc<Vec<MessageView>>> {
        self.views_rx.clone()
    }

    /// The current render list.
    pub fn messages(&self) -> Arc<Vec<MessageView>> {
        Arc::clone(&self.views_rx.borrow())
    }

    /// Sent/received split for one rendered message, recomputed per call.
    pub fn classify(&self, view: &MessageView) -> Direction {
        classify(&self.local_user, view)
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tear down the subscription and stop accepting sends. Idempotent.
    /// Snapshot events arriving after this point are discarded.
    pub fn close(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.sync_task.abort();
        info!(channel = %self.room.local_channel, "Chat session closed");
    }
}

impl<S: RemoteStore> Drop for ChatSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consume full-snapshot events and publish the rebuilt render list as
/// a single swap per event.
async fn sync_loop(
    mut snapshots: mpsc::UnboundedReceiver<Snapshot>,
    engine: Arc<CryptoEngine>,
    views_tx: watch::Sender<Arc<Vec<MessageView>>>,
    closed: Arc<AtomicBool>,
) {
    while let Some(snapshot) = snapshots.recv().await {
        if closed.load(Ordering::SeqCst) {
            break;
        }
        let views = decrypt_snapshot(&engine, &snapshot);
        debug!(count = views.len(), "Publishing rebuilt message list");
        if views_tx.send(Arc::new(views)).is_err() {
            break;
        }
    }
    debug!("Sync loop ended");
}

/// Full decryption pass over one snapshot, preserving store order.
/// Decryption is idempotent, so rebuilding from scratch on every event
/// is safe under at-least-once delivery.
fn decrypt_snapshot(engine: &CryptoEngine, snapshot: &Snapshot) -> Vec<MessageView> {
    snapshot
        .iter()
        .map(|entry| decrypt_entry(engine, entry))
        .collect()
}

/// Decrypt one entry. Failures stay local to the entry: the view gets
/// an [`MessageBody::Undecryptable`] body and the pass continues.
fn decrypt_entry(engine: &CryptoEngine, entry: &Entry) -> MessageView {
    let record = match MessageRecord::from_value(&entry.value) {
        Ok(record) => record,
        Err(e) => {
            warn!(key = %entry.key, error = %e, "Malformed message record");
            return MessageView {
                sender: UserId::new(""),
                body: MessageBody::Undecryptable,
            };
        }
    };

    let body = crypto::decode_payload(&record.message)
        .and_then(|payload| engine.decrypt(&payload))
        .map(MessageBody::Text)
        .unwrap_or_else(|e| {
            warn!(key = %entry.key, error = %e, "Failed to decrypt message");
            MessageBody::Undecryptable
        });

    MessageView {
        sender: record.sender_id,
        body,
    }
}
