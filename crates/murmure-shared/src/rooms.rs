use crate::types::{ChannelId, UserId};

/// The mirrored channel pair for one two-party conversation.
///
/// Derived statelessly from the participant pair and recomputed at every
/// session start; rooms are never persisted as their own entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Channel this participant reads from: `remote || local`.
    pub local_channel: ChannelId,
    /// Channel the counterpart reads from: `local || remote`.
    pub remote_channel: ChannelId,
}

impl Room {
    /// Resolve the channel pair for `(local, remote)`.
    ///
    /// The remote-first ordering of `local_channel` is load-bearing: it
    /// makes A's local channel exactly B's remote channel, so a message
    /// appended to "the other party's mirror" lands where the other
    /// party's session reads. No server coordination, no lookup.
    pub fn resolve(local: &UserId, remote: &UserId) -> Room {
        Room {
            local_channel: ChannelId(format!("{}{}", remote.as_str(), local.as_str())),
            remote_channel: ChannelId(format!("{}{}", local.as_str(), remote.as_str())),
        }
    }

    /// Order-independent room label: the lexicographically smaller of the
    /// two channel ids. Both participants compute the same value, which
    /// makes it usable as a key-derivation salt.
    pub fn canonical_id(&self) -> &ChannelId {
        if self.local_channel <= self.remote_channel {
            &self.local_channel
        } else {
            &self.remote_channel
        }
    }
}
