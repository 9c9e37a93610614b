use x25519_dalek::{PublicKey, StaticSecret};

use murmure_shared::types::UserId;

/// Everything the calling shell supplies at session start.
///
/// The user identifiers come from the identity provider; the key
/// material feeds the X25519 room key agreement. How the counterpart's
/// public key reached this process (directory lookup, invite link,
/// QR scan) is the shell's concern, not the core's.
pub struct SessionConfig {
    /// The authenticated local user.
    pub local_user: UserId,
    /// The conversation counterpart.
    pub remote_user: UserId,
    /// The local user's static X25519 secret.
    pub local_secret: StaticSecret,
    /// The counterpart's static X25519 public key.
    pub remote_public: PublicKey,
}

impl SessionConfig {
    pub fn new(
        local_user: UserId,
        remote_user: UserId,
        local_secret: StaticSecret,
        remote_public: PublicKey,
    ) -> Self {
        Self {
            local_user,
            remote_user,
            local_secret,
            remote_public,
        }
    }
}
