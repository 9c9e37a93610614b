//! Room key agreement.
//!
//! Each participant holds a static X25519 secret; the counterpart's
//! public key is supplied by the calling shell at session start. Both
//! sides run the same Diffie-Hellman and derive the room key with a
//! BLAKE3 derive-key step bound to the canonical room id, so the key
//! encrypting a message is the key the counterpart decrypts with.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::constants::KDF_CONTEXT_ROOM_KEY;
use crate::crypto::SymmetricKey;
use crate::error::CryptoError;
use crate::rooms::Room;

/// Generate a static X25519 secret for the local participant.
pub fn generate_static_secret() -> StaticSecret {
    StaticSecret::random_from_rng(OsRng)
}

/// Public half of a static secret, for publication to counterparts.
pub fn public_key(secret: &StaticSecret) -> PublicKey {
    PublicKey::from(secret)
}

/// Derive the shared symmetric key for `room`.
///
/// Symmetric in the participants: `agree(a_secret, b_public, room)` and
/// `agree(b_secret, a_public, room)` produce the same key because the DH
/// output is shared and the salt is the order-independent canonical id.
/// A non-contributory DH result (low-order counterpart key) is rejected.
pub fn agree_room_key(
    local_secret: &StaticSecret,
    remote_public: &PublicKey,
    room: &Room,
) -> Result<SymmetricKey, CryptoError> {
    let shared = local_secret.diffie_hellman(remote_public);
    if !shared.was_contributory() {
        return Err(CryptoError::KeyAgreement);
    }

    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_ROOM_KEY);
    hasher.update(shared.as_bytes());
    hasher.update(room.canonical_id().as_str().as_bytes());
    let hash = hasher.finalize();

    let mut key = [0u8; 32];
    key.copy_from_slice(&hash.as_bytes()[..32]);
    Ok(key)
}
