/// Application name
pub const APP_NAME: &str = "Murmure";

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES block size in bytes; also the length of the IV prefixed to every
/// encrypted payload
pub const BLOCK_SIZE: usize = 16;

/// Key derivation context for per-room keys (BLAKE3)
pub const KDF_CONTEXT_ROOM_KEY: &str = "murmure-room-key-v1";

/// Root collection for conversation channels in the remote store
pub const CHATS_ROOT: &str = "chats";

/// Child collection holding the ordered messages of a channel
pub const MESSAGES_COLLECTION: &str = "messages";
