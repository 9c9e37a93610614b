//! # murmure-client
//!
//! Session orchestration for the Murmure chat core. A [`ChatSession`]
//! owns one conversation: it derives the mirrored room, agrees on the
//! room key, appends encrypted messages to both channel mirrors and
//! turns incoming store snapshots into an atomically swapped list of
//! decrypted view-models for the rendering layer.

pub mod config;
pub mod error;
pub mod session;
pub mod view;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::SessionConfig;
pub use error::{SendError, SessionError};
pub use session::{ChatSession, SendOutcome};
pub use view::{classify, Direction, MessageBody, MessageView};

/// Install the default tracing subscriber for a consuming shell.
/// Call once at process start; honours `RUST_LOG` when set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("murmure_client=debug,murmure_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
