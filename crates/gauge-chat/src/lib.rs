//! Twitch chat client for the chat vote gauge.
//!
//! Speaks IRC over a WebSocket:
//! - Login with an OAuth token, optional nick discovery via token validation
//! - Single channel join with membership confirmation
//! - Server `PING` answering and idle heartbeat with pong timeout
//! - Channel-based forwarding of chat lines to the application
//!
//! A lost session is reported to the caller as an error; nothing reconnects.

pub mod auth;
pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod irc;

pub use auth::{TokenInfo, TokenValidator, DEFAULT_VALIDATE_URL};
pub use connection::{
    ChatConnection, ChatEvent, ConnectionConfig, ConnectionState, DEFAULT_IRC_URL,
};
pub use error::{ChatError, ChatResult};
pub use irc::{ChatMessage, ClientCommand, IrcMessage, ServerEvent};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Install the process-wide rustls crypto provider.
/// Call once before any TLS connection is made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
