//! Chat client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Server requested reconnect")]
    ReconnectRequested,

    #[error("Heartbeat timeout")]
    HeartbeatTimeout,

    #[error("IRC parse error: {0}")]
    Parse(String),

    #[error("Event receiver dropped")]
    ReceiverDropped,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
