//! Chat connection.
//!
//! Owns one IRC-over-WebSocket session: login, channel join, keepalive and
//! forwarding of chat lines. There is no reconnect loop; any transport or
//! login failure ends the session with an error and the caller decides what
//! happens to the process.

use crate::error::{ChatError, ChatResult};
use crate::heartbeat::HeartbeatManager;
use crate::irc::{normalize_channel, ChatMessage, ClientCommand, IrcMessage, ServerEvent};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Default Twitch IRC WebSocket endpoint.
pub const DEFAULT_IRC_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Connection configuration.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL.
    pub url: String,
    /// Channel to join, with or without `#`.
    pub channel: String,
    /// Bot login name.
    pub nick: String,
    /// OAuth token, with or without the `oauth:` prefix.
    pub token: String,
    /// Idle time before we ping the server.
    pub heartbeat_interval_ms: u64,
    /// How long a ping may stay unanswered.
    pub heartbeat_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IRC_URL.to_string(),
            channel: String::new(),
            nick: String::new(),
            token: String::new(),
            heartbeat_interval_ms: 60_000,
            heartbeat_timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("channel", &self.channel)
            .field("nick", &self.nick)
            .field("token", &"<redacted>")
            .field("heartbeat_interval_ms", &self.heartbeat_interval_ms)
            .field("heartbeat_timeout_ms", &self.heartbeat_timeout_ms)
            .finish()
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Socket open, waiting for login and join confirmation.
    LoggingIn,
    /// Logged in and joined.
    Joined,
}

/// Event forwarded to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Login accepted and channel membership confirmed.
    Joined { nick: String, channel: String },
    /// A chat line in the joined channel.
    Message(ChatMessage),
}

/// One chat session against one channel.
pub struct ChatConnection {
    config: ConnectionConfig,
    channel: String,
    state: Arc<RwLock<ConnectionState>>,
    heartbeat: HeartbeatManager,
    event_tx: mpsc::Sender<ChatEvent>,
    shutdown_token: CancellationToken,
}

impl ChatConnection {
    pub fn new(config: ConnectionConfig, event_tx: mpsc::Sender<ChatEvent>) -> Self {
        let heartbeat =
            HeartbeatManager::new(config.heartbeat_interval_ms, config.heartbeat_timeout_ms);
        Self {
            channel: normalize_channel(&config.channel),
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            heartbeat,
            event_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Channel name without `#`.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Ask the session to close; `connect` then returns `Ok(())`.
    pub fn shutdown(&self) {
        info!("Chat connection shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect, log in, join, and run until the session ends.
    ///
    /// Returns `Ok(())` only after `shutdown`. Every other exit is an error.
    pub async fn connect(&self) -> ChatResult<()> {
        if self.is_shutdown() {
            return Ok(());
        }

        let result = self.run_session().await;
        *self.state.write() = ConnectionState::Disconnected;

        if let Err(e) = &result {
            error!(error = %e, channel = %self.channel, "Chat session ended");
        }
        result
    }

    async fn run_session(&self) -> ChatResult<()> {
        *self.state.write() = ConnectionState::Connecting;
        info!(url = %self.config.url, channel = %self.channel, "Connecting to chat");

        let (ws_stream, _response) = tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => return Ok(()),
            connected = connect_async_tls_with_config(&self.config.url, None, true, None) => {
                connected.map_err(|e| ChatError::ConnectionFailed(e.to_string()))?
            }
        };
        let (mut write, mut read) = ws_stream.split();

        *self.state.write() = ConnectionState::LoggingIn;
        self.heartbeat.reset();
        self.login(&mut write).await?;

        self.message_loop(&mut write, &mut read).await
    }

    async fn login(&self, write: &mut WsSink) -> ChatResult<()> {
        for command in [
            ClientCommand::CapReq,
            ClientCommand::Pass(self.config.token.clone()),
            ClientCommand::Nick(self.config.nick.clone()),
        ] {
            send(write, &command).await?;
        }
        debug!(nick = %self.config.nick, "Login sent");
        Ok(())
    }

    async fn message_loop(&self, write: &mut WsSink, read: &mut WsSource) -> ChatResult<()> {
        loop {
            tokio::select! {
                biased;

                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in chat loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            for line in text.split("\r\n").filter(|l| !l.is_empty()) {
                                self.handle_line(line, write).await?;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.heartbeat.record_pong();
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Chat socket closed by server");
                            return Err(ChatError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            return Err(ChatError::ConnectionClosed {
                                code: 1006,
                                reason: "stream ended".to_string(),
                            });
                        }
                        _ => {}
                    }
                }

                _ = self.heartbeat.wait_for_check() => {
                    if self.heartbeat.is_timed_out() {
                        return Err(ChatError::HeartbeatTimeout);
                    }
                    if self.heartbeat.should_send_heartbeat() {
                        send(write, &ClientCommand::Ping(self.config.nick.clone())).await?;
                        self.heartbeat.record_ping();
                        debug!("Sent heartbeat ping");
                    }
                }
            }
        }
    }

    async fn handle_line(&self, line: &str, write: &mut WsSink) -> ChatResult<()> {
        self.heartbeat.record_message();

        let message = match IrcMessage::parse(line) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Skipping unparsable line");
                return Ok(());
            }
        };

        match message.into_event() {
            ServerEvent::Welcome { nick } => {
                info!("Logged in as: {nick}");
                send(write, &ClientCommand::Join(self.channel.clone())).await?;
            }
            ServerEvent::Join { nick, channel } => {
                if nick.eq_ignore_ascii_case(&self.config.nick) && channel == self.channel {
                    *self.state.write() = ConnectionState::Joined;
                    info!(%channel, "Joined channel");
                    self.forward(ChatEvent::Joined { nick, channel }).await?;
                }
            }
            ServerEvent::Ping(arg) => {
                send(write, &ClientCommand::Pong(arg)).await?;
            }
            ServerEvent::Pong => self.heartbeat.record_pong(),
            ServerEvent::Message(chat) => {
                if chat.channel == self.channel {
                    self.forward(ChatEvent::Message(chat)).await?;
                }
            }
            ServerEvent::AuthFailed(reason) => return Err(ChatError::AuthFailed(reason)),
            ServerEvent::Notice(text) => warn!(%text, "Server notice"),
            ServerEvent::Reconnect => return Err(ChatError::ReconnectRequested),
            ServerEvent::Other(command) => trace!(%command, "Ignoring server command"),
        }

        Ok(())
    }

    async fn forward(&self, event: ChatEvent) -> ChatResult<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| ChatError::ReceiverDropped)
    }
}

async fn send(write: &mut WsSink, command: &ClientCommand) -> ChatResult<()> {
    trace!(?command, "Sending");
    write.send(Message::Text(command.to_line())).await?;
    Ok(())
}
