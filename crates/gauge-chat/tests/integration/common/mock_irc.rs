//! Mock Twitch IRC server for integration tests.
//!
//! Accepts WebSocket connections and plays the server side of the login:
//! - `NICK` is answered with `001` (or an auth failure notice)
//! - `JOIN` is echoed back as membership confirmation
//! - `PING` is answered with `PONG`
//! - Every received line is recorded
//!
//! Tests push extra server lines or a close frame with `push` / `close`.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// How the server treats the login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBehavior {
    Accept,
    RejectAuth,
}

#[derive(Debug, Clone)]
enum Push {
    Text(String),
    Close,
}

/// A mock IRC-over-WebSocket server.
pub struct MockIrcServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    push_tx: broadcast::Sender<Push>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockIrcServer {
    /// Start a server on an available port.
    pub async fn start(behavior: LoginBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (push_tx, _) = broadcast::channel::<Push>(64);

        let received_clone = received.clone();
        let push_clone = push_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(
                            stream,
                            behavior,
                            received_clone.clone(),
                            push_clone.subscribe(),
                        ));
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            push_tx,
            received,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send a raw text frame (may contain several `\r\n` separated lines).
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.push_tx.send(Push::Text(text.into()));
    }

    /// Close every open connection with a close frame.
    pub fn close(&self) {
        let _ = self.push_tx.send(Push::Close);
    }

    /// All lines received from clients, in order.
    pub async fn received_lines(&self) -> Vec<String> {
        self.received.lock().await.clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    behavior: LoginBehavior,
    received: Arc<Mutex<Vec<String>>>,
    mut push_rx: broadcast::Receiver<Push>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {e}");
            return;
        }
    };
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => continue,
                };

                for line in text.split("\r\n").filter(|l| !l.is_empty()) {
                    received.lock().await.push(line.to_string());

                    if let Some(reply) = reply_to(line, behavior) {
                        if write.send(Message::Text(reply)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            push = push_rx.recv() => {
                match push {
                    Ok(Push::Text(text)) => {
                        if write.send(Message::Text(text)).await.is_err() {
                            return;
                        }
                    }
                    Ok(Push::Close) => {
                        let _ = write.send(Message::Close(None)).await;
                        return;
                    }
                    Err(_) => return,
                }
            }
        }
    }
}

fn reply_to(line: &str, behavior: LoginBehavior) -> Option<String> {
    if let Some(nick) = line.strip_prefix("NICK ") {
        return Some(match behavior {
            LoginBehavior::Accept => format!(
                ":tmi.twitch.tv 001 {nick} :Welcome, GLHF!\r\n:tmi.twitch.tv 376 {nick} :>\r\n"
            ),
            LoginBehavior::RejectAuth => {
                ":tmi.twitch.tv NOTICE * :Login authentication failed\r\n".to_string()
            }
        });
    }
    if let Some(channel) = line.strip_prefix("JOIN ") {
        return Some(format!(
            ":gaugebot!gaugebot@gaugebot.tmi.twitch.tv JOIN {channel}\r\n"
        ));
    }
    if let Some(arg) = line.strip_prefix("PING ") {
        return Some(format!(":tmi.twitch.tv PONG tmi.twitch.tv {arg}\r\n"));
    }
    None
}
