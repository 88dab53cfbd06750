//! Scripted Twitch IRC server for supervisor tests.
//!
//! Accepts one login, confirms the join, sends the scripted chat lines and
//! then closes the socket.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub struct ScriptedIrcServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ScriptedIrcServer {
    /// Start a server that sends `lines` after the join and then closes.
    pub async fn start(lines: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(ws) = accept_async(stream).await else {
                return;
            };
            let (mut write, mut read) = ws.split();

            while let Some(Ok(msg)) = read.next().await {
                let Message::Text(text) = msg else {
                    continue;
                };
                for line in text.split("\r\n").filter(|l| !l.is_empty()) {
                    if let Some(nick) = line.strip_prefix("NICK ") {
                        let welcome = format!(":tmi.twitch.tv 001 {nick} :Welcome, GLHF!\r\n");
                        if write.send(Message::Text(welcome)).await.is_err() {
                            return;
                        }
                    } else if let Some(channel) = line.strip_prefix("JOIN ") {
                        let joined =
                            format!(":gaugebot!gaugebot@gaugebot.tmi.twitch.tv JOIN {channel}\r\n");
                        let _ = write.send(Message::Text(joined)).await;
                        for chat in &lines {
                            let _ = write.send(Message::Text(chat.clone())).await;
                        }
                        let _ = write.send(Message::Close(None)).await;
                        return;
                    }
                }
            }
        });

        Self { addr, handle }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }
}

impl Drop for ScriptedIrcServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
