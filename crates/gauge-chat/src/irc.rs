//! IRC message types for Twitch chat.
//!
//! Twitch speaks IRCv3 over the WebSocket: every text frame carries one or
//! more `\r\n` terminated lines of the form
//! `[@tags] [:prefix] COMMAND [params] [:trailing]`.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ChatError, ChatResult};

// ============================================================================
// Inbound
// ============================================================================

/// A parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    /// IRCv3 message tags (unescaped).
    pub tags: HashMap<String, String>,
    /// Source prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Command or three-digit numeric reply.
    pub command: String,
    /// Parameters; the trailing parameter, if any, is last.
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a single line. Trailing `\r\n` is ignored.
    pub fn parse(line: &str) -> ChatResult<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = HashMap::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped
                .split_once(' ')
                .ok_or_else(|| ChatError::Parse(format!("tags without command: {line}")))?;
            tags = parse_tags(raw_tags);
            rest = remainder.trim_start_matches(' ');
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw_prefix, remainder) = stripped
                .split_once(' ')
                .ok_or_else(|| ChatError::Parse(format!("prefix without command: {line}")))?;
            prefix = Some(raw_prefix.to_string());
            rest = remainder.trim_start_matches(' ');
        }

        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, remainder)) => (command, remainder),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(ChatError::Parse(format!("missing command: {line:?}")));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((param, remainder)) => {
                    params.push(param.to_string());
                    rest = remainder;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Self {
            tags,
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// Nickname part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        match prefix.split_once('!') {
            Some((nick, _)) => Some(nick),
            None if !prefix.contains('.') => Some(prefix),
            None => None,
        }
    }

    /// Last parameter, usually the trailing text.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Tag value by key. Empty values are treated as absent.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Classify into a server event.
    pub fn into_event(self) -> ServerEvent {
        match self.command.as_str() {
            "001" => ServerEvent::Welcome {
                nick: self.params.first().cloned().unwrap_or_default(),
            },
            "PING" => ServerEvent::Ping(self.trailing().unwrap_or_default().to_string()),
            "PONG" => ServerEvent::Pong,
            "RECONNECT" => ServerEvent::Reconnect,
            "JOIN" => ServerEvent::Join {
                nick: self.nick().unwrap_or_default().to_string(),
                channel: self
                    .params
                    .first()
                    .map(|c| normalize_channel(c))
                    .unwrap_or_default(),
            },
            "NOTICE" => {
                let text = self.trailing().unwrap_or_default().to_string();
                if is_auth_failure(&text) {
                    ServerEvent::AuthFailed(text)
                } else {
                    ServerEvent::Notice(text)
                }
            }
            "PRIVMSG" => match self.params.as_slice() {
                [channel, text] => ServerEvent::Message(ChatMessage {
                    channel: normalize_channel(channel),
                    sender: self.nick().unwrap_or_default().to_string(),
                    display_name: self.tag("display-name").map(str::to_string),
                    text: strip_action(text).to_string(),
                }),
                _ => ServerEvent::Other(self.command.clone()),
            },
            _ => ServerEvent::Other(self.command.clone()),
        }
    }
}

/// Server event relevant to the chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `001`: login accepted.
    Welcome { nick: String },
    /// Membership confirmation for a channel.
    Join { nick: String, channel: String },
    /// Server keepalive; must be answered with `PONG`.
    Ping(String),
    /// Answer to our own keepalive.
    Pong,
    /// A chat line in a joined channel.
    Message(ChatMessage),
    /// Login rejected.
    AuthFailed(String),
    /// Any other notice.
    Notice(String),
    /// Server is going away and asks clients to reconnect.
    Reconnect,
    /// Anything we do not act on.
    Other(String),
}

/// A chat line from the joined channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel name without `#`.
    pub channel: String,
    /// Sender login.
    pub sender: String,
    /// Sender display name, when the tags capability is active.
    pub display_name: Option<String>,
    /// Message content as typed.
    pub text: String,
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), unescape_tag_value(value)),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn is_auth_failure(text: &str) -> bool {
    text.contains("Login authentication failed")
        || text.contains("Improperly formatted auth")
        || text.contains("Login unsuccessful")
}

/// `/me` messages arrive wrapped as CTCP ACTION.
fn strip_action(text: &str) -> &str {
    text.strip_prefix("\u{1}ACTION ")
        .and_then(|t| t.strip_suffix('\u{1}'))
        .unwrap_or(text)
}

/// Channel name as used in logs and comparisons: lower case, no `#`.
pub fn normalize_channel(channel: &str) -> String {
    channel.trim().trim_start_matches('#').to_lowercase()
}

/// Token as sent in `PASS`, always with the `oauth:` prefix.
pub fn irc_password(token: &str) -> String {
    format!("oauth:{}", bare_token(token))
}

/// Token without the `oauth:` prefix, as used by the HTTP API.
pub fn bare_token(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix("oauth:").unwrap_or(token)
}

// ============================================================================
// Outbound
// ============================================================================

/// Client command sent to the server.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Request the tags and commands capabilities.
    CapReq,
    /// Credential; the token is redacted from `Debug` output.
    Pass(String),
    Nick(String),
    Join(String),
    Ping(String),
    Pong(String),
}

impl ClientCommand {
    /// Wire form without line terminator.
    pub fn to_line(&self) -> String {
        match self {
            Self::CapReq => "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string(),
            Self::Pass(token) => format!("PASS {}", irc_password(token)),
            Self::Nick(nick) => format!("NICK {}", nick.to_lowercase()),
            Self::Join(channel) => format!("JOIN #{}", normalize_channel(channel)),
            Self::Ping(arg) => format!("PING :{arg}"),
            Self::Pong(arg) => format!("PONG :{arg}"),
        }
    }
}

impl fmt::Debug for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(_) => f.write_str("Pass(<redacted>)"),
            other => f.write_str(&other.to_line()),
        }
    }
}
