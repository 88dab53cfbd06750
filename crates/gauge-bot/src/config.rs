//! Application configuration.
//!
//! Everything comes from the process environment (after `.env` loading in
//! `main`). Channel and token are required; the rest has defaults.

use crate::error::{AppError, AppResult};
use gauge_chat::{ConnectionConfig, DEFAULT_IRC_URL, DEFAULT_VALIDATE_URL};
use gauge_web::WebConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_CHANNEL: &str = "TWITCH_CHANNEL";
pub const ENV_TOKEN: &str = "TWITCH_TOKEN";
pub const ENV_NICK: &str = "TWITCH_NICK";
pub const ENV_IRC_URL: &str = "TWITCH_IRC_URL";
pub const ENV_PORT: &str = "PORT";
pub const ENV_STATIC_DIR: &str = "GAUGE_STATIC_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "GAUGE_POLL_INTERVAL_MS";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chat session settings. `nick` is empty until discovered.
    pub chat: ConnectionConfig,
    /// Web server settings.
    pub web: WebConfig,
    /// Token validation endpoint used for nick discovery.
    pub validate_url: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let channel = get(ENV_CHANNEL)
            .ok_or_else(|| AppError::Config(format!("{ENV_CHANNEL} must be set")))?;
        let token =
            get(ENV_TOKEN).ok_or_else(|| AppError::Config(format!("{ENV_TOKEN} must be set")))?;

        let chat = ConnectionConfig {
            url: get(ENV_IRC_URL).unwrap_or_else(|| DEFAULT_IRC_URL.to_string()),
            channel,
            nick: get(ENV_NICK).unwrap_or_default(),
            token,
            ..Default::default()
        };

        let defaults = WebConfig::default();
        let web = WebConfig {
            port: parse_or(get(ENV_PORT), ENV_PORT, defaults.port)?,
            static_dir: get(ENV_STATIC_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            poll_interval_ms: parse_or(
                get(ENV_POLL_INTERVAL_MS),
                ENV_POLL_INTERVAL_MS,
                defaults.poll_interval_ms,
            )?,
        };

        let config = Self {
            chat,
            web,
            validate_url: DEFAULT_VALIDATE_URL.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply a command line port override.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.web.port = port;
        }
        self
    }

    /// Whether the bot nick must be discovered from the token.
    pub fn needs_nick_discovery(&self) -> bool {
        self.chat.nick.is_empty()
    }

    fn validate(&self) -> AppResult<()> {
        if self.web.poll_interval_ms == 0 {
            return Err(AppError::Config(format!(
                "{ENV_POLL_INTERVAL_MS} must be greater than 0"
            )));
        }
        if !self.chat.url.starts_with("ws://") && !self.chat.url.starts_with("wss://") {
            return Err(AppError::Config(format!(
                "{ENV_IRC_URL} must be a ws:// or wss:// URL, got {}",
                self.chat.url
            )));
        }
        Ok(())
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![(ENV_CHANNEL, "streamer"), (ENV_TOKEN, "abc123")]
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = AppConfig::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.chat.channel, "streamer");
        assert_eq!(config.chat.token, "abc123");
        assert_eq!(config.chat.url, DEFAULT_IRC_URL);
        assert!(config.needs_nick_discovery());
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.static_dir, PathBuf::from("static"));
        assert_eq!(config.web.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.validate_url, DEFAULT_VALIDATE_URL);
    }

    #[test]
    fn test_optional_values() {
        let mut pairs = minimal();
        pairs.extend([
            (ENV_NICK, "gaugebot"),
            (ENV_IRC_URL, "ws://127.0.0.1:9000"),
            (ENV_PORT, "9090"),
            (ENV_STATIC_DIR, "/srv/gauge"),
            (ENV_POLL_INTERVAL_MS, "25"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.chat.nick, "gaugebot");
        assert!(!config.needs_nick_discovery());
        assert_eq!(config.chat.url, "ws://127.0.0.1:9000");
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.static_dir, PathBuf::from("/srv/gauge"));
        assert_eq!(config.web.poll_interval_ms, 25);
    }

    #[test]
    fn test_missing_channel_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_TOKEN, "abc")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains(ENV_CHANNEL)));
    }

    #[test]
    fn test_blank_token_is_config_error() {
        let err =
            AppConfig::from_lookup(lookup(&[(ENV_CHANNEL, "streamer"), (ENV_TOKEN, "   ")]))
                .unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains(ENV_TOKEN)));
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let mut pairs = minimal();
        pairs.push((ENV_PORT, "eighty"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains(ENV_PORT)));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut pairs = minimal();
        pairs.push((ENV_POLL_INTERVAL_MS, "0"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_non_websocket_url_is_rejected() {
        let mut pairs = minimal();
        pairs.push((ENV_IRC_URL, "irc.chat.twitch.tv:6667"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_port_override() {
        let config = AppConfig::from_lookup(lookup(&minimal())).unwrap();
        assert_eq!(config.clone().with_port(None).web.port, 8080);
        assert_eq!(config.with_port(Some(3000)).web.port, 3000);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AppConfig::from_lookup(lookup(&minimal())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("abc123"));
    }
}
