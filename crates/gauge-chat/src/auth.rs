//! OAuth token validation.
//!
//! When no bot nick is configured, the login name is looked up from the
//! token itself via the Twitch validate endpoint. A rejected token fails
//! startup before any chat connection is attempted.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ChatError, ChatResult};
use crate::irc::bare_token;

/// Default validate endpoint.
pub const DEFAULT_VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Scope required to read chat over IRC.
const CHAT_READ_SCOPE: &str = "chat:read";

/// Validate endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    /// Login name of the token owner; used as the IRC nick.
    pub login: String,
    pub user_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Seconds until expiry.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Client for the token validate endpoint.
pub struct TokenValidator {
    client: Client,
    validate_url: String,
}

impl TokenValidator {
    pub fn new(validate_url: impl Into<String>) -> ChatResult<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self {
            client,
            validate_url: validate_url.into(),
        })
    }

    /// Validate a token and return its owner.
    ///
    /// Accepts tokens with or without the `oauth:` prefix.
    pub async fn validate(&self, token: &str) -> ChatResult<TokenInfo> {
        let response = self
            .client
            .get(&self.validate_url)
            .header("Authorization", format!("OAuth {}", bare_token(token)))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ChatError::AuthFailed(
                "token rejected by validate endpoint".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::ConnectionFailed(format!(
                "token validation returned HTTP {status}: {body}"
            )));
        }

        let info: TokenInfo = response.json().await?;

        if !info.scopes.is_empty() && !info.scopes.iter().any(|s| s == CHAT_READ_SCOPE) {
            warn!(
                login = %info.login,
                scopes = ?info.scopes,
                "Token lacks chat:read scope, joining may fail"
            );
        }
        info!(login = %info.login, expires_in = ?info.expires_in, "Token validated");

        Ok(info)
    }
}
