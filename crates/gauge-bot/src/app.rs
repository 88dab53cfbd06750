//! Main application orchestration.
//!
//! Runs three tasks against one shared counter:
//! - Chat connection (single session, no reconnect)
//! - Vote listener (chat events to counter mutations)
//! - Web server (page, stream, control endpoints)
//!
//! The first task to stop takes the whole process down with it.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::listener::run_vote_listener;
use gauge_chat::{ChatConnection, ChatEvent, TokenValidator};
use gauge_core::CounterStore;
use gauge_telemetry::Metrics;
use gauge_web::{run_server, ProcessExit, ShutdownHook};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Chat event queue depth.
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// How long Ctrl-C waits for the chat socket to close.
const GRACEFUL_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Main application.
pub struct Application {
    config: AppConfig,
    store: CounterStore,
    shutdown_hook: Arc<dyn ShutdownHook>,
}

impl Application {
    /// Create a new application with a fresh counter.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: CounterStore::new(),
            shutdown_hook: Arc::new(ProcessExit),
        }
    }

    /// Replace the action behind `POST /shutdown`.
    pub fn with_shutdown_hook(mut self, hook: Arc<dyn ShutdownHook>) -> Self {
        self.shutdown_hook = hook;
        self
    }

    /// Handle to the shared counter.
    pub fn store(&self) -> CounterStore {
        self.store.clone()
    }

    /// Fill in the bot nick from the token owner when none is configured.
    pub async fn resolve_nick(&mut self) -> AppResult<()> {
        if !self.config.needs_nick_discovery() {
            info!(nick = %self.config.chat.nick, "Using configured nick");
            return Ok(());
        }

        info!(validate_url = %self.config.validate_url, "Discovering nick from token");
        let validator = TokenValidator::new(&self.config.validate_url)?;
        let info = validator.validate(&self.config.chat.token).await?;

        info!(nick = %info.login, user_id = %info.user_id, "Nick discovered");
        self.config.chat.nick = info.login;
        Ok(())
    }

    /// Run until a task stops or Ctrl-C is received.
    ///
    /// Returns `Ok` only for Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        self.resolve_nick().await?;

        info!(
            channel = %self.config.chat.channel,
            nick = %self.config.chat.nick,
            port = self.config.web.port,
            "Starting application"
        );

        let (event_tx, event_rx) = mpsc::channel::<ChatEvent>(EVENT_CHANNEL_CAPACITY);

        let connection = Arc::new(ChatConnection::new(self.config.chat.clone(), event_tx));
        let connection_clone = connection.clone();
        let mut chat_handle: JoinHandle<AppResult<()>> =
            tokio::spawn(async move { Ok(connection_clone.connect().await?) });

        let store = self.store.clone();
        let mut listener_handle: JoinHandle<AppResult<()>> = tokio::spawn(async move {
            run_vote_listener(store, event_rx).await;
            Ok(())
        });

        let store = self.store.clone();
        let web_config = self.config.web.clone();
        let hook = self.shutdown_hook.clone();
        let mut web_handle: JoinHandle<AppResult<()>> =
            tokio::spawn(async move { Ok(run_server(store, web_config, hook).await?) });

        let outcome = tokio::select! {
            result = &mut chat_handle => Err(task_failure("chat", result)),
            result = &mut listener_handle => Err(task_failure("listener", result)),
            result = &mut web_handle => Err(task_failure("web", result)),
            result = tokio::signal::ctrl_c() => match result {
                Err(e) => Err(AppError::Io(e)),
                Ok(()) => {
                    info!("Shutdown signal received");
                    connection.shutdown();
                    if tokio::time::timeout(GRACEFUL_CLOSE_TIMEOUT, &mut chat_handle)
                        .await
                        .is_err()
                    {
                        warn!("Chat connection did not close in time");
                    }
                    Ok(())
                }
            },
        };

        connection.shutdown();
        chat_handle.abort();
        listener_handle.abort();
        web_handle.abort();
        Metrics::chat_disconnected();

        match &outcome {
            Ok(()) => info!(counter = self.store.read(), "Shutting down"),
            Err(e) => error!(error = %e, counter = self.store.read(), "Task stopped, shutting down"),
        }
        outcome
    }
}

/// Map a finished task to the error that ends the process.
fn task_failure(task: &'static str, result: Result<AppResult<()>, JoinError>) -> AppError {
    match result {
        Ok(Err(e)) => e,
        Ok(Ok(())) => AppError::TaskExited {
            task,
            reason: "exited unexpectedly".to_string(),
        },
        Err(e) => AppError::TaskExited {
            task,
            reason: e.to_string(),
        },
    }
}
