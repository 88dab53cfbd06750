//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat error: {0}")]
    Chat(#[from] gauge_chat::ChatError),

    #[error("Web server error: {0}")]
    Web(#[from] gauge_web::WebError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task {task} stopped: {reason}")]
    TaskExited { task: &'static str, reason: String },
}

pub type AppResult<T> = Result<T, AppError>;
