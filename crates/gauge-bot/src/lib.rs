//! Twitch chat vote gauge.
//!
//! One process that:
//! - Joins a Twitch channel and counts `+2` / `-2` votes
//! - Serves a gauge page that follows the counter over server-sent events
//! - Lets the page reset the counter or stop the process

pub mod app;
pub mod config;
pub mod error;
pub mod listener;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use listener::{apply_chat_message, run_vote_listener};
