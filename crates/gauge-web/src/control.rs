//! Process control behind the shutdown endpoint.

use tracing::warn;

/// Action taken when the web UI asks the server to shut down.
#[cfg_attr(test, mockall::automock)]
pub trait ShutdownHook: Send + Sync {
    /// Stop the process. Production implementations do not return.
    fn trigger(&self);
}

/// Exits the process immediately with status 0.
///
/// Open streams and the chat session are abandoned, not drained.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ShutdownHook for ProcessExit {
    fn trigger(&self) {
        warn!("Shutdown requested via web UI, exiting now");
        std::process::exit(0);
    }
}
