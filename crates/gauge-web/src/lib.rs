//! gauge-web - Gauge page, counter stream and control endpoints.
//!
//! ```text
//! GET  /          → gauge page (HTML/JS)
//! GET  /stream    → SSE, `data: {"counter":N}` on every observed change
//! POST /reset     → counter := 0, 204
//! POST /shutdown  → process exits
//! GET  /metrics   → Prometheus text
//! GET  /static/*  → files from the configured static directory
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gauge_web::{run_server, ProcessExit, WebConfig};
//!
//! let store = CounterStore::new();
//! tokio::spawn(run_server(store.clone(), WebConfig::default(), Arc::new(ProcessExit)));
//! ```

mod config;
mod control;
mod error;
mod server;
mod stream;

pub use config::WebConfig;
pub use control::{ProcessExit, ShutdownHook};
pub use error::{WebError, WebResult};
pub use server::{create_router, run_server, serve, AppState};
pub use stream::{counter_events, ChangeDetector, SubscriberGuard, SubscriberTracker};
