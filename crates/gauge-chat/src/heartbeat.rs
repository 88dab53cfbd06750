//! Chat connection liveness.
//!
//! Twitch pings idle clients on its own schedule, but a half-open TCP
//! connection would otherwise go unnoticed. When nothing has arrived for
//! `interval_ms` we send our own `PING` and expect a `PONG` within
//! `timeout_ms`.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct HeartbeatState {
    last_ping: Option<DateTime<Utc>>,
    last_message: DateTime<Utc>,
    waiting_for_pong: bool,
}

impl HeartbeatState {
    fn fresh() -> Self {
        Self {
            last_ping: None,
            last_message: Utc::now(),
            waiting_for_pong: false,
        }
    }
}

/// Heartbeat tracker for one chat connection.
pub struct HeartbeatManager {
    interval_ms: u64,
    timeout_ms: u64,
    state: RwLock<HeartbeatState>,
}

impl HeartbeatManager {
    pub fn new(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval_ms,
            timeout_ms,
            state: RwLock::new(HeartbeatState::fresh()),
        }
    }

    /// Reset on a new connection.
    pub fn reset(&self) {
        *self.state.write() = HeartbeatState::fresh();
    }

    pub fn record_ping(&self) {
        let mut state = self.state.write();
        state.last_ping = Some(Utc::now());
        state.waiting_for_pong = true;
    }

    pub fn record_pong(&self) {
        let now = Utc::now();
        let mut state = self.state.write();
        state.waiting_for_pong = false;
        state.last_message = now;

        if let Some(ping_time) = state.last_ping {
            debug!(rtt_ms = (now - ping_time).num_milliseconds(), "Received pong");
        }
    }

    /// Any inbound traffic counts as proof of life.
    pub fn record_message(&self) {
        self.state.write().last_message = Utc::now();
    }

    /// True once a ping has gone unanswered for longer than the timeout.
    pub fn is_timed_out(&self) -> bool {
        let state = self.state.read();
        match (state.waiting_for_pong, state.last_ping) {
            (true, Some(ping_time)) => {
                (Utc::now() - ping_time).num_milliseconds() > self.timeout_ms as i64
            }
            _ => false,
        }
    }

    pub fn time_since_last_message_ms(&self) -> i64 {
        (Utc::now() - self.state.read().last_message).num_milliseconds()
    }

    /// True when the line has been idle for a full interval and no ping is
    /// outstanding.
    pub fn should_send_heartbeat(&self) -> bool {
        if self.state.read().waiting_for_pong {
            return false;
        }
        self.time_since_last_message_ms() >= self.interval_ms as i64
    }

    /// Sleep until the next check is due.
    ///
    /// Checks run often enough to notice a missed pong within the timeout.
    pub async fn wait_for_check(&self) {
        let period = (self.interval_ms / 2).min(self.timeout_ms).max(1);
        tokio::time::sleep(Duration::from_millis(period)).await;
    }
}
