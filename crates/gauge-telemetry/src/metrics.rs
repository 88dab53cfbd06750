//! Prometheus metrics for the chat vote gauge.
//!
//! Covers:
//! - Chat connection state and message throughput
//! - Votes by direction and the current counter value
//! - Counter resets
//! - Open stream subscribers
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a programming error and should crash on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, register_int_gauge, CounterVec,
    Encoder, Gauge, IntCounter, IntGauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// Chat connection state (1 = logged in and joined, 0 = disconnected).
pub static CHAT_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "gauge_chat_connected",
        "Chat connection state (1=connected)"
    )
    .unwrap()
});

/// Total chat messages received from the joined channel.
pub static CHAT_MESSAGES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gauge_chat_messages_total",
        "Total chat messages received"
    )
    .unwrap()
});

/// Votes applied to the counter.
/// Labels: direction (up/down)
pub static VOTES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gauge_votes_total",
        "Total votes applied to the counter",
        &["direction"]
    )
    .unwrap()
});

/// Current counter value.
pub static COUNTER_VALUE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("gauge_counter_value", "Current counter value").unwrap()
});

/// Total counter resets requested through the web UI.
pub static COUNTER_RESETS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("gauge_counter_resets_total", "Total counter resets").unwrap()
});

/// Open stream subscribers.
pub static STREAM_SUBSCRIBERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "gauge_stream_subscribers",
        "Currently connected stream subscribers"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record chat session established.
    pub fn chat_connected() {
        CHAT_CONNECTED.set(1.0);
    }

    /// Record chat session lost or closed.
    pub fn chat_disconnected() {
        CHAT_CONNECTED.set(0.0);
    }

    /// Record one inbound chat message.
    pub fn chat_message() {
        CHAT_MESSAGES_TOTAL.inc();
    }

    /// Record an applied vote and the counter value it produced.
    pub fn vote_applied(direction: &str, counter: i64) {
        VOTES_TOTAL.with_label_values(&[direction]).inc();
        COUNTER_VALUE.set(counter);
    }

    /// Record a counter reset.
    pub fn counter_reset() {
        COUNTER_RESETS_TOTAL.inc();
        COUNTER_VALUE.set(0);
    }

    /// Record a stream subscriber opening.
    pub fn subscriber_connected() {
        STREAM_SUBSCRIBERS.inc();
    }

    /// Record a stream subscriber closing.
    pub fn subscriber_disconnected() {
        STREAM_SUBSCRIBERS.dec();
    }

    /// Render all registered metrics in Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
