//! Counter stream for server-sent events.
//!
//! Every subscriber polls the shared counter on its own interval and emits
//! a frame only when the value differs from the last one it sent. A client
//! that connects late gets the current value, never a backlog of the
//! intermediate mutations.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use gauge_core::{CounterStore, CounterUpdate};
use gauge_telemetry::Metrics;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Remembers the last value sent to one subscriber.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_sent: Option<i64>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value if it should be sent, and records it as sent.
    pub fn observe(&mut self, value: i64) -> Option<i64> {
        if self.last_sent == Some(value) {
            return None;
        }
        self.last_sent = Some(value);
        Some(value)
    }
}

/// Counts open stream subscribers.
#[derive(Debug, Default)]
pub struct SubscriberTracker {
    current: AtomicUsize,
}

impl SubscriberTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it is released when the guard drops.
    pub fn acquire(self: &Arc<Self>) -> SubscriberGuard {
        let count = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Metrics::subscriber_connected();
        info!(subscribers = count, "Stream subscriber connected");
        SubscriberGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }
}

/// Keeps one subscriber counted while alive.
#[derive(Debug)]
pub struct SubscriberGuard {
    tracker: Arc<SubscriberTracker>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        let remaining = self.tracker.current.fetch_sub(1, Ordering::AcqRel) - 1;
        Metrics::subscriber_disconnected();
        info!(subscribers = remaining, "Stream subscriber disconnected");
    }
}

struct PollState {
    store: CounterStore,
    ticker: Interval,
    detector: ChangeDetector,
    _guard: Option<SubscriberGuard>,
}

/// Build the event stream for one subscriber.
///
/// The guard, if any, is dropped together with the stream, which happens
/// when the client disconnects.
pub fn counter_events(
    store: CounterStore,
    poll_interval: Duration,
    guard: Option<SubscriberGuard>,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = PollState {
        store,
        ticker,
        detector: ChangeDetector::new(),
        _guard: guard,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            state.ticker.tick().await;
            let Some(value) = state.detector.observe(state.store.read()) else {
                continue;
            };
            debug!(counter = value, "Pushing counter update");
            let event = Event::default().data(CounterUpdate::new(value).frame_data());
            return Some((Ok(event), state));
        }
    })
}
