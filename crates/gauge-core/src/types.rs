//! Wire types shared with the browser page.

use serde::{Deserialize, Serialize};

/// Counter update pushed to stream subscribers.
///
/// Serializes as `{"counter": N}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterUpdate {
    /// Current counter value.
    pub counter: i64,
}

impl CounterUpdate {
    pub fn new(counter: i64) -> Self {
        Self { counter }
    }

    /// Payload of one stream frame, `{"counter": N}` with a space after the colon.
    pub fn frame_data(&self) -> String {
        format!("{{\"counter\": {}}}", self.counter)
    }
}
