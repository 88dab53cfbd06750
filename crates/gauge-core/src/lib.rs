//! Core domain types for the chat vote gauge.
//!
//! This crate provides the pieces shared by the chat listener and the web
//! server:
//! - `CounterStore`: the single shared vote counter
//! - `Vote`: the `+2` / `-2` chat parsing rule
//! - `needle_angle`: the saturating counter-to-degrees mapping
//! - `CounterUpdate`: the JSON frame pushed to stream subscribers

pub mod counter;
pub mod needle;
pub mod types;
pub mod vote;

pub use counter::CounterStore;
pub use needle::{needle_angle, GAUGE_SCALE, MAX_DEFLECTION_DEG};
pub use types::CounterUpdate;
pub use vote::Vote;
