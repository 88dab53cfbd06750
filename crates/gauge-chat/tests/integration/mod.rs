//! Integration tests for gauge-chat.
//!
//! These tests drive a real `ChatConnection` against an in-process IRC
//! server speaking over WebSocket.

pub mod common;
