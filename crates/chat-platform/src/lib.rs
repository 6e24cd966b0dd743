//! Browser platform adapters.
//!
//! Implements the chat-core port traits on top of browser APIs via
//! wasm-bindgen: `fetch()` through gloo-net, WebSocket and IndexedDB
//! through web-sys, timers through gloo-timers.

pub mod download;
pub mod http;
pub mod socket;
pub mod spawn;
pub mod storage;
pub mod timer;
