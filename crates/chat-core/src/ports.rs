//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use chat_types::Result;

// ─── Backend Port ────────────────────────────────────────────

/// Request/response operations against the agent backend.
#[async_trait(?Send)]
pub trait BackendPort {
    /// Start a remote agent session, returning its id.
    async fn start_session(&self) -> Result<String>;

    /// Send one user message to a remote session and return the
    /// assistant's reply text.
    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
        image_paths: &[String],
        files: &[String],
    ) -> Result<String>;
}

// ─── Storage Port ────────────────────────────────────────────

/// Durable key-value substrate for persisted state.
#[async_trait(?Send)]
pub trait StoragePort {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Socket Port ─────────────────────────────────────────────

/// Opens streaming connections for the live channel.
///
/// `connect` returns synchronously with a handle; connection progress
/// (open, close, error, inbound frames) is reported through the
/// `ChannelSignals` queue the adapter was built with.
pub trait SocketPort {
    fn connect(&self, session_id: &str) -> Result<Box<dyn SocketHandle>>;
}

/// An open (or opening) connection. Dropped handles release their
/// underlying resources.
pub trait SocketHandle {
    fn send_text(&self, text: &str) -> Result<()>;

    fn close(&self);
}

// ─── Timer Port ──────────────────────────────────────────────

/// One-shot timers for reconnect backoff. Expiry is reported as
/// `ChannelSignal::ReconnectDue`.
pub trait TimerPort {
    fn schedule(&self, delay_ms: u32) -> Box<dyn TimerHandle>;
}

/// A pending timer. Dropping the handle cancels it.
pub trait TimerHandle {}

// ─── Spawn Port ──────────────────────────────────────────────

/// Runs a future on the single-threaded executor. The browser adapter
/// uses `wasm_bindgen_futures::spawn_local`; tests run futures inline.
pub trait SpawnPort {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>);
}
