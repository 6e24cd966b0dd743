//! Live channel: the streaming connection to the bound backend session.
//!
//! Modeled as an explicit state machine driven by `ChannelSignal`s so the
//! reconnect/backoff logic is unit-testable without a socket: platform
//! adapters push signals into a shared `ChannelSignals` queue, and the
//! app drains the queue into `LiveChannel::handle` each frame. Rebinding
//! happens through an explicit `bind` call whenever the bound backend
//! session id changes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chat_types::event::ChatEvent;
use chat_types::frame::{InboundFrame, OutboundFrame};
use chat_types::message::Message;
use chat_types::{ChatError, Result};

use crate::event_bus::EventBus;
use crate::ports::{SocketHandle, SocketPort, TimerHandle, TimerPort};
use crate::store::SessionStore;

/// Reconnects stop permanently once this many attempts failed without a
/// successful open in between (until the bound id changes again).
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

const BASE_RECONNECT_DELAY_MS: u64 = 1000;
const MAX_RECONNECT_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No backend session id is bound
    Idle,
    /// A connection attempt is in progress
    Connecting,
    /// The connection is established
    Open,
    /// Waiting for the backoff timer before the next attempt
    Reconnecting,
    /// Gave up after `MAX_RECONNECT_ATTEMPTS`; only a rebind recovers
    Failed,
}

/// What the platform adapters report back to the state machine.
#[derive(Debug, Clone)]
pub enum ChannelSignal {
    Opened,
    Closed,
    Error(String),
    Frame(String),
    ReconnectDue,
}

/// Shared signal queue: the channel's counterpart to the event bus.
#[derive(Clone, Default)]
pub struct ChannelSignals {
    inner: Rc<RefCell<VecDeque<ChannelSignal>>>,
}

impl ChannelSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, signal: ChannelSignal) {
        self.inner.borrow_mut().push_back(signal);
    }

    pub fn drain(&self) -> Vec<ChannelSignal> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

pub struct LiveChannel {
    store: Rc<RefCell<SessionStore>>,
    socket: Rc<dyn SocketPort>,
    timers: Rc<dyn TimerPort>,
    bus: EventBus,
    state: ChannelState,
    bound_id: Option<String>,
    attempts: u32,
    connection: Option<Box<dyn SocketHandle>>,
    reconnect_timer: Option<Box<dyn TimerHandle>>,
}

impl LiveChannel {
    pub fn new(
        store: Rc<RefCell<SessionStore>>,
        socket: Rc<dyn SocketPort>,
        timers: Rc<dyn TimerPort>,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            socket,
            timers,
            bus,
            state: ChannelState::Idle,
            bound_id: None,
            attempts: 0,
            connection: None,
            reconnect_timer: None,
        }
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Re-bind to a backend session id. On change, the existing
    /// connection is closed and any pending reconnect timer cancelled
    /// before a new attempt starts; an unchanged id is a no-op.
    pub fn bind(&mut self, backend_id: Option<String>) {
        if backend_id == self.bound_id {
            return;
        }
        self.teardown();
        self.attempts = 0;
        self.bound_id = backend_id;
        match self.bound_id.clone() {
            Some(id) => {
                log::info!("Live channel binding to backend session {}", id);
                self.open_socket(&id);
            }
            None => {
                self.state = ChannelState::Idle;
            }
        }
    }

    /// Process one signal from the platform adapters.
    pub fn handle(&mut self, signal: ChannelSignal) {
        match signal {
            ChannelSignal::Opened => {
                log::info!("Live channel connected");
                self.attempts = 0;
                self.state = ChannelState::Open;
                self.bus.emit(ChatEvent::ChannelOpen);
            }
            ChannelSignal::Closed => {
                self.bus.emit(ChatEvent::ChannelClosed);
                self.on_disconnect();
            }
            ChannelSignal::Error(message) => {
                log::warn!("Live channel error: {}", message);
                self.on_disconnect();
            }
            ChannelSignal::Frame(text) => self.on_frame(&text),
            ChannelSignal::ReconnectDue => {
                self.reconnect_timer = None;
                if let Some(id) = self.bound_id.clone() {
                    log::info!("Live channel reconnect attempt {}", self.attempts);
                    self.open_socket(&id);
                }
            }
        }
    }

    /// Send an outbound frame. Dropped with an error when the channel is
    /// not open; the request/response send path does not depend on this.
    pub fn send(&self, content: &str) -> Result<()> {
        let Some(connection) = &self.connection else {
            return Err(ChatError::Channel("not connected".to_string()));
        };
        if self.state != ChannelState::Open {
            log::warn!("Live channel not open; dropping outbound message");
            return Err(ChatError::Channel("not open".to_string()));
        }
        let frame = serde_json::to_string(&OutboundFrame::Message {
            content: content.to_string(),
        })?;
        connection.send_text(&frame)
    }

    // ─── Internals ───────────────────────────────────────────

    fn open_socket(&mut self, backend_id: &str) {
        if let Some(old) = self.connection.take() {
            old.close();
        }
        match self.socket.connect(backend_id) {
            Ok(handle) => {
                self.connection = Some(handle);
                self.state = ChannelState::Connecting;
            }
            Err(e) => {
                log::warn!("Live channel connect failed: {}", e);
                self.schedule_reconnect();
            }
        }
    }

    fn on_disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        if self.bound_id.is_none() {
            self.state = ChannelState::Idle;
            return;
        }
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if self.attempts >= MAX_RECONNECT_ATTEMPTS {
            log::error!("Live channel: max reconnect attempts reached, giving up");
            self.state = ChannelState::Failed;
            self.bus.emit(ChatEvent::ChannelGaveUp);
            return;
        }
        let delay_ms = (BASE_RECONNECT_DELAY_MS << self.attempts).min(MAX_RECONNECT_DELAY_MS);
        log::info!(
            "Live channel reconnecting in {}ms (attempt {})",
            delay_ms,
            self.attempts + 1
        );
        self.reconnect_timer = Some(self.timers.schedule(delay_ms as u32));
        self.attempts += 1;
        self.state = ChannelState::Reconnecting;
    }

    fn on_frame(&mut self, text: &str) {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(InboundFrame::AgentResponse { content }) => self.append_assistant_reply(content),
            Ok(InboundFrame::ToolStart { tool }) => {
                self.bus.emit(ChatEvent::ToolActivity {
                    tool,
                    detail: "started".to_string(),
                });
            }
            Ok(InboundFrame::ToolResult { tool, output }) => {
                self.bus.emit(ChatEvent::ToolActivity {
                    tool,
                    detail: output,
                });
            }
            Ok(InboundFrame::Error { message }) => {
                log::warn!("Live channel server error: {}", message);
                self.bus.emit(ChatEvent::Error { message });
            }
            Err(e) => {
                log::warn!("Discarding malformed channel frame: {}", e);
            }
        }
    }

    /// Append an assistant reply to the current session, read-modify-write
    /// against the latest message list so a concurrent dispatcher append
    /// is never dropped.
    fn append_assistant_reply(&self, content: String) {
        let mut store = self.store.borrow_mut();
        let Some(session) = store.current_session() else {
            log::warn!("agent_response with no current session, discarding");
            return;
        };
        let session_id = session.id.clone();
        let mut messages = session.messages.clone();
        messages.push(Message::assistant(content));
        store.update(&session_id, messages, None);
        drop(store);
        self.bus.emit(ChatEvent::AssistantReply { session_id });
    }

    fn teardown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        // Dropping the handle cancels the pending timer
        self.reconnect_timer = None;
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.teardown();
    }
}
