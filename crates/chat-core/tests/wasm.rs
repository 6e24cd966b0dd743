//! WASM-target tests for chat-core.
//!
//! Runs EventBus, SessionStore, persistence codec, and LiveChannel tests
//! under wasm32-unknown-unknown via `wasm-pack test --node`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use wasm_bindgen_test::*;

use chat_core::channel::{ChannelSignal, ChannelState, LiveChannel, MAX_RECONNECT_ATTEMPTS};
use chat_core::dispatcher::{MessageDispatcher, FALLBACK_REPLY};
use chat_core::event_bus::EventBus;
use chat_core::lifecycle::SessionLifecycle;
use chat_core::persist;
use chat_core::ports::*;
use chat_core::store::SessionStore;
use chat_types::event::ChatEvent;
use chat_types::message::Message;
use chat_types::{ChatError, Result};

// ─── Mock ports ──────────────────────────────────────────

#[derive(Default)]
struct MockStorage {
    data: RefCell<HashMap<String, Vec<u8>>>,
}

#[async_trait(?Send)]
impl StoragePort for MockStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct WasmSpawner;

impl SpawnPort for WasmSpawner {
    fn spawn_local(&self, fut: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(fut);
    }
}

struct MockBackend {
    fail_send: Cell<bool>,
    start_calls: Cell<usize>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            fail_send: Cell::new(false),
            start_calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl BackendPort for MockBackend {
    async fn start_session(&self) -> Result<String> {
        self.start_calls.set(self.start_calls.get() + 1);
        Ok(format!("backend-{}", self.start_calls.get()))
    }

    async fn send_message(
        &self,
        _session_id: &str,
        content: &str,
        _image_paths: &[String],
        _files: &[String],
    ) -> Result<String> {
        if self.fail_send.get() {
            return Err(ChatError::Backend("synthetic failure".to_string()));
        }
        Ok(format!("echo: {}", content))
    }
}

#[derive(Default)]
struct SocketLog {
    connects: RefCell<Vec<String>>,
    closes: Cell<usize>,
}

struct MockSocket {
    log: Rc<SocketLog>,
}

impl SocketPort for MockSocket {
    fn connect(&self, session_id: &str) -> Result<Box<dyn SocketHandle>> {
        self.log.connects.borrow_mut().push(session_id.to_string());
        Ok(Box::new(MockSocketHandle {
            log: self.log.clone(),
        }))
    }
}

struct MockSocketHandle {
    log: Rc<SocketLog>,
}

impl SocketHandle for MockSocketHandle {
    fn send_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn close(&self) {
        self.log.closes.set(self.log.closes.get() + 1);
    }
}

#[derive(Default)]
struct TimerLog {
    scheduled: RefCell<Vec<u32>>,
}

struct MockTimers {
    log: Rc<TimerLog>,
}

impl TimerPort for MockTimers {
    fn schedule(&self, delay_ms: u32) -> Box<dyn TimerHandle> {
        self.log.scheduled.borrow_mut().push(delay_ms);
        Box::new(NoopTimerHandle)
    }
}

struct NoopTimerHandle;

impl TimerHandle for NoopTimerHandle {}

fn test_store() -> (Rc<RefCell<SessionStore>>, EventBus) {
    let bus = EventBus::new();
    let store = SessionStore::new(
        Rc::new(MockStorage::default()),
        Rc::new(WasmSpawner),
        bus.clone(),
    );
    (Rc::new(RefCell::new(store)), bus)
}

// ─── EventBus Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn event_bus_emit_and_drain() {
    let bus = EventBus::new();
    bus.emit(ChatEvent::StoreChanged);
    assert!(bus.has_pending());
    assert_eq!(bus.drain().len(), 1);
    assert!(!bus.has_pending());
}

// ─── Session Store Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn store_create_sets_current() {
    let (store, _bus) = test_store();
    let id = store
        .borrow_mut()
        .create(Message::user("hello"), Some("backend-1".to_string()));
    assert_eq!(store.borrow().current_id(), Some(id.as_str()));
    assert_eq!(store.borrow().bound_backend_id().as_deref(), Some("backend-1"));
}

#[wasm_bindgen_test]
fn store_delete_current_clears_selection() {
    let (store, _bus) = test_store();
    let id = store.borrow_mut().create(Message::user("hello"), None);
    store.borrow_mut().delete(&id);
    assert_eq!(store.borrow().current_id(), None);
}

#[wasm_bindgen_test]
fn store_set_current_unknown_is_noop() {
    let (store, _bus) = test_store();
    let id = store.borrow_mut().create(Message::user("hello"), None);
    store.borrow_mut().set_current(Some("missing".to_string()));
    assert_eq!(store.borrow().current_id(), Some(id.as_str()));
}

// ─── Persistence Codec Tests ─────────────────────────────

#[wasm_bindgen_test]
fn persist_roundtrip() {
    let session = chat_types::session::Session::new(Message::user("hi"), None);
    let id = session.id.clone();
    let bytes = persist::encode(&[session], &Some(id.clone()), &None).unwrap();
    let decoded = persist::decode(&bytes).unwrap();
    assert_eq!(decoded.sessions.len(), 1);
    assert_eq!(decoded.current_session_id.as_deref(), Some(id.as_str()));
}

#[wasm_bindgen_test]
fn persist_v0_payload_migrates() {
    let raw = br#"{"sessions":[{"id":"s1","title":"t","messages":[]}],"currentSessionId":"s1"}"#;
    let decoded = persist::decode(raw).unwrap();
    assert_eq!(decoded.sessions.len(), 1);
    assert!(decoded.backend_session_id.is_none());
}

// ─── Lifecycle / Dispatcher Tests ────────────────────────

#[wasm_bindgen_test]
async fn dispatcher_first_send_creates_session() {
    let backend = Rc::new(MockBackend::new());
    let (store, bus) = test_store();
    let lifecycle = Rc::new(SessionLifecycle::new(backend.clone(), store.clone()));
    let dispatcher = MessageDispatcher::new(store.clone(), lifecycle, backend, bus);

    dispatcher.send("hello", Vec::new(), Vec::new()).await.unwrap();

    let store = store.borrow();
    let session = store.current_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].content, "echo: hello");
    assert_eq!(session.backend_session_id.as_deref(), Some("backend-1"));
}

#[wasm_bindgen_test]
async fn dispatcher_send_failure_appends_fallback() {
    let backend = Rc::new(MockBackend::new());
    backend.fail_send.set(true);
    let (store, bus) = test_store();
    let lifecycle = Rc::new(SessionLifecycle::new(backend.clone(), store.clone()));
    let dispatcher = MessageDispatcher::new(store.clone(), lifecycle, backend, bus);

    dispatcher.send("hello", Vec::new(), Vec::new()).await.unwrap();

    let store = store.borrow();
    let session = store.current_session().unwrap();
    assert_eq!(session.messages[1].content, FALLBACK_REPLY);
}

#[wasm_bindgen_test]
async fn lifecycle_returns_bound_id_without_backend_call() {
    let backend = Rc::new(MockBackend::new());
    let (store, _bus) = test_store();
    let id = store
        .borrow_mut()
        .create(Message::user("hi"), Some("backend-9".to_string()));
    let lifecycle = SessionLifecycle::new(backend.clone(), store);

    let result = lifecycle.ensure_backend_session(&id).await.unwrap();
    assert_eq!(result, "backend-9");
    assert_eq!(backend.start_calls.get(), 0);
}

// ─── Live Channel Tests ──────────────────────────────────

#[wasm_bindgen_test]
fn channel_backoff_and_give_up() {
    let (store, bus) = test_store();
    let socket_log = Rc::new(SocketLog::default());
    let timer_log = Rc::new(TimerLog::default());
    let mut channel = LiveChannel::new(
        store,
        Rc::new(MockSocket {
            log: socket_log.clone(),
        }),
        Rc::new(MockTimers {
            log: timer_log.clone(),
        }),
        bus,
    );

    channel.bind(Some("backend-1".to_string()));
    for _ in 0..MAX_RECONNECT_ATTEMPTS {
        channel.handle(ChannelSignal::Closed);
        channel.handle(ChannelSignal::ReconnectDue);
    }
    assert_eq!(
        *timer_log.scheduled.borrow(),
        vec![1000, 2000, 4000, 8000, 10000]
    );

    channel.handle(ChannelSignal::Closed);
    assert_eq!(*channel.state(), ChannelState::Failed);
    assert_eq!(timer_log.scheduled.borrow().len(), 5);
}

#[wasm_bindgen_test]
fn channel_agent_response_appends() {
    let (store, bus) = test_store();
    let id = store
        .borrow_mut()
        .create(Message::user("hi"), Some("backend-1".to_string()));
    let mut channel = LiveChannel::new(
        store.clone(),
        Rc::new(MockSocket {
            log: Rc::new(SocketLog::default()),
        }),
        Rc::new(MockTimers {
            log: Rc::new(TimerLog::default()),
        }),
        bus,
    );

    channel.handle(ChannelSignal::Frame(
        r#"{"type":"agent_response","content":"live"}"#.to_string(),
    ));
    assert_eq!(store.borrow().session(&id).unwrap().messages.len(), 2);
}
