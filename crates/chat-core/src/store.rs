//! Session store: the single authoritative collection of sessions plus
//! the current selection.
//!
//! The store is explicitly constructed and dependency-injected (never a
//! module-level global). Every mutation emits `ChatEvent::StoreChanged`
//! and writes a snapshot through the persistence codec; the write is
//! ordered after the mutation but the store never waits for it.

use std::rc::Rc;

use chrono::{DateTime, Utc};

use chat_types::event::ChatEvent;
use chat_types::message::Message;
use chat_types::session::{derive_title, AgeBucket, Session, SessionListEntry, UNTITLED};

use crate::event_bus::EventBus;
use crate::persist::{self, DecodedState};
use crate::ports::{SpawnPort, StoragePort};

pub struct SessionStore {
    sessions: Vec<Session>,
    current_id: Option<String>,
    /// Backend session id the live channel binds to: the current
    /// session's remote id, or one pre-provisioned for a new chat.
    backend_session_id: Option<String>,
    storage: Rc<dyn StoragePort>,
    spawner: Rc<dyn SpawnPort>,
    bus: EventBus,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn StoragePort>, spawner: Rc<dyn SpawnPort>, bus: EventBus) -> Self {
        Self {
            sessions: Vec::new(),
            current_id: None,
            backend_session_id: None,
            storage,
            spawner,
            bus,
        }
    }

    // ─── Reads ───────────────────────────────────────────────

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    pub fn bound_backend_id(&self) -> Option<String> {
        self.backend_session_id.clone()
    }

    /// Non-starred sessions, most recently updated first, each annotated
    /// with an age bucket. Computed, never stored.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<SessionListEntry> {
        let mut sessions: Vec<&Session> =
            self.sessions.iter().filter(|s| !s.is_starred).collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
            .into_iter()
            .map(|s| SessionListEntry {
                id: s.id.clone(),
                title: s.title.clone(),
                age: AgeBucket::from_updated_at(s.updated_at, now),
            })
            .collect()
    }

    /// Starred sessions in stable collection order.
    pub fn starred(&self, now: DateTime<Utc>) -> Vec<SessionListEntry> {
        self.sessions
            .iter()
            .filter(|s| s.is_starred)
            .map(|s| SessionListEntry {
                id: s.id.clone(),
                title: s.title.clone(),
                age: AgeBucket::from_updated_at(s.updated_at, now),
            })
            .collect()
    }

    // ─── Mutations ───────────────────────────────────────────

    /// Install state decoded from storage, together with the storage
    /// backend that was picked at startup. Dates were already revived by
    /// the codec; the selection is dropped if it no longer resolves.
    pub fn hydrate(&mut self, storage: Rc<dyn StoragePort>, state: DecodedState) {
        self.storage = storage;
        self.sessions = state.sessions;
        self.current_id = state
            .current_session_id
            .filter(|id| self.sessions.iter().any(|s| &s.id == id));
        self.backend_session_id = state.backend_session_id;
        log::info!(
            "Hydrated {} sessions from {}",
            self.sessions.len(),
            self.storage.backend_name()
        );
        self.bus.emit(ChatEvent::StoreChanged);
    }

    /// Create a session from its first message, select it, and bind its
    /// backend session id. Returns the new session's id.
    pub fn create(&mut self, first_message: Message, backend_session_id: Option<String>) -> String {
        let session = Session::new(first_message, backend_session_id.clone());
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.current_id = Some(id.clone());
        if backend_session_id.is_some() {
            self.backend_session_id = backend_session_id;
        }
        self.changed();
        id
    }

    /// Replace a session's message list; re-derives the title and
    /// refreshes `updated_at`. A `Some` backend id overwrites the stored
    /// one, `None` preserves it. Unknown ids are a logged no-op.
    pub fn update(
        &mut self,
        session_id: &str,
        messages: Vec<Message>,
        backend_session_id: Option<String>,
    ) {
        let is_current = self.current_id.as_deref() == Some(session_id);
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            log::warn!("update for unknown session {}", session_id);
            return;
        };

        session.title = messages
            .first()
            .map(|m| derive_title(&m.content))
            .unwrap_or_else(|| UNTITLED.to_string());
        session.messages = messages;
        session.touch();
        if let Some(backend_id) = backend_session_id {
            session.backend_session_id = Some(backend_id.clone());
            if is_current {
                self.backend_session_id = Some(backend_id);
            }
        }
        self.changed();
    }

    /// Record the backend session id obtained for a session, without
    /// touching its messages or `updated_at`.
    pub fn attach_backend_session(&mut self, session_id: &str, backend_id: &str) {
        let is_current = self.current_id.as_deref() == Some(session_id);
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            log::warn!("attach_backend_session for unknown session {}", session_id);
            return;
        };
        if session.backend_session_id.is_none() {
            session.backend_session_id = Some(backend_id.to_string());
        }
        if is_current {
            self.backend_session_id = Some(backend_id.to_string());
        }
        self.changed();
    }

    pub fn delete(&mut self, session_id: &str) {
        let Some(pos) = self.sessions.iter().position(|s| s.id == session_id) else {
            log::warn!("delete for unknown session {}", session_id);
            return;
        };
        let removed = self.sessions.remove(pos);
        if self.current_id.as_deref() == Some(session_id) {
            self.current_id = None;
        }
        // The removed session's remote id must not leak into the next
        // chat, so a binding that points at it is cleared with it.
        if removed.backend_session_id.is_some()
            && removed.backend_session_id == self.backend_session_id
        {
            self.backend_session_id = None;
        }
        self.changed();
    }

    pub fn toggle_star(&mut self, session_id: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            log::warn!("toggle_star for unknown session {}", session_id);
            return;
        };
        session.is_starred = !session.is_starred;
        self.changed();
    }

    /// Overwrite a session's title verbatim. The title is re-derived
    /// again on the next message-list mutation.
    pub fn rename(&mut self, session_id: &str, new_title: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            log::warn!("rename for unknown session {}", session_id);
            return;
        };
        session.title = new_title.to_string();
        self.changed();
    }

    /// Select a session (or clear the selection). Ids that don't resolve
    /// are a logged no-op, so the selection never dangles.
    pub fn set_current(&mut self, session_id: Option<String>) {
        if let Some(id) = &session_id {
            if self.session(id).is_none() {
                log::warn!("set_current for unknown session {}", id);
                return;
            }
        }
        if self.current_id == session_id {
            return;
        }
        self.current_id = session_id;
        if let Some(backend_id) = self
            .current_session()
            .and_then(|s| s.backend_session_id.clone())
        {
            self.backend_session_id = Some(backend_id);
        }
        self.changed();
    }

    /// Re-bind the backend session id the live channel follows (used when
    /// a new chat is pre-provisioned before any message exists).
    pub fn set_backend_session_id(&mut self, backend_id: Option<String>) {
        if self.backend_session_id == backend_id {
            return;
        }
        self.backend_session_id = backend_id;
        self.changed();
    }

    // ─── Persistence ─────────────────────────────────────────

    fn changed(&self) {
        self.persist();
        self.bus.emit(ChatEvent::StoreChanged);
    }

    /// Snapshot the minimal projection and hand the write to the spawner.
    /// Writes are ordered after their mutation; completion is not awaited.
    fn persist(&self) {
        let payload = match persist::encode(
            &self.sessions,
            &self.current_id,
            &self.backend_session_id,
        ) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to encode persisted state: {}", e);
                return;
            }
        };
        let storage = self.storage.clone();
        self.spawner.spawn_local(Box::pin(async move {
            if let Err(e) = storage.set(persist::STORAGE_KEY, &payload).await {
                log::error!("Failed to persist sessions: {}", e);
            }
        }));
    }
}
