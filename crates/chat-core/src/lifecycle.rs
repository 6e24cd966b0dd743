//! Session lifecycle coordinator: bridges local session identity and
//! the remote agent's session identity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use chat_types::{ChatError, Result};

use crate::ports::BackendPort;
use crate::store::SessionStore;

type SharedStart = Shared<LocalBoxFuture<'static, Result<String>>>;

pub struct SessionLifecycle {
    backend: Rc<dyn BackendPort>,
    store: Rc<RefCell<SessionStore>>,
    /// In-flight `start_session` calls keyed by local session id. The
    /// first caller creates the future, later callers await the same one,
    /// so one local session can never spawn two remote sessions.
    in_flight: RefCell<HashMap<String, SharedStart>>,
}

impl SessionLifecycle {
    pub fn new(backend: Rc<dyn BackendPort>, store: Rc<RefCell<SessionStore>>) -> Self {
        Self {
            backend,
            store,
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    /// Return the backend session id bound to a local session, starting a
    /// remote session first if the local one has none yet. Failures are
    /// returned to the caller; no retry is scheduled and the local session
    /// stays unbound.
    pub async fn ensure_backend_session(&self, local_id: &str) -> Result<String> {
        {
            let store = self.store.borrow();
            let Some(session) = store.session(local_id) else {
                return Err(ChatError::Session(format!("unknown session {}", local_id)));
            };
            if let Some(backend_id) = &session.backend_session_id {
                return Ok(backend_id.clone());
            }
        }

        let start = {
            let mut in_flight = self.in_flight.borrow_mut();
            match in_flight.get(local_id) {
                Some(shared) => shared.clone(),
                None => {
                    let backend = self.backend.clone();
                    let fut: LocalBoxFuture<'static, Result<String>> =
                        Box::pin(async move { backend.start_session().await });
                    let shared = fut.shared();
                    in_flight.insert(local_id.to_string(), shared.clone());
                    shared
                }
            }
        };

        let result = start.await;
        self.in_flight.borrow_mut().remove(local_id);

        let backend_id = result?;
        self.store
            .borrow_mut()
            .attach_backend_session(local_id, &backend_id);
        Ok(backend_id)
    }

    /// Obtain a backend session id for a send that has no local session
    /// yet: reuse the id pre-provisioned by `start_new_chat` when there
    /// is one, otherwise start a fresh remote session.
    pub async fn obtain_for_new_session(&self) -> Result<String> {
        let pre_provisioned = {
            let store = self.store.borrow();
            match store.current_id() {
                None => store.bound_backend_id(),
                Some(_) => None,
            }
        };
        match pre_provisioned {
            Some(backend_id) => Ok(backend_id),
            None => self.backend.start_session().await,
        }
    }

    /// Provision a fresh remote session for the "New Chat" affordance:
    /// no local session exists yet, the selection is cleared and the new
    /// id becomes the bound one.
    pub async fn start_new_chat(&self) -> Result<String> {
        let backend_id = self.backend.start_session().await?;
        let mut store = self.store.borrow_mut();
        store.set_current(None);
        store.set_backend_session_id(Some(backend_id.clone()));
        Ok(backend_id)
    }
}
