//! Message dispatcher: end-to-end send of one user message with
//! optimistic echo and fallback-on-error.

use std::cell::RefCell;
use std::rc::Rc;

use chat_types::event::ChatEvent;
use chat_types::message::Message;
use chat_types::{ChatError, Result};

use crate::event_bus::EventBus;
use crate::lifecycle::SessionLifecycle;
use crate::ports::BackendPort;
use crate::store::SessionStore;

/// Synthetic assistant reply appended when a send fails, so every user
/// message is followed by exactly one assistant message either way.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error processing your message. Please try again.";

pub struct MessageDispatcher {
    store: Rc<RefCell<SessionStore>>,
    lifecycle: Rc<SessionLifecycle>,
    backend: Rc<dyn BackendPort>,
    bus: EventBus,
}

impl MessageDispatcher {
    pub fn new(
        store: Rc<RefCell<SessionStore>>,
        lifecycle: Rc<SessionLifecycle>,
        backend: Rc<dyn BackendPort>,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            lifecycle,
            backend,
            bus,
        }
    }

    /// Send one user message.
    ///
    /// The user message is appended before any network call (optimistic
    /// echo). Without a current session, a backend session id is obtained
    /// first and a local session is created around the message; if
    /// provisioning fails the send aborts with the error and no local
    /// session is left behind.
    pub async fn send(
        &self,
        content: &str,
        attachments: Vec<String>,
        images: Vec<String>,
    ) -> Result<()> {
        let user_message =
            Message::user(content).with_attachments(attachments.clone(), images.clone());

        let current = self.store.borrow().current_id().map(str::to_string);
        let session_id = match current {
            None => {
                let backend_id = self.lifecycle.obtain_for_new_session().await?;
                self.store
                    .borrow_mut()
                    .create(user_message, Some(backend_id))
            }
            Some(session_id) => {
                self.append_message(&session_id, user_message);
                session_id
            }
        };

        self.send_to_backend(&session_id, content, &images, &attachments)
            .await;
        Ok(())
    }

    /// Regenerate the last response: truncate the current session to its
    /// most recent user message and reissue the send with that message's
    /// original content and attachments.
    pub async fn retry_last(&self) -> Result<()> {
        let (session_id, content, attachments, images, truncated) = {
            let store = self.store.borrow();
            let Some(session) = store.current_session() else {
                return Err(ChatError::Session("no current session to retry".to_string()));
            };
            let Some(last_user) = session.messages.iter().rposition(|m| !m.is_ai) else {
                return Err(ChatError::Session("no user message to retry".to_string()));
            };
            let message = &session.messages[last_user];
            (
                session.id.clone(),
                message.content.clone(),
                message.attachments.clone(),
                message.images.clone(),
                session.messages[..=last_user].to_vec(),
            )
        };

        self.store.borrow_mut().update(&session_id, truncated, None);
        self.send_to_backend(&session_id, &content, &images, &attachments)
            .await;
        Ok(())
    }

    /// Provision a fresh backend session and clear the selection.
    pub async fn start_new_chat(&self) -> Result<String> {
        self.lifecycle.start_new_chat().await
    }

    /// Same provisioning path as `start_new_chat`; kept as a separate
    /// entry point for the reset affordance.
    pub async fn reset_chat(&self) -> Result<String> {
        self.lifecycle.start_new_chat().await
    }

    // ─── Send tail ───────────────────────────────────────────

    async fn send_to_backend(
        &self,
        session_id: &str,
        content: &str,
        image_paths: &[String],
        files: &[String],
    ) {
        let backend_id = match self.lifecycle.ensure_backend_session(session_id).await {
            Ok(backend_id) => backend_id,
            Err(e) => {
                log::error!("No backend session for {}: {}", session_id, e);
                self.recover_with_fallback(session_id, e);
                return;
            }
        };

        match self
            .backend
            .send_message(&backend_id, content, image_paths, files)
            .await
        {
            Ok(reply) => {
                self.append_message(session_id, Message::assistant(reply));
                self.bus.emit(ChatEvent::AssistantReply {
                    session_id: session_id.to_string(),
                });
            }
            Err(e) => {
                log::error!("Failed to send message: {}", e);
                self.recover_with_fallback(session_id, e);
            }
        }
    }

    fn recover_with_fallback(&self, session_id: &str, error: ChatError) {
        self.append_message(session_id, Message::assistant(FALLBACK_REPLY));
        self.bus.emit(ChatEvent::SendFailed {
            message: error.to_string(),
        });
    }

    /// Append against the latest stored message list at append time, not
    /// a snapshot captured before the network call. Two overlapping sends
    /// therefore both land, in completion order.
    fn append_message(&self, session_id: &str, message: Message) {
        let mut store = self.store.borrow_mut();
        let Some(session) = store.session(session_id) else {
            log::warn!("append to unknown session {}", session_id);
            return;
        };
        let mut messages = session.messages.clone();
        messages.push(message);
        store.update(session_id, messages, None);
    }
}
