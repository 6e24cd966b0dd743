//! Main egui application: composes the panels and owns the core wiring.
//!
//! Per frame: drain the event bus into the UI state, drain the channel
//! signal queue into the live-channel state machine, re-bind the channel
//! to the currently bound backend session, render, and dispatch actions.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use egui::{self, CentralPanel, SidePanel};

use chat_core::channel::{ChannelSignals, LiveChannel};
use chat_core::dispatcher::MessageDispatcher;
use chat_core::event_bus::EventBus;
use chat_core::export;
use chat_core::lifecycle::SessionLifecycle;
use chat_core::persist;
use chat_core::store::SessionStore;
use chat_platform::http::HttpBackend;
use chat_platform::socket::BrowserSocket;
use chat_platform::spawn::BrowserSpawner;
use chat_platform::storage::{auto_detect_storage, MemoryStorage};
use chat_platform::timer::BrowserTimers;
use chat_types::config::ClientConfig;
use chat_types::event::ChatEvent;
use chat_ui::panels::{chat_panel, sidebar_panel};
use chat_ui::state::{ChatAction, SidebarAction, UiState};
use chat_ui::theme;

pub struct ChatApp {
    ui_state: UiState,
    event_bus: EventBus,
    signals: ChannelSignals,
    store: Rc<RefCell<SessionStore>>,
    dispatcher: Rc<MessageDispatcher>,
    channel: LiveChannel,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = ClientConfig::default();
        let event_bus = EventBus::new();
        let signals = ChannelSignals::new();

        // The store starts on a memory backend; the real backend is
        // detected asynchronously and installed via hydrate().
        let store = Rc::new(RefCell::new(SessionStore::new(
            Rc::new(MemoryStorage::new()),
            Rc::new(BrowserSpawner),
            event_bus.clone(),
        )));

        let backend = Rc::new(HttpBackend::new(config.clone()));
        let lifecycle = Rc::new(SessionLifecycle::new(backend.clone(), store.clone()));
        let dispatcher = Rc::new(MessageDispatcher::new(
            store.clone(),
            lifecycle,
            backend,
            event_bus.clone(),
        ));

        let channel = LiveChannel::new(
            store.clone(),
            Rc::new(BrowserSocket::new(config, signals.clone())),
            Rc::new(BrowserTimers::new(signals.clone())),
            event_bus.clone(),
        );

        Self::restore_sessions(store.clone());

        Self {
            ui_state: UiState::new(),
            event_bus,
            signals,
            store,
            dispatcher,
            channel,
            first_frame: true,
        }
    }

    /// Detect the storage backend and load persisted sessions into the
    /// store. A corrupt payload starts fresh rather than failing startup.
    fn restore_sessions(store: Rc<RefCell<SessionStore>>) {
        wasm_bindgen_futures::spawn_local(async move {
            let storage = match auto_detect_storage().await {
                Ok(storage) => storage,
                Err(e) => {
                    log::error!("Storage detection failed: {}", e);
                    return;
                }
            };
            let state = match persist::load(storage.as_ref()).await {
                Ok(Some(state)) => state,
                Ok(None) => Default::default(),
                Err(e) => {
                    log::warn!("Discarding persisted state: {}", e);
                    Default::default()
                }
            };
            store.borrow_mut().hydrate(storage, state);
        });
    }

    fn dispatch_send(&mut self, text: String, ctx: &egui::Context) {
        self.ui_state.mark_sending();
        let dispatcher = self.dispatcher.clone();
        let bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = dispatcher.send(&text, Vec::new(), Vec::new()).await {
                log::error!("Send failed before reaching the backend: {}", e);
                bus.emit(ChatEvent::SendFailed {
                    message: e.to_string(),
                });
            }
            ctx.request_repaint();
        });
    }

    fn dispatch_retry(&mut self, ctx: &egui::Context) {
        self.ui_state.mark_sending();
        let dispatcher = self.dispatcher.clone();
        let bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = dispatcher.retry_last().await {
                log::error!("Retry failed: {}", e);
                bus.emit(ChatEvent::SendFailed {
                    message: e.to_string(),
                });
            }
            ctx.request_repaint();
        });
    }

    fn dispatch_new_chat(&self, ctx: &egui::Context) {
        let dispatcher = self.dispatcher.clone();
        let bus = self.event_bus.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = dispatcher.start_new_chat().await {
                log::error!("Failed to start a new chat: {}", e);
                bus.emit(ChatEvent::Error {
                    message: e.to_string(),
                });
            }
            ctx.request_repaint();
        });
    }

    /// Save the current session's transcript as a text download.
    fn export_current_session(&self) {
        let store = self.store.borrow();
        let Some(session) = store.current_session() else {
            return;
        };
        let transcript = export::render_transcript(session);
        let filename = export::export_filename(Utc::now());
        if let Err(e) = chat_platform::download::save_text_file(&filename, &transcript) {
            log::error!("Export failed: {}", e);
            self.event_bus.emit(ChatEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn apply_sidebar_action(&mut self, action: SidebarAction, ctx: &egui::Context) {
        match action {
            SidebarAction::NewChat => self.dispatch_new_chat(ctx),
            SidebarAction::Select(id) => {
                self.store.borrow_mut().set_current(Some(id));
            }
            SidebarAction::Delete(id) => {
                self.store.borrow_mut().delete(&id);
            }
            SidebarAction::ToggleStar(id) => {
                self.store.borrow_mut().toggle_star(&id);
            }
            SidebarAction::Rename(id, title) => {
                self.store.borrow_mut().rename(&id, &title);
            }
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Channel signals first so a frame's reply is visible this frame
        for signal in self.signals.drain() {
            self.channel.handle(signal);
        }

        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        // Follow the bound backend session wherever the store points now
        let bound = self.store.borrow().bound_backend_id();
        self.channel.bind(bound);

        if self.ui_state.sending {
            ctx.request_repaint();
        }

        let (starred, recent, current_id) = {
            let store = self.store.borrow();
            let now = Utc::now();
            (
                store.starred(now),
                store.recent(now),
                store.current_id().map(str::to_string),
            )
        };

        let mut sidebar_action = None;
        SidePanel::left("sessions_panel")
            .resizable(false)
            .show(ctx, |ui| {
                sidebar_action = sidebar_panel(
                    ui,
                    &mut self.ui_state,
                    &starred,
                    &recent,
                    current_id.as_deref(),
                );
            });

        let mut chat_action = None;
        CentralPanel::default().show(ctx, |ui| {
            let store = self.store.borrow();
            chat_action = chat_panel(ui, &mut self.ui_state, store.current_session());
        });

        if let Some(action) = sidebar_action {
            self.apply_sidebar_action(action, ctx);
        }
        match chat_action {
            Some(ChatAction::Send(text)) => self.dispatch_send(text, ctx),
            Some(ChatAction::Retry) => self.dispatch_retry(ctx),
            Some(ChatAction::Export) => self.export_current_session(),
            None => {}
        }
    }
}
