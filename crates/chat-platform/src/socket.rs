//! WebSocket adapter for the live channel.
//!
//! `connect` opens a `web_sys::WebSocket` and wires its callbacks to the
//! shared `ChannelSignals` queue; the state machine in chat-core never
//! touches the socket directly.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use chat_core::channel::{ChannelSignal, ChannelSignals};
use chat_core::ports::{SocketHandle, SocketPort};
use chat_types::config::ClientConfig;
use chat_types::{ChatError, Result};

pub struct BrowserSocket {
    config: ClientConfig,
    signals: ChannelSignals,
}

impl BrowserSocket {
    pub fn new(config: ClientConfig, signals: ChannelSignals) -> Self {
        Self { config, signals }
    }
}

impl SocketPort for BrowserSocket {
    fn connect(&self, session_id: &str) -> Result<Box<dyn SocketHandle>> {
        let url = self.config.ws_url(session_id);
        let ws = WebSocket::new(&url)
            .map_err(|e| ChatError::Channel(format!("{:?}", e)))?;

        let signals = self.signals.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            signals.push(ChannelSignal::Opened);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let signals = self.signals.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |e: MessageEvent| {
            if let Some(text) = e.data().as_string() {
                signals.push(ChannelSignal::Frame(text));
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let signals = self.signals.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |_: CloseEvent| {
            signals.push(ChannelSignal::Closed);
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        let signals = self.signals.clone();
        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            signals.push(ChannelSignal::Error("socket error".to_string()));
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(Box::new(BrowserSocketHandle {
            ws,
            _onopen: onopen,
            _onmessage: onmessage,
            _onclose: onclose,
            _onerror: onerror,
        }))
    }
}

/// Keeps the callback closures alive for the lifetime of the socket.
struct BrowserSocketHandle {
    ws: WebSocket,
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(web_sys::Event)>,
}

impl SocketHandle for BrowserSocketHandle {
    fn send_text(&self, text: &str) -> Result<()> {
        self.ws
            .send_with_str(text)
            .map_err(|e| ChatError::Channel(format!("{:?}", e)))
    }

    fn close(&self) {
        // Callbacks are cleared first so an intentional close does not
        // surface as a disconnect and trigger a reconnect.
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
        let _ = self.ws.close();
    }
}

impl Drop for BrowserSocketHandle {
    fn drop(&mut self) {
        self.close();
    }
}
