//! One-shot timer adapter for reconnect backoff.

use gloo_timers::callback::Timeout;

use chat_core::channel::{ChannelSignal, ChannelSignals};
use chat_core::ports::{TimerHandle, TimerPort};

pub struct BrowserTimers {
    signals: ChannelSignals,
}

impl BrowserTimers {
    pub fn new(signals: ChannelSignals) -> Self {
        Self { signals }
    }
}

impl TimerPort for BrowserTimers {
    fn schedule(&self, delay_ms: u32) -> Box<dyn TimerHandle> {
        let signals = self.signals.clone();
        let timeout = Timeout::new(delay_ms, move || {
            signals.push(ChannelSignal::ReconnectDue);
        });
        Box::new(BrowserTimerHandle { _timeout: timeout })
    }
}

/// Dropping the handle drops the `Timeout`, which clears the underlying
/// `setTimeout`.
struct BrowserTimerHandle {
    _timeout: Timeout,
}

impl TimerHandle for BrowserTimerHandle {}
