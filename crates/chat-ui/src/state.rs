//! UI-level state that drives rendering.
//! Holds only what the panels need between frames: input drafts, send
//! progress, channel status, and the last error. The conversation itself
//! is read from the session store each frame.

use chat_types::event::ChatEvent;

/// What the chat panel asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    Send(String),
    Retry,
    Export,
}

/// What the sidebar asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    NewChat,
    Select(String),
    Delete(String),
    ToggleStar(String),
    Rename(String, String),
}

/// Live-channel status line shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Offline,
    Live,
    Reconnecting,
    GaveUp,
}

impl ChannelStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelStatus::Offline => "Offline",
            ChannelStatus::Live => "Live",
            ChannelStatus::Reconnecting => "Reconnecting",
            ChannelStatus::GaveUp => "Disconnected",
        }
    }
}

pub struct UiState {
    /// Input field content
    pub input_text: String,
    /// A send is in flight; disables the input row
    pub sending: bool,
    /// Status line text
    pub status_text: String,
    /// Live-channel status
    pub channel_status: ChannelStatus,
    /// Last error message, shown as a dismissable banner
    pub error_banner: Option<String>,
    /// Most recent tool activity from the live channel
    pub tool_activity: Option<String>,
    /// Session currently being renamed, with the draft title
    pub rename_target: Option<(String, String)>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input_text: String::new(),
            sending: false,
            status_text: "Ready".to_string(),
            channel_status: ChannelStatus::Offline,
            error_banner: None,
            tool_activity: None,
            rename_target: None,
        }
    }

    /// Mark a send as dispatched; cleared again by the reply events.
    pub fn mark_sending(&mut self) {
        self.sending = true;
        self.status_text = "Waiting for reply".to_string();
    }

    /// Process events drained from the EventBus this frame.
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::StoreChanged => {}
                ChatEvent::AssistantReply { .. } => {
                    self.sending = false;
                    self.tool_activity = None;
                    self.status_text = "Ready".to_string();
                }
                ChatEvent::SendFailed { message } => {
                    log::warn!("send failed: {}", message);
                    self.sending = false;
                    self.tool_activity = None;
                    self.status_text = "Ready".to_string();
                    self.error_banner = Some(message);
                }
                ChatEvent::ChannelOpen => {
                    self.channel_status = ChannelStatus::Live;
                }
                ChatEvent::ChannelClosed => {
                    self.channel_status = ChannelStatus::Reconnecting;
                }
                ChatEvent::ChannelGaveUp => {
                    self.channel_status = ChannelStatus::GaveUp;
                }
                ChatEvent::ToolActivity { tool, detail } => {
                    self.status_text = format!("Running: {}", tool);
                    self.tool_activity = Some(format!("{}: {}", tool, detail));
                }
                ChatEvent::Error { message } => {
                    log::error!("{}", message);
                    self.error_banner = Some(message);
                }
            }
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
