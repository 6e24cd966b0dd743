use serde::{Deserialize, Serialize};

/// Events emitted by the core components.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// The session collection or selection changed in some way
    StoreChanged,

    /// An assistant message was appended to a session
    AssistantReply { session_id: String },

    /// A send failed and was recovered with a fallback assistant message
    SendFailed { message: String },

    /// The live channel connected
    ChannelOpen,

    /// The live channel disconnected (a reconnect may follow)
    ChannelClosed,

    /// The live channel gave up reconnecting until the bound id changes
    ChannelGaveUp,

    /// Server-side tool activity observed on the live channel
    ToolActivity { tool: String, detail: String },

    /// An error surfaced to the user
    Error { message: String },
}
