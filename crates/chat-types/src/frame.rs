use serde::{Deserialize, Serialize};

/// A server-initiated frame received on the live channel.
///
/// Frames carry a `type` discriminator. Anything that fails to parse is
/// logged and discarded by the channel; only `agent_response` drives a
/// store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    AgentResponse {
        content: String,
    },
    ToolStart {
        #[serde(default)]
        tool: String,
    },
    ToolResult {
        #[serde(default)]
        tool: String,
        #[serde(default)]
        output: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

/// A client-initiated frame sent on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Message { content: String },
}
