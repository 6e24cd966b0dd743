use serde::{Deserialize, Serialize};

/// Client configuration: where the agent backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// HTTP base URL of the agent backend
    pub api_base: String,
    /// WebSocket base URL. When absent it is derived from `api_base`
    /// (`http` → `ws`, `https` → `wss`).
    pub ws_base: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            ws_base: None,
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build the live-channel URL for a backend session id.
    pub fn ws_url(&self, session_id: &str) -> String {
        let base = match &self.ws_base {
            Some(ws) => ws.clone(),
            None => {
                if let Some(rest) = self.api_base.strip_prefix("https://") {
                    format!("wss://{}", rest)
                } else if let Some(rest) = self.api_base.strip_prefix("http://") {
                    format!("ws://{}", rest)
                } else {
                    self.api_base.clone()
                }
            }
        };
        format!("{}/ws/{}", base.trim_end_matches('/'), session_id)
    }
}
