//! HTTP adapter for the agent backend.
//!
//! Uses browser `fetch()` via gloo-net for WASM compatibility. Failed
//! requests surface the backend's `detail` field when it sends one.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use chat_core::ports::BackendPort;
use chat_types::config::ClientConfig;
use chat_types::{ChatError, Result};

pub struct HttpBackend {
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl BackendPort for HttpBackend {
    async fn start_session(&self) -> Result<String> {
        let url = self.config.endpoint("start_session");

        let response = Request::post(&url)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(error_from(response).await);
        }

        let data: StartSessionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(e.to_string()))?;
        Ok(data.session_id)
    }

    async fn send_message(
        &self,
        session_id: &str,
        content: &str,
        image_paths: &[String],
        files: &[String],
    ) -> Result<String> {
        let url = self.config.endpoint("send_message");
        let body = json!({
            "query": {
                "session_id": session_id,
                "content": content,
            },
            "image_paths": image_paths,
            "files": files,
        });

        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(error_from(response).await);
        }

        let data: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Backend(e.to_string()))?;
        Ok(data.response)
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct StartSessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: String,
}

async fn error_from(response: Response) -> ChatError {
    let status = response.status();
    let detail = match response.json::<ErrorBody>().await {
        Ok(body) if !body.detail.is_empty() => body.detail,
        _ => "unknown error".to_string(),
    };
    ChatError::Backend(format!("HTTP {}: {}", status, detail))
}
