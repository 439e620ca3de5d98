//! Backend for Ollama's native API.
//!
//! [`OllamaBackend`] translates normalized [`LlmRequest`]s into Ollama's
//! `/api/generate` and `/api/chat` endpoints. Handy for running the
//! extractor against a local model with no API key.

use super::{pick_metadata, post_json, Backend, LlmRequest, LlmResponse};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const METADATA_KEYS: &[&str] = &[
    "total_duration",
    "eval_count",
    "eval_duration",
    "prompt_eval_count",
    "model",
];

/// Backend for Ollama's native API.
///
/// Uses `/api/chat` when a non-empty system prompt is set, and
/// `/api/generate` otherwise.
#[derive(Debug, Clone)]
pub struct OllamaBackend;

impl OllamaBackend {
    fn build_options(request: &LlmRequest) -> Value {
        json!({
            "temperature": request.config.temperature,
            "num_predict": request.config.max_tokens,
        })
    }

    /// Whether this request should use `/api/chat` (vs `/api/generate`).
    fn use_chat(request: &LlmRequest) -> bool {
        request
            .system_prompt
            .as_ref()
            .is_some_and(|s| !s.is_empty())
    }

    /// Build the JSON body for `/api/generate`.
    fn build_generate_body(request: &LlmRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": Self::build_options(request),
        });
        if request.config.json_mode {
            body["format"] = json!("json");
        }
        body
    }

    /// Build the JSON body for `/api/chat`.
    fn build_chat_body(request: &LlmRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(ref sys) = request.system_prompt {
            if !sys.is_empty() {
                messages.push(json!({"role": "system", "content": sys}));
            }
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
            "options": Self::build_options(request),
        });
        if request.config.json_mode {
            body["format"] = json!("json");
        }
        body
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let base = base_url.trim_end_matches('/');

        let (url, body) = if Self::use_chat(request) {
            (format!("{}/api/chat", base), Self::build_chat_body(request))
        } else {
            (format!("{}/api/generate", base), Self::build_generate_body(request))
        };

        let (json_resp, status) = post_json(client.post(&url).json(&body), &url).await?;

        let content = if Self::use_chat(request) {
            json_resp
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|v| v.as_str())
        } else {
            json_resp.get("response").and_then(|v| v.as_str())
        };
        let text = content.unwrap_or("").to_string();

        Ok(LlmResponse {
            text,
            status,
            metadata: pick_metadata(&json_resp, METADATA_KEYS),
        })
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
