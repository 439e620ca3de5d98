//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over LLM providers, translating between
//! normalized [`LlmRequest`]/[`LlmResponse`] types and provider-specific
//! HTTP APIs. Built-in implementations: [`OllamaBackend`], [`GeminiBackend`],
//! and [`MockBackend`] for tests.
//!
//! ```text
//! LlmCall ──► LlmRequest ──► Backend::complete() ──► LlmResponse
//!                                    │
//!                ┌───────────────────┼───────────────────┐
//!           OllamaBackend       GeminiBackend        MockBackend
//!           /api/generate       :generateContent     canned text
//!           /api/chat
//! ```
//!
//! Backends make exactly one attempt per call. Retry policy, if any, belongs
//! to whoever composes the service around this crate.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::ModelError;
use async_trait::async_trait;
use reqwest::Client;

/// A normalized, provider-agnostic LLM request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier (e.g. `"gemini-2.5-flash"`, `"llama3.2:3b"`).
    pub model: String,

    /// If `Some`, this is a chat-style call with a system prompt.
    /// If `None`, this is a generate-style call (prompt only).
    pub system_prompt: Option<String>,

    /// The user prompt text.
    pub prompt: String,

    /// LLM configuration (temperature, max_tokens, json_mode).
    pub config: LlmConfig,
}

/// A normalized LLM response.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, model info).
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over LLM providers.
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a non-streaming LLM call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Send a JSON POST and return the decoded body, mapping non-2xx statuses
/// to [`ModelError::HttpError`].
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<(serde_json::Value, u16)> {
    let resp = request.send().await.map_err(|e| {
        ModelError::Other(format!("Failed to connect to LLM at {}: {}", url, e))
    })?;

    let status = resp.status().as_u16();

    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ModelError::HttpError { status, body });
    }

    let json_resp: serde_json::Value = resp.json().await?;
    Ok((json_resp, status))
}

/// Copy the named top-level fields of a provider response into a metadata object.
pub(crate) fn pick_metadata(json_resp: &serde_json::Value, keys: &[&str]) -> Option<serde_json::Value> {
    let mut meta = serde_json::Map::new();
    for key in keys {
        if let Some(v) = json_resp.get(*key) {
            meta.insert((*key).to_string(), v.clone());
        }
    }
    if meta.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pick_metadata_selects_known_keys() {
        let resp = json!({"model": "llama3.2", "eval_count": 12, "response": "hi"});
        let meta = pick_metadata(&resp, &["model", "eval_count", "total_duration"]).unwrap();
        assert_eq!(meta["model"], "llama3.2");
        assert_eq!(meta["eval_count"], 12);
        assert!(meta.get("response").is_none());
        assert!(meta.get("total_duration").is_none());
    }

    #[test]
    fn test_pick_metadata_empty() {
        assert!(pick_metadata(&json!({"response": "hi"}), &["model"]).is_none());
    }

    #[tokio::test]
    async fn test_post_json_connection_failure_is_error() {
        let client = Client::new();
        let url = "http://127.0.0.1:9/api/generate";
        let result = post_json(client.post(url).json(&json!({})), url).await;
        assert!(result.is_err());
    }
}
