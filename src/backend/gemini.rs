//! Backend for Google's Gemini `generateContent` API.
//!
//! Endpoint: `/v1beta/models/{model}:generateContent`. The system prompt is
//! sent as `systemInstruction`; JSON mode maps to
//! `generationConfig.responseMimeType = "application/json"`.

use super::{pick_metadata, post_json, Backend, LlmRequest, LlmResponse};
use crate::error::Result;
use crate::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Default public endpoint for the Gemini API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Backend for the Gemini API.
///
/// # Example
///
/// ```
/// use contact_extractor::backend::GeminiBackend;
///
/// let backend = GeminiBackend::new().with_api_key("AIza...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone, Default)]
pub struct GeminiBackend {
    /// Sent as the `x-goog-api-key` header when set.
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &self.api_key.as_ref().map(|k| {
                if k.len() > 6 {
                    format!("{}***", &k[..6])
                } else {
                    "***".to_string()
                }
            }))
            .finish()
    }
}

impl GeminiBackend {
    /// Create a backend without an API key.
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the request body for `:generateContent`.
    fn build_body(request: &LlmRequest) -> Value {
        let mut generation = json!({
            "temperature": request.config.temperature,
            "maxOutputTokens": request.config.max_tokens,
        });
        if request.config.json_mode {
            generation["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
            "generationConfig": generation,
        });

        if let Some(ref sys) = request.system_prompt {
            if !sys.is_empty() {
                body["systemInstruction"] = json!({"parts": [{"text": sys}]});
            }
        }

        body
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(json_resp: &Value) -> Option<String> {
        let parts = json_resp
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", base, request.model);
        let body = Self::build_body(request);

        let mut http = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http = http.header("x-goog-api-key", key.as_str());
        }

        let (json_resp, status) = post_json(http, &url).await?;
        let text = Self::extract_text(&json_resp).ok_or(ModelError::EmptyResponse)?;

        Ok(LlmResponse {
            text,
            status,
            metadata: pick_metadata(&json_resp, &["usageMetadata", "modelVersion"]),
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
