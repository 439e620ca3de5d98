//! Model-call tuning and process-level settings.
//!
//! [`LlmConfig`] travels with every request. [`Settings`] is what the
//! composition layer assembles once at startup (default region, model id,
//! provider endpoint) and turns into an [`ExecCtx`]. The core never reads the
//! process environment itself; [`Settings::from_lookup`] takes a lookup
//! function so callers decide where values come from.

use crate::backend::gemini::GEMINI_BASE_URL;
use crate::backend::{GeminiBackend, OllamaBackend};
use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::phone::PhoneNormalizer;
use crate::ModelError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Per-call generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Ask the provider for JSON-only output.
    pub json_mode: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            json_mode: false,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}

/// Which hosted model API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
}

impl FromStr for Provider {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "ollama" => Ok(Provider::Ollama),
            other => Err(ModelError::InvalidConfig(format!(
                "unknown provider '{}' (expected 'gemini' or 'ollama')",
                other
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::Ollama => f.write_str("ollama"),
        }
    }
}

/// Process-wide configuration for the contact extractor.
#[derive(Clone)]
pub struct Settings {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_id: String,
    /// ISO 3166-1 alpha-2 region assumed for phone numbers without `+`.
    pub default_region: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: None,
            model_id: "gemini-2.5-flash".to_string(),
            default_region: "IN".to_string(),
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model_id", &self.model_id)
            .field("default_region", &self.default_region)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Build settings from a key lookup, falling back to defaults for
    /// anything missing or blank.
    ///
    /// Keys: `PROVIDER`, `LLM_BASE_URL`, `GOOGLE_API_KEY`, `MODEL_ID`,
    /// `DEFAULT_REGION`, `LLM_TIMEOUT_SECS`. Switching the provider to
    /// Ollama without a base URL points at `http://localhost:11434`.
    ///
    /// # Example
    ///
    /// ```
    /// use contact_extractor::Settings;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "DEFAULT_REGION" => Some("us".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(settings.default_region, "US");
    /// assert_eq!(settings.model_id, "gemini-2.5-flash");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut settings = Settings::default();

        if let Some(provider) = get("PROVIDER") {
            settings.provider = provider.parse()?;
            if settings.provider == Provider::Ollama {
                settings.base_url = "http://localhost:11434".to_string();
                settings.model_id = "llama3.2:3b".to_string();
            }
        }
        if let Some(url) = get("LLM_BASE_URL") {
            settings.base_url = url;
        }
        settings.api_key = get("GOOGLE_API_KEY");
        if let Some(model) = get("MODEL_ID") {
            settings.model_id = model;
        }
        if let Some(region) = get("DEFAULT_REGION") {
            settings.default_region = region.to_ascii_uppercase();
        }
        if let Some(secs) = get("LLM_TIMEOUT_SECS") {
            settings.timeout_secs = secs.parse().map_err(|_| {
                ModelError::InvalidConfig(format!("LLM_TIMEOUT_SECS must be an integer, got '{}'", secs))
            })?;
        }

        Ok(settings)
    }

    /// Reject settings that would fail on the first request.
    pub fn validate(&self) -> Result<()> {
        PhoneNormalizer::new(&self.default_region)
            .map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        if self.timeout_secs == 0 {
            return Err(ModelError::InvalidConfig("timeout must be at least one second".into()));
        }
        if self.model_id.trim().is_empty() {
            return Err(ModelError::InvalidConfig("model id is empty".into()));
        }
        if self.provider == Provider::Gemini && self.api_key.is_none() {
            return Err(ModelError::InvalidConfig(
                "GOOGLE_API_KEY is required for the gemini provider".into(),
            ));
        }
        Ok(())
    }

    /// Build the shared execution context for these settings.
    pub fn exec_ctx(&self) -> ExecCtx {
        let builder = ExecCtx::builder(&self.base_url).timeout(Duration::from_secs(self.timeout_secs));
        match self.provider {
            Provider::Gemini => {
                let mut backend = GeminiBackend::new();
                if let Some(ref key) = self.api_key {
                    backend = backend.with_api_key(key.clone());
                }
                builder.backend(Arc::new(backend)).build()
            }
            Provider::Ollama => builder.backend(Arc::new(OllamaBackend)).build(),
        }
    }
}
