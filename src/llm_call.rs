//! A single prompted model call.
//!
//! [`LlmCall`] renders its prompt templates, dispatches one request to the
//! context's backend, strips reasoning blocks, and parses the text with its
//! [`OutputStrategy`]. It never retries: a failure is returned to the caller,
//! which decides how to degrade.

use crate::{
    backend::LlmRequest,
    config::LlmConfig,
    error::Result,
    events::{emit, Event},
    exec_ctx::ExecCtx,
    output_strategy::OutputStrategy,
    parsing, prompt,
};
use serde_json::Value;

/// A named, reusable model call.
///
/// # Example
///
/// ```ignore
/// use contact_extractor::{ExecCtx, LlmCall, LlmConfig};
///
/// let call = LlmCall::new("summarize", "Summarize this: {text}")
///     .with_model("llama3.2:3b")
///     .with_config(LlmConfig::default().with_json_mode(true))
///     .expecting_json();
///
/// let ctx = ExecCtx::builder("http://localhost:11434").build();
/// let output = call.invoke(&ctx, &[("text", "Some long text...")]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LlmCall {
    /// Instance name (for logging/events).
    name: String,
    /// Prompt template with `{key}` placeholders.
    prompt_template: String,
    /// Optional system prompt template (triggers chat endpoint on Ollama).
    system_template: Option<String>,
    model: String,
    config: LlmConfig,
    output_strategy: OutputStrategy,
}

/// Result of a successful [`LlmCall::invoke`].
#[derive(Debug, Clone)]
pub struct CallOutput {
    /// Parsed output (`Value::String` for raw calls, `Value::Object` for JSON calls).
    pub value: Value,
    /// Response text exactly as the backend returned it.
    pub raw_response: String,
    /// Reasoning stripped from `<think>` blocks, if any.
    pub thinking: Option<String>,
    /// Model that produced the output.
    pub model: String,
}

impl CallOutput {
    /// The think-stripped text for raw calls, or the untouched response
    /// text otherwise.
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or(&self.raw_response)
    }
}

impl LlmCall {
    /// Create a new call with a prompt template.
    pub fn new(name: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_template: prompt_template.into(),
            system_template: None,
            model: "llama3.2:3b".to_string(),
            config: LlmConfig::default(),
            output_strategy: OutputStrategy::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn system_template(&self) -> Option<&str> {
        self.system_template.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn output_strategy(&self) -> OutputStrategy {
        self.output_strategy
    }

    /// Set a system prompt template (enables `/api/chat` mode on Ollama).
    pub fn with_system(mut self, template: impl Into<String>) -> Self {
        self.system_template = Some(template.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_output_strategy(mut self, strategy: OutputStrategy) -> Self {
        self.output_strategy = strategy;
        self
    }

    /// Shorthand: expect a JSON object back.
    pub fn expecting_json(mut self) -> Self {
        self.output_strategy = OutputStrategy::Json;
        self
    }

    fn build_request(&self, vars: &[(&str, &str)]) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            system_prompt: self
                .system_template
                .as_deref()
                .map(|t| prompt::render(t, vars)),
            prompt: prompt::render(&self.prompt_template, vars),
            config: self.config.clone(),
        }
    }

    fn build_output(&self, raw_text: String) -> Result<CallOutput> {
        let (thinking, cleaned) = parsing::extract_thinking(&raw_text);
        let value = self.output_strategy.apply(&cleaned)?;
        Ok(CallOutput {
            value,
            raw_response: raw_text,
            thinking,
            model: self.model.clone(),
        })
    }

    /// Render the templates with `vars`, call the backend once, and parse.
    pub async fn invoke(&self, ctx: &ExecCtx, vars: &[(&str, &str)]) -> Result<CallOutput> {
        let request = self.build_request(vars);
        let backend = ctx.backend.name();

        emit(
            &ctx.event_handler,
            Event::ModelCallStart {
                name: self.name.clone(),
                backend,
            },
        );
        tracing::debug!(
            call = %self.name,
            backend,
            model = %self.model,
            strategy = self.output_strategy.label(),
            "Model call starting"
        );

        let result = match ctx
            .backend
            .complete(&ctx.client, &ctx.base_url, &request)
            .await
        {
            Ok(response) => {
                tracing::debug!(call = %self.name, status = response.status, "Model call returned");
                self.build_output(response.text)
            }
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            tracing::debug!(call = %self.name, error = %e, "Model call failed");
        }
        emit(
            &ctx.event_handler,
            Event::ModelCallEnd {
                name: self.name.clone(),
                ok: result.is_ok(),
            },
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::events::FnEventHandler;
    use crate::ModelError;
    use std::sync::{Arc, Mutex};

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://unused").backend(mock).build()
    }

    #[test]
    fn test_build_request_renders_both_templates() {
        let call = LlmCall::new("t", "Text: {text}")
            .with_system("You extract {kind}.")
            .with_model("m");
        let req = call.build_request(&[("text", "hi {there}"), ("kind", "contacts")]);
        assert_eq!(req.prompt, "Text: hi {there}");
        assert_eq!(req.system_prompt.as_deref(), Some("You extract contacts."));
        assert_eq!(req.model, "m");
    }

    #[test]
    fn test_build_output_raw_strips_thinking() {
        let call = LlmCall::new("t", "p");
        let out = call.build_output("<think>hmm</think> Hello!".into()).unwrap();
        assert_eq!(out.text(), "Hello!");
        assert_eq!(out.thinking.as_deref(), Some("hmm"));
        assert_eq!(out.raw_response, "<think>hmm</think> Hello!");
    }

    #[test]
    fn test_build_output_json() {
        let call = LlmCall::new("t", "p").expecting_json();
        let out = call.build_output("```json\n{\"name\": \"Raj\"}\n```".into()).unwrap();
        assert_eq!(out.value["name"], "Raj");
        assert!(out.text().starts_with("```json"));
    }

    #[tokio::test]
    async fn test_invoke_round_trip() {
        let mock = Arc::new(MockBackend::fixed(r#"{"age": 30}"#));
        let ctx = ctx_with(mock.clone());
        let call = LlmCall::new("extract", "Input: {text}")
            .with_config(LlmConfig::default().with_json_mode(true))
            .expecting_json();

        let out = call.invoke(&ctx, &[("text", "I'm 30")]).await.unwrap();
        assert_eq!(out.value["age"], 30);

        let req = &mock.requests()[0];
        assert_eq!(req.prompt, "Input: I'm 30");
        assert!(req.config.json_mode);
        assert!(req.system_prompt.is_none());
    }

    #[tokio::test]
    async fn test_invoke_json_parse_failure() {
        let ctx = ctx_with(Arc::new(MockBackend::fixed("Sorry, no JSON today.")));
        let call = LlmCall::new("extract", "p").expecting_json();
        let err = call.invoke(&ctx, &[]).await.unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invoke_emits_start_and_end_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::failing()))
            .event_handler(Arc::new(FnEventHandler(move |e: Event| {
                sink.lock().unwrap().push(e);
            })))
            .build();

        let result = LlmCall::new("chat", "{message}").invoke(&ctx, &[("message", "hi")]).await;
        assert!(result.is_err());

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::ModelCallStart { name, backend: "mock" } if name == "chat"));
        assert!(matches!(&events[1], Event::ModelCallEnd { ok: false, .. }));
    }
}
