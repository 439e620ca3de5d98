//! `respond(message) -> reply`: the single entry point a front-end calls.

use crate::email::EmailSuggester;
use crate::error::Result;
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::extractor::Extractor;
use crate::llm_call::LlmCall;
use crate::report::CorrectionReport;
use crate::schema::{ContactRecord, ContactSchema};
use crate::validation::{ValidationOutcome, ValidationPipeline};
use crate::{config::Settings, ModelError};

/// Ties extraction, validation and fallback chat together.
///
/// Holds no per-request state; one instance can serve concurrent callers.
///
/// # Example
///
/// ```ignore
/// use contact_extractor::{Responder, Settings};
///
/// let settings = Settings::from_lookup(|k| std::env::var(k).ok())?;
/// let responder = Responder::from_settings(&settings)?;
/// println!("{}", responder.respond("I'm Raj, 22, raj_22 at gamil,com").await);
/// ```
#[derive(Debug)]
pub struct Responder {
    ctx: ExecCtx,
    extractor: Extractor,
    pipeline: ValidationPipeline,
    chat: LlmCall,
}

impl Responder {
    /// Build a responder around an existing context.
    pub fn new(ctx: ExecCtx, model_id: &str, default_region: &str) -> Result<Self> {
        let schema = ContactSchema::new(default_region)
            .map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            ctx,
            extractor: Extractor::new(model_id, &schema),
            pipeline: ValidationPipeline::new(schema, EmailSuggester::new(model_id)),
            chat: LlmCall::new("fallback-chat", "{message}").with_model(model_id),
        })
    }

    /// Validate `settings` and build the context and components from them.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Self::new(settings.exec_ctx(), &settings.model_id, &settings.default_region)
    }

    pub fn ctx(&self) -> &ExecCtx {
        &self.ctx
    }

    /// Produce a reply for one user message.
    ///
    /// A message that yields a contact gets either the validated record or
    /// the validation diagnostics. Anything else is answered by open-ended
    /// chat. Model failures never escape: the chat path reports them in the
    /// reply text.
    pub async fn respond(&self, message: &str) -> String {
        if let Some(candidate) = self.extractor.extract(&self.ctx, message).await {
            let outcome = self.pipeline.validate(&self.ctx, &candidate).await;
            return render_outcome(&outcome);
        }

        emit(&self.ctx.event_handler, Event::FallbackChat);
        tracing::debug!("No contact extracted; falling back to chat");
        match self.chat.invoke(&self.ctx, &[("message", message)]).await {
            Ok(output) => output.text().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Fallback chat failed");
                format!("An error occurred during fallback chat: {}", e)
            }
        }
    }
}

fn render_outcome(outcome: &ValidationOutcome) -> String {
    match outcome.record {
        Some(ref record) => render_success(record, &outcome.report),
        None => format!(
            "Could not validate the extracted contact details:\n\n{}",
            outcome
                .report
                .errors
                .as_deref()
                .unwrap_or("Unknown validation error.")
        ),
    }
}

fn render_success(record: &ContactRecord, report: &CorrectionReport) -> String {
    let body = serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{:?}", record));
    let mut msg = format!("Extracted & validated contact:\n{}", body);
    if let Some(ref c) = report.regex_correction {
        msg.push_str(&format!(
            "\n\n(Note: Applied regex fix to email) {}",
            serde_json::to_string(c).unwrap_or_default()
        ));
    }
    if let Some(ref c) = report.model_correction {
        msg.push_str(&format!(
            "\n\n(Note: Applied LLM fix to email) {}",
            serde_json::to_string(c).unwrap_or_default()
        ));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::events::FnEventHandler;
    use std::sync::{Arc, Mutex};

    fn responder(mock: Arc<MockBackend>) -> Responder {
        let ctx = ExecCtx::builder("http://unused").backend(mock).build();
        Responder::new(ctx, "test-model", "IN").unwrap()
    }

    #[tokio::test]
    async fn test_success_with_regex_note() {
        let mock = Arc::new(MockBackend::fixed(
            r#"{"name": "Raj", "age": 22, "email": "raj_22 at gamil,com", "phone": "09876543210"}"#,
        ));
        let reply = responder(mock.clone())
            .respond("Hi, I'm Raj (22). Mail raj_22 at gamil,com or call 09876543210")
            .await;

        assert!(reply.starts_with("Extracted & validated contact:\n{\n  \"name\": \"Raj\""));
        assert!(reply.contains("\"phone\": \"+919876543210\""));
        assert!(reply.ends_with(
            "\n\n(Note: Applied regex fix to email) {\"from\":\"raj_22 at gamil,com\",\"to\":\"raj_22@gmail.com\"}"
        ));
        assert!(!reply.contains("LLM fix"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_success_with_llm_note() {
        let mock = Arc::new(MockBackend::new(vec![
            r#"{"name": "Priya", "age": 28, "email": "priya@example.c0m"}"#.into(),
            "priya@example.com".into(),
        ]));
        let reply = responder(mock.clone()).respond("Priya, 28, priya@example.c0m").await;
        assert!(reply.contains("\"email\": \"priya@example.com\""));
        assert!(reply.contains("(Note: Applied LLM fix to email)"));
        assert!(!reply.contains("regex fix"));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_validation_failure_shows_diagnostics() {
        let mock = Arc::new(MockBackend::new(vec![
            r#"{"name": "Raj", "age": 22, "email": "raj@example.c0m"}"#.into(),
            "UNKNOWN".into(),
        ]));
        let reply = responder(mock).respond("Raj 22 raj@example.c0m").await;
        assert!(reply.starts_with("Could not validate the extracted contact details:\n\n1 validation error for ContactRecord\nemail"));
        assert!(!reply.contains("UNKNOWN"));
    }

    #[tokio::test]
    async fn test_fallback_chat_returns_text_verbatim() {
        let mock = Arc::new(MockBackend::new(vec![
            "I couldn't find a person in that.".into(),
            "It's sunny today!".into(),
        ]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock.clone())
            .event_handler(Arc::new(FnEventHandler(move |e: Event| {
                sink.lock().unwrap().push(e);
            })))
            .build();
        let responder = Responder::new(ctx, "m", "IN").unwrap();

        let reply = responder.respond("How's the weather?").await;
        assert_eq!(reply, "It's sunny today!");
        assert_eq!(mock.requests()[1].prompt, "How's the weather?");
        assert!(seen.lock().unwrap().iter().any(|e| matches!(e, Event::FallbackChat)));
    }

    #[tokio::test]
    async fn test_fallback_chat_error_is_reported() {
        let reply = responder(Arc::new(MockBackend::failing())).respond("hello").await;
        assert_eq!(
            reply,
            "An error occurred during fallback chat: HTTP 503: mock backend unavailable"
        );
    }

    #[test]
    fn test_unknown_validation_error_text() {
        let outcome = ValidationOutcome {
            record: None,
            report: CorrectionReport::default(),
        };
        assert_eq!(
            render_outcome(&outcome),
            "Could not validate the extracted contact details:\n\nUnknown validation error."
        );
    }

    #[test]
    fn test_bad_region_rejected() {
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::fixed("x")))
            .build();
        assert!(matches!(
            Responder::new(ctx, "m", "Atlantis"),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_settings_requires_key_for_gemini() {
        assert!(Responder::from_settings(&Settings::default()).is_err());
    }
}
