//! Model-assisted email suggestion.
//!
//! Used only after the deterministic rewrite has failed. The output is
//! untrusted: callers re-validate whatever comes back.

use crate::config::LlmConfig;
use crate::exec_ctx::ExecCtx;
use crate::llm_call::LlmCall;
use crate::parsing::first_email;

/// Literal the model is asked to return when it cannot correct an address.
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";

const SUGGEST_PROMPT: &str = r#"You are an email-correction function.
Given a possibly mistyped email, return ONLY the corrected email.
If you cannot confidently correct it, return EXACTLY: UNKNOWN

Input: "raj_22 at gmail,com"
Output: raj_22@gmail.com

Input: "foo at bar"
Output: UNKNOWN

Input: "{raw}"
Output:"#;

/// Result of asking the model for a corrected address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailSuggestion {
    /// An email-shaped token taken from the model's answer.
    Corrected(String),
    /// The model declined, answered with nothing usable, or failed.
    Unknown,
}

impl EmailSuggestion {
    /// The suggested address, or [`UNKNOWN_SENTINEL`].
    pub fn as_str(&self) -> &str {
        match self {
            EmailSuggestion::Corrected(email) => email,
            EmailSuggestion::Unknown => UNKNOWN_SENTINEL,
        }
    }

    /// Interpret raw model text.
    ///
    /// The sentinel anywhere in the text (any case) wins over an email token,
    /// since a hedging answer like "UNKNOWN, maybe a@b.com" is not confident.
    pub fn from_response(text: &str) -> Self {
        if text.to_uppercase().contains(UNKNOWN_SENTINEL) {
            return EmailSuggestion::Unknown;
        }
        match first_email(text) {
            Some(email) => EmailSuggestion::Corrected(email.to_string()),
            None => EmailSuggestion::Unknown,
        }
    }
}

/// Asks the external model to propose a corrected email address.
#[derive(Debug)]
pub struct EmailSuggester {
    call: LlmCall,
}

impl EmailSuggester {
    /// Create a suggester that queries `model_id`.
    pub fn new(model_id: impl Into<String>) -> Self {
        let call = LlmCall::new("suggest-email", SUGGEST_PROMPT)
            .with_model(model_id)
            .with_config(LlmConfig::default().with_temperature(0.0).with_max_tokens(64));
        Self { call }
    }

    /// Suggest a correction for `raw`. Never fails: any model error becomes
    /// [`EmailSuggestion::Unknown`].
    pub async fn suggest(&self, ctx: &ExecCtx, raw: &str) -> EmailSuggestion {
        match self.call.invoke(ctx, &[("raw", raw)]).await {
            Ok(output) => {
                let suggestion = EmailSuggestion::from_response(output.text());
                tracing::debug!(raw, suggestion = suggestion.as_str(), "Model email suggestion");
                suggestion
            }
            Err(e) => {
                tracing::warn!(raw, error = %e, "Email suggestion call failed");
                EmailSuggestion::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::Arc;

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://unused").backend(mock).build()
    }

    #[test]
    fn test_from_response_takes_first_email() {
        assert_eq!(
            EmailSuggestion::from_response("raj_22@gmail.com"),
            EmailSuggestion::Corrected("raj_22@gmail.com".into())
        );
        assert_eq!(
            EmailSuggestion::from_response("Output: raj@yahoo.com (or raj@ymail.com)"),
            EmailSuggestion::Corrected("raj@yahoo.com".into())
        );
    }

    #[test]
    fn test_from_response_sentinel_any_case() {
        assert_eq!(EmailSuggestion::from_response("UNKNOWN"), EmailSuggestion::Unknown);
        assert_eq!(EmailSuggestion::from_response("unknown."), EmailSuggestion::Unknown);
        assert_eq!(
            EmailSuggestion::from_response("Unknown - maybe foo@bar.com"),
            EmailSuggestion::Unknown
        );
    }

    #[test]
    fn test_from_response_without_email() {
        assert_eq!(
            EmailSuggestion::from_response("I'm not sure what you meant."),
            EmailSuggestion::Unknown
        );
        assert_eq!(EmailSuggestion::Unknown.as_str(), UNKNOWN_SENTINEL);
    }

    #[tokio::test]
    async fn test_suggest_embeds_raw_in_prompt() {
        let mock = Arc::new(MockBackend::fixed("priya@outlook.com"));
        let ctx = ctx_with(mock.clone());
        let suggester = EmailSuggester::new("test-model");

        let suggestion = suggester.suggest(&ctx, "priya at outlok").await;
        assert_eq!(suggestion, EmailSuggestion::Corrected("priya@outlook.com".into()));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Input: \"priya at outlok\"\nOutput:"));
        assert!(requests[0].prompt.contains("return EXACTLY: UNKNOWN"));
        assert_eq!(requests[0].model, "test-model");
    }

    #[tokio::test]
    async fn test_suggest_failure_becomes_sentinel() {
        let mock = Arc::new(MockBackend::failing());
        let ctx = ctx_with(mock.clone());
        let suggestion = EmailSuggester::new("m").suggest(&ctx, "whatever").await;
        assert_eq!(suggestion, EmailSuggestion::Unknown);
        assert_eq!(mock.calls(), 1);
    }
}
