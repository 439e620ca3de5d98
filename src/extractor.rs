//! Free text to candidate contact record.
//!
//! The model is asked for a JSON object shaped like [`ContactRecord`](crate::ContactRecord).
//! Whatever it returns stays a [`CandidateRecord`] until the validation
//! pipeline has checked it, so a malformed email still reaches the
//! correction passes instead of being thrown away here.

use crate::config::LlmConfig;
use crate::exec_ctx::ExecCtx;
use crate::llm_call::LlmCall;
use crate::schema::{CandidateRecord, ContactSchema};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a strict information extractor. Your primary goal is to extract contact \
details for a person based on the user's text. Return ONLY valid JSON that matches the requested schema. \
If a piece of information (name, age, email, phone) is not mentioned, you MUST omit the key or set it to \
a reasonable default (e.g., age 0, name 'Unknown'). Do not guess or invent information.";

const HUMAN_PROMPT: &str =
    "Extract a Person (name, age, email?, phone?) from this text:\n\n{text}\n\n{format_instructions}";

/// Name the model is told to use when none is mentioned.
pub const PLACEHOLDER_NAME: &str = "Unknown";

/// Asks the model to pull a contact out of free text.
#[derive(Debug)]
pub struct Extractor {
    call: LlmCall,
    format_instructions: String,
}

impl Extractor {
    pub fn new(model_id: impl Into<String>, schema: &ContactSchema) -> Self {
        let call = LlmCall::new("extract-contact", HUMAN_PROMPT)
            .with_system(SYSTEM_PROMPT)
            .with_model(model_id)
            .with_config(LlmConfig::default().with_temperature(0.0).with_json_mode(true))
            .expecting_json();
        Self {
            call,
            format_instructions: schema.format_instructions(),
        }
    }

    /// Extract a candidate record from `text`.
    ///
    /// Returns `None` when the call fails, the reply holds no JSON object, or
    /// the object carries nothing but placeholders. Failures are logged and
    /// never raised.
    pub async fn extract(&self, ctx: &ExecCtx, text: &str) -> Option<CandidateRecord> {
        let output = match self
            .call
            .invoke(
                ctx,
                &[
                    ("text", text),
                    ("format_instructions", self.format_instructions.as_str()),
                ],
            )
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "Contact extraction failed");
                return None;
            }
        };

        let Value::Object(candidate) = output.value else {
            tracing::warn!("Extraction returned a non-object value");
            return None;
        };

        if !has_contact_details(&candidate) {
            tracing::debug!("Extraction found no contact details");
            return None;
        }
        tracing::debug!(fields = candidate.len(), "Extracted candidate record");
        Some(candidate)
    }
}

/// Whether `candidate` holds anything beyond the defaults the model is told
/// to use for missing fields.
pub fn has_contact_details(candidate: &CandidateRecord) -> bool {
    let present = |key: &str| match candidate.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };

    let real_name = candidate
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .is_some_and(|n| !n.is_empty() && !n.eq_ignore_ascii_case(PLACEHOLDER_NAME));
    let real_age = match candidate.get("age") {
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !matches!(s.trim(), "" | "0"),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };

    real_name || real_age || present("email") || present("phone")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use serde_json::json;
    use std::sync::Arc;

    fn extractor() -> Extractor {
        Extractor::new("test-model", &ContactSchema::new("IN").unwrap())
    }

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://unused").backend(mock).build()
    }

    fn map(value: Value) -> CandidateRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_extracts_candidate_and_keeps_bad_email() {
        let mock = Arc::new(MockBackend::fixed(
            r#"{"name": "Raj", "age": 22, "email": "raj_22 at gamil,com", "phone": "09876543210"}"#,
        ));
        let candidate = extractor()
            .extract(&ctx_with(mock.clone()), "I'm Raj, 22, raj_22 at gamil,com, 09876543210")
            .await
            .unwrap();
        assert_eq!(candidate["email"], "raj_22 at gamil,com");

        let req = &mock.requests()[0];
        assert!(req.prompt.starts_with(
            "Extract a Person (name, age, email?, phone?) from this text:\n\nI'm Raj, 22"
        ));
        assert!(req.prompt.contains("Here is the output schema:"));
        assert!(req.system_prompt.as_deref().unwrap().contains("Do not guess or invent"));
        assert!(req.config.json_mode);
        assert_eq!(req.config.temperature, 0.0);
    }

    #[tokio::test]
    async fn test_user_braces_are_not_expanded() {
        let mock = Arc::new(MockBackend::fixed(r#"{"name": "A", "age": 1}"#));
        extractor()
            .extract(&ctx_with(mock.clone()), "my handle is {format_instructions}")
            .await
            .unwrap();
        assert!(mock.requests()[0].prompt.contains("my handle is {format_instructions}"));
    }

    #[tokio::test]
    async fn test_placeholder_only_is_absent() {
        let mock = Arc::new(MockBackend::fixed(r#"{"name": "Unknown", "age": 0}"#));
        assert!(extractor().extract(&ctx_with(mock), "What's the weather?").await.is_none());
    }

    #[tokio::test]
    async fn test_no_json_is_absent() {
        let mock = Arc::new(MockBackend::fixed("There is no contact in that message."));
        assert!(extractor().extract(&ctx_with(mock), "hello").await.is_none());
    }

    #[tokio::test]
    async fn test_call_failure_is_absent() {
        let mock = Arc::new(MockBackend::failing());
        assert!(extractor().extract(&ctx_with(mock), "hello").await.is_none());
    }

    #[tokio::test]
    async fn test_fenced_reply() {
        let mock = Arc::new(MockBackend::fixed(
            "```json\n{\"name\": \"Asha\", \"age\": 31}\n```",
        ));
        let candidate = extractor().extract(&ctx_with(mock), "Asha, 31").await.unwrap();
        assert_eq!(candidate["name"], "Asha");
    }

    #[test]
    fn test_has_contact_details() {
        assert!(!has_contact_details(&map(json!({}))));
        assert!(!has_contact_details(&map(json!({"name": " unknown ", "age": 0, "email": null}))));
        assert!(!has_contact_details(&map(json!({"name": "", "age": "0", "phone": ""}))));
        assert!(has_contact_details(&map(json!({"name": "Unknown", "age": 0, "phone": "98765"}))));
        assert!(has_contact_details(&map(json!({"name": "Li"}))));
        assert!(has_contact_details(&map(json!({"age": 40}))));
        assert!(has_contact_details(&map(json!({"email": "x@y.z"}))));
    }
}
