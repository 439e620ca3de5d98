//! How [`LlmCall`](crate::llm_call::LlmCall) turns model text into a value.

use crate::error::Result;
use crate::parsing;
use crate::ModelError;
use serde_json::Value;

/// Parsing applied to the think-stripped response text.
///
/// # Example
///
/// ```
/// use contact_extractor::output_strategy::OutputStrategy;
///
/// let value = OutputStrategy::Json.apply("```json\n{\"age\": 3}\n```").unwrap();
/// assert_eq!(value["age"], 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStrategy {
    /// Keep the text as a `Value::String`. Never fails.
    #[default]
    Raw,

    /// Extract a JSON object: bare, fenced in markdown, or embedded in prose.
    /// Anything else is a [`ModelError::Parse`].
    Json,
}

impl OutputStrategy {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            OutputStrategy::Raw => "raw",
            OutputStrategy::Json => "json",
        }
    }

    /// Parse `cleaned` according to this strategy.
    pub fn apply(&self, cleaned: &str) -> Result<Value> {
        match self {
            OutputStrategy::Raw => Ok(Value::String(cleaned.to_string())),
            OutputStrategy::Json => parsing::extract_json_object(cleaned)
                .map(Value::Object)
                .ok_or_else(|| {
                    ModelError::Parse(format!(
                        "expected a JSON object, got: {}",
                        preview(cleaned)
                    ))
                }),
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
