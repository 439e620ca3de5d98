//! Parsing utilities for LLM responses.
//!
//! Defensive extraction of reasoning blocks, JSON objects, and email-shaped
//! tokens from potentially messy model text. Models wrap JSON in markdown
//! fences, prefix it with prose, or think out loud first; these helpers
//! cope with all three without another model call.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Email-shaped token: local part, `@`, dotted domain with an alphabetic TLD.
static EMAIL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)*\.[A-Za-z]{2,}").unwrap());

/// Split `<think>...</think>` and `<thinking>...</thinking>` blocks off a response.
///
/// Returns `(thinking_content, cleaned_text)`. An unterminated block swallows
/// the rest of the text, since nothing after it can be trusted as an answer.
pub fn extract_thinking(text: &str) -> (Option<String>, String) {
    let mut cleaned = text.to_string();
    let mut thoughts = Vec::new();

    for (open, close) in [("<think>", "</think>"), ("<thinking>", "</thinking>")] {
        while let Some(start) = cleaned.find(open) {
            let body_start = start + open.len();
            match cleaned[body_start..].find(close) {
                Some(offset) => {
                    let body_end = body_start + offset;
                    thoughts.push(cleaned[body_start..body_end].trim().to_string());
                    cleaned.replace_range(start..body_end + close.len(), "");
                }
                None => {
                    thoughts.push(cleaned[body_start..].trim().to_string());
                    cleaned.truncate(start);
                }
            }
        }
    }

    thoughts.retain(|t| !t.is_empty());
    let thinking = if thoughts.is_empty() {
        None
    } else {
        Some(thoughts.join("\n"))
    };
    (thinking, cleaned.trim().to_string())
}

/// Return the body of the first markdown code fence, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Find the last balanced top-level `{...}` region, skipping braces inside
/// JSON strings.
fn last_braced(text: &str) -> Option<&str> {
    let mut best = None;
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        best = Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    best
}

/// Extract a JSON object from model output.
///
/// Tries, in order: the whole (think-stripped) text, the first fenced code
/// block, and the last balanced `{...}` region. Anything that is not a JSON
/// object (arrays, scalars, prose) yields `None`.
///
/// # Example
///
/// ```
/// use contact_extractor::parsing::extract_json_object;
///
/// let obj = extract_json_object("Sure! ```json\n{\"name\": \"Raj\"}\n```").unwrap();
/// assert_eq!(obj["name"], "Raj");
/// ```
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let (_, cleaned) = extract_thinking(text);
    let as_object = |candidate: &str| match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };

    as_object(&cleaned)
        .or_else(|| fenced_block(&cleaned).and_then(as_object))
        .or_else(|| last_braced(&cleaned).and_then(as_object))
}

/// Return the first email-shaped token in `text`, if any.
pub fn first_email(text: &str) -> Option<&str> {
    EMAIL_TOKEN.find(text).map(|m| m.as_str())
}
