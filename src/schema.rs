//! The contact record contract.
//!
//! A [`CandidateRecord`] is whatever field mapping the model produced. The
//! only way to obtain a [`ContactRecord`] is [`ContactSchema::validate`], so
//! holding a record means every field already passed its constraint.

use crate::email;
use crate::phone::{InvalidPhoneError, PhoneNormalizer};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// Unvalidated field mapping, as produced by extraction.
pub type CandidateRecord = Map<String, Value>;

/// Oldest age the schema accepts.
pub const MAX_AGE: u8 = 120;

/// A fully validated contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    name: String,
    age: u8,
    email: Option<String>,
    phone: Option<String>,
}

impl ContactRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Phone number in E.164 form.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

/// One field that failed its constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    /// The offending value, or `None` when the field was missing.
    pub input: Option<Value>,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>, input: Option<&Value>) -> Self {
        Self {
            field,
            message: message.into(),
            input: input.cloned(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  {}", self.field, self.message)?;
        if let Some(ref input) = self.input {
            write!(f, " [input_value={}]", input)?;
        }
        Ok(())
    }
}

/// Every constraint violation found in one validation attempt.
///
/// `Display` renders the full diagnostic, one field per block:
///
/// ```text
/// 1 validation error for ContactRecord
/// email
///   value is not a valid email address: an email address must have an @-sign [input_value="raj at x"]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaValidationError {
    pub errors: Vec<FieldError>,
}

impl SchemaValidationError {
    /// Whether `field` is among the failures.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.errors.len();
        write!(
            f,
            "{} validation error{} for ContactRecord",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

/// Validates candidate records into [`ContactRecord`]s.
#[derive(Debug, Clone, Copy)]
pub struct ContactSchema {
    phones: PhoneNormalizer,
}

impl ContactSchema {
    /// Schema whose phone rule assumes `default_region` for national numbers.
    pub fn new(default_region: &str) -> Result<Self, InvalidPhoneError> {
        Ok(Self {
            phones: PhoneNormalizer::new(default_region)?,
        })
    }

    pub fn phones(&self) -> &PhoneNormalizer {
        &self.phones
    }

    /// Check every field of `candidate`; all-or-nothing.
    ///
    /// Unknown keys are ignored. `email` and `phone` may be missing, `null`,
    /// or blank, all of which mean "not provided".
    ///
    /// # Example
    ///
    /// ```
    /// use contact_extractor::{CandidateRecord, ContactSchema};
    /// use serde_json::json;
    ///
    /// let schema = ContactSchema::new("IN").unwrap();
    /// let candidate: CandidateRecord = serde_json::from_value(json!({
    ///     "name": "Raj", "age": 22, "phone": "098765 43210"
    /// })).unwrap();
    /// let record = schema.validate(&candidate).unwrap();
    /// assert_eq!(record.phone(), Some("+919876543210"));
    /// ```
    pub fn validate(&self, candidate: &CandidateRecord) -> Result<ContactRecord, SchemaValidationError> {
        let mut errors = Vec::new();

        let name = check_name(candidate.get("name")).map_err(|e| errors.push(e)).ok();
        let age = check_age(candidate.get("age")).map_err(|e| errors.push(e)).ok();
        let email = check_email(candidate.get("email")).map_err(|e| errors.push(e)).ok();
        let phone = self
            .check_phone(candidate.get("phone"))
            .map_err(|e| errors.push(e))
            .ok();

        match (name, age, email, phone) {
            (Some(name), Some(age), Some(email), Some(phone)) => {
                Ok(ContactRecord {
                    name,
                    age,
                    email,
                    phone,
                })
            }
            _ => Err(SchemaValidationError { errors }),
        }
    }

    fn check_phone(&self, value: Option<&Value>) -> Result<Option<String>, FieldError> {
        let raw = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) if n.is_u64() => n.to_string(),
            Some(_) => return Err(FieldError::new("phone", "Input should be a valid string", value)),
        };
        self.phones
            .normalize(&raw)
            .map(Some)
            .map_err(|e| FieldError::new("phone", format!("Value error, {}", e), value))
    }

    /// Machine-readable output instructions for the extraction prompt.
    pub fn format_instructions(&self) -> String {
        let schema = json!({
            "title": "ContactRecord",
            "type": "object",
            "properties": {
                "name": {"title": "Name", "type": "string", "minLength": 1},
                "age": {"title": "Age", "type": "integer", "minimum": 0, "maximum": MAX_AGE},
                "email": {"title": "Email", "type": ["string", "null"], "format": "email"},
                "phone": {
                    "title": "Phone",
                    "type": ["string", "null"],
                    "description": "Phone number as written; it is normalized to E.164 afterwards"
                }
            },
            "required": ["name", "age"]
        });
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
             As an example, for the schema {{\"properties\": {{\"foo\": {{\"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
             the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
             The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
             Here is the output schema:\n```\n{}\n```",
            schema
        )
    }
}

/// The non-blank `email` string of a candidate, if any.
pub fn candidate_email(candidate: &CandidateRecord) -> Option<&str> {
    candidate
        .get("email")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn check_name(value: Option<&Value>) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::new("name", "Field required", None)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(FieldError::new(
            "name",
            "String should have at least 1 character",
            value,
        )),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(FieldError::new("name", "Input should be a valid string", value)),
    }
}

fn check_age(value: Option<&Value>) -> Result<u8, FieldError> {
    let n: i64 = match value {
        None => return Err(FieldError::new("age", "Field required", None)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => f as i64,
                _ => {
                    return Err(FieldError::new(
                        "age",
                        "Input should be a valid integer, got a number with a fractional part",
                        value,
                    ))
                }
            },
        },
        Some(Value::String(s)) => s.trim().parse().map_err(|_| {
            FieldError::new("age", "Input should be a valid integer, unable to parse string as an integer", value)
        })?,
        Some(_) => return Err(FieldError::new("age", "Input should be a valid integer", value)),
    };

    if n < 0 {
        return Err(FieldError::new("age", "Input should be greater than or equal to 0", value));
    }
    if n > i64::from(MAX_AGE) {
        return Err(FieldError::new(
            "age",
            format!("Input should be less than or equal to {}", MAX_AGE),
            value,
        ));
    }
    Ok(n as u8)
}

fn check_email(value: Option<&Value>) -> Result<Option<String>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match email::email_problem(s) {
            None => Ok(Some(s.clone())),
            Some(problem) => Err(FieldError::new(
                "email",
                format!("value is not a valid email address: {}", problem),
                value,
            )),
        },
        Some(_) => Err(FieldError::new("email", "Input should be a valid string", value)),
    }
}
