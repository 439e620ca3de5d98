//! Phone number normalization to E.164.
//!
//! Backed by the `phonenumber` crate (a port of libphonenumber's metadata),
//! so "valid" means the number has a correct length and prefix for the
//! region it belongs to, not merely that it contains digits.

use phonenumber::{country, Mode};
use thiserror::Error;

/// Why a phone number was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPhoneError {
    /// Nothing but whitespace was supplied.
    #[error("phone number is empty")]
    Empty,

    /// The default region is not an ISO 3166-1 alpha-2 code the metadata knows.
    #[error("unknown region code '{0}'")]
    UnknownRegion(String),

    /// The number could not be parsed structurally.
    #[error("invalid phone format: {0}")]
    Unparseable(String),

    /// Parsed, but not a valid number for its region.
    #[error("phone number is not valid for its region")]
    NotValid,
}

/// Parses and canonicalizes phone numbers against a default region.
///
/// # Example
///
/// ```
/// use contact_extractor::PhoneNormalizer;
///
/// let phones = PhoneNormalizer::new("IN").unwrap();
/// assert_eq!(phones.normalize("09876 543210").unwrap(), "+919876543210");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhoneNormalizer {
    region: country::Id,
}

impl PhoneNormalizer {
    /// Create a normalizer assuming `default_region` for numbers without a `+` prefix.
    pub fn new(default_region: &str) -> Result<Self, InvalidPhoneError> {
        let region = default_region
            .trim()
            .to_ascii_uppercase()
            .parse::<country::Id>()
            .map_err(|_| InvalidPhoneError::UnknownRegion(default_region.to_string()))?;
        Ok(Self { region })
    }

    /// The region assumed for national-format numbers.
    pub fn region(&self) -> country::Id {
        self.region
    }

    /// Normalize `raw` into E.164 (`+<country code><national number>`).
    pub fn normalize(&self, raw: &str) -> Result<String, InvalidPhoneError> {
        if raw.trim().is_empty() {
            return Err(InvalidPhoneError::Empty);
        }

        let cleaned = clean(raw);
        if cleaned.trim_start_matches('+').is_empty() {
            return Err(InvalidPhoneError::Unparseable(format!("no digits in '{}'", raw)));
        }

        // International numbers carry their own country code.
        let region = if cleaned.starts_with('+') {
            None
        } else {
            Some(self.region)
        };

        let number = phonenumber::parse(region, &cleaned)
            .map_err(|e| InvalidPhoneError::Unparseable(e.to_string()))?;

        if !phonenumber::is_valid(&number) {
            return Err(InvalidPhoneError::NotValid);
        }

        Ok(number.format().mode(Mode::E164).to_string())
    }
}

/// Normalize `raw` against `default_region` in one call.
pub fn normalize_phone(raw: &str, default_region: &str) -> Result<String, InvalidPhoneError> {
    PhoneNormalizer::new(default_region)?.normalize(raw)
}

/// Keep only digits, plus a `+` if the number starts with one.
fn clean(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if raw.trim_start().starts_with('+') {
        format!("+{}", digits)
    } else {
        digits
    }
}
