//! Email address handling: grammar check, deterministic rewrite, and
//! model-assisted suggestion.

pub mod rewrite;
pub mod suggest;

pub use rewrite::{rewrite_email, DOMAIN_FIXES};
pub use suggest::{EmailSuggester, EmailSuggestion, UNKNOWN_SENTINEL};

use regex::Regex;
use std::sync::LazyLock;

/// RFC 5322 dot-atom local part, dotted hostname labels, alphabetic TLD.
static EMAIL_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .unwrap()
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Why an address failed the grammar check, or `None` if it is valid.
pub fn email_problem(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("email address is empty");
    }
    if email.len() > MAX_EMAIL_LEN {
        return Some("email address is too long");
    }
    let Some((local, _)) = email.split_once('@') else {
        return Some("an email address must have an @-sign");
    };
    if local.len() > MAX_LOCAL_LEN {
        return Some("the part before the @-sign is too long");
    }
    if !EMAIL_GRAMMAR.is_match(email) {
        return Some("value is not a valid email address");
    }
    None
}

/// Whether `email` matches the accepted address grammar.
pub fn is_valid_email(email: &str) -> bool {
    email_problem(email).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid_email("raj_22@gmail.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.in"));
        assert!(is_valid_email("o'brien@example.ie"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_email("raj_22atgamil.com"));
        assert!(!is_valid_email("raj@gmail"));
        assert!(!is_valid_email("raj@gmail.c0m"));
        assert!(!is_valid_email(".raj@gmail.com"));
        assert!(!is_valid_email("raj..22@gmail.com"));
        assert!(!is_valid_email("raj@-gmail.com"));
        assert!(!is_valid_email("raj 22@gmail.com"));
    }

    #[test]
    fn test_problem_messages() {
        assert_eq!(email_problem("nobody"), Some("an email address must have an @-sign"));
        assert_eq!(email_problem(""), Some("email address is empty"));
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert_eq!(email_problem(&long_local), Some("the part before the @-sign is too long"));
    }
}
