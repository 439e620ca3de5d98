//! Deterministic email rewrite pass.
//!
//! Fixes the obfuscations and typos people actually type ("raj at gmail dot
//! com", "raj(at)gmail,com", "raj@gamil.com") without a model call. The pass
//! is total and idempotent: feeding its output back in changes nothing.

use regex::Regex;
use std::sync::LazyLock;

/// Known domain misspellings and their corrections.
///
/// No correction appears as a misspelling, which keeps the rewrite idempotent.
pub const DOMAIN_FIXES: &[(&str, &str)] = &[
    ("gamil.com", "gmail.com"),
    ("gmial.com", "gmail.com"),
    ("gmail.con", "gmail.com"),
    ("gnail.com", "gmail.com"),
    ("yaho.com", "yahoo.com"),
    ("yhoo.com", "yahoo.com"),
    ("outlok.com", "outlook.com"),
    ("hotmal.com", "hotmail.com"),
    ("icloud,com", "icloud.com"),
];

static SPOKEN_AT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+at\s+").unwrap());
static SPOKEN_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+dot\s+").unwrap());
static BRACKET_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[(\[]\s*at\s*[)\]]").unwrap());
static BRACKET_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[(\[]\s*dot\s*[)\]]").unwrap());

/// Rewrite a raw email string into its most plausible intended form.
///
/// Steps, in order:
/// 1. trim; `(at)`/`[at]` → `@` (only when no `@` is present yet),
///    `(dot)`/`[dot]` → `.`
/// 2. spoken ` at ` → `@` (again only without an `@`), spoken ` dot ` → `.`
/// 3. drop all whitespace, then repeat step 1 for tokens the removal joined up
/// 4. every `,` → `.`, then strip trailing `;` `,` `.` runs
/// 5. replace the domain (after the first `@`) if it is a known misspelling
///
/// # Example
///
/// ```
/// use contact_extractor::rewrite_email;
///
/// assert_eq!(rewrite_email("raj_22 at gamil,com"), "raj_22@gmail.com");
/// assert_eq!(rewrite_email("asha[at]yaho(dot)com;"), "asha@yahoo.com");
/// ```
pub fn rewrite_email(raw: &str) -> String {
    let mut s = replace_tokens(raw.trim());

    if !s.contains('@') {
        s = SPOKEN_AT.replace_all(&s, "@").into_owned();
    }
    s = SPOKEN_DOT.replace_all(&s, ".").into_owned();
    s.retain(|c| !c.is_whitespace());

    s = replace_tokens(&s).replace(',', ".");
    s = strip_trailing(&s).to_string();

    if let Some((local, domain)) = s.split_once('@') {
        let domain = fix_domain(domain);
        s = format!("{}@{}", local, domain);
    }

    strip_trailing(&s).to_string()
}

fn replace_tokens(s: &str) -> String {
    let s = if s.contains('@') {
        s.to_string()
    } else {
        BRACKET_AT.replace_all(s, "@").into_owned()
    };
    BRACKET_DOT.replace_all(&s, ".").into_owned()
}

fn fix_domain(domain: &str) -> &str {
    let lowered = domain.to_ascii_lowercase();
    DOMAIN_FIXES
        .iter()
        .find(|(bad, _)| *bad == lowered)
        .map(|(_, good)| *good)
        .unwrap_or(domain)
}

fn strip_trailing(s: &str) -> &str {
    s.trim_end_matches(|c: char| matches!(c, ';' | ',' | '.') || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_obfuscation() {
        assert_eq!(rewrite_email("raj_22 at gamil,com"), "raj_22@gmail.com");
        assert_eq!(rewrite_email("john dot smith AT example DOT org"), "john.smith@example.org");
    }

    #[test]
    fn test_bracket_obfuscation() {
        assert_eq!(rewrite_email("raj(at)gmail(dot)com"), "raj@gmail.com");
        assert_eq!(rewrite_email("raj [at] gmail [dot] com"), "raj@gmail.com");
    }

    #[test]
    fn test_at_token_kept_when_at_sign_present() {
        assert_eq!(rewrite_email("a(at)b@example.com"), "a(at)b@example.com");
    }

    #[test]
    fn test_commas_and_trailing_punctuation() {
        assert_eq!(rewrite_email("  raj@gmail,com ;. "), "raj@gmail.com");
        assert_eq!(rewrite_email("raj@gamil.com."), "raj@gmail.com");
    }

    #[test]
    fn test_domain_lookup_is_case_insensitive() {
        assert_eq!(rewrite_email("Raj@GAMIL.com"), "Raj@gmail.com");
    }

    #[test]
    fn test_unknown_domain_untouched() {
        assert_eq!(rewrite_email("raj@example.c0m"), "raj@example.c0m");
    }

    #[test]
    fn test_no_at_sign_still_cleaned() {
        assert_eq!(rewrite_email("raj gmail,com,"), "rajgmail.com");
        assert_eq!(rewrite_email(""), "");
    }

    #[test]
    fn test_every_table_entry_is_fixed() {
        for local in ["raj", "a.b+c", "x_1"] {
            for (bad, good) in DOMAIN_FIXES {
                assert_eq!(
                    rewrite_email(&format!("{}@{}", local, bad)),
                    format!("{}@{}", local, good),
                    "fixing {}",
                    bad
                );
            }
        }
    }

    #[test]
    fn test_table_closed_over_outputs() {
        for (_, good) in DOMAIN_FIXES {
            assert!(DOMAIN_FIXES.iter().all(|(bad, _)| bad != good));
        }
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "raj_22 at gamil,com",
            "raj@gamil.com.",
            "a(at)b(at)c",
            "((at)at)",
            "(d(dot)ot)",
            "( at ) gmail ( dot ) com",
            "  ;;,, ",
            "ünïcode at dömain dot com",
            "x@@yaho.com",
        ];
        for raw in samples {
            let once = rewrite_email(raw);
            assert_eq!(rewrite_email(&once), once, "not idempotent for {:?}", raw);
        }
    }
}
