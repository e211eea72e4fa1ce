//! Field validation checks.
//!
//! All checks are total functions over their input: they never panic and
//! report acceptance as a plain `bool`. Failure policy belongs to the
//! caller, which maps a failed check to a 403 rejection before any
//! persistence call is made.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email pattern")
});

/// Accepts a string whose character count lies in `min..=max`.
pub fn range_ok(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    min <= len && len <= max
}

/// Accepts a number inside the inclusive `[min, max]` range.
pub fn number_ok(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && min <= value && value <= max
}

/// Accepts a value matching the usual email grammar.
pub fn email_ok(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Accepts a value that parses as a well-formed absolute URL.
///
/// Callers hold scheme-less input (links and project homepages are stored
/// without one) and prefix `https://` before the check.
pub fn url_ok(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

/// Accepts a password whose length is inside the policy bounds and which
/// contains at least one uppercase letter, one lowercase letter, one digit
/// and one symbol, with no whitespace anywhere.
pub fn password_ok(value: &str, min: usize, max: usize) -> bool {
    if !range_ok(value, min, max) {
        return false;
    }
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| !c.is_alphanumeric());

    has_upper && has_lower && has_digit && has_symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn range_accepts_inside_bounds() {
        assert!(range_ok("aA", 2, 50));
        assert!(range_ok("abcdefghijklmnopqrstuvwxyz", 2, 50));
        assert!(!range_ok("", 2, 50));
        assert!(!range_ok("a", 2, 50));
        assert!(!range_ok(&"x".repeat(51), 2, 50));
    }

    #[test]
    fn range_counts_characters_not_bytes() {
        // Two characters, four bytes
        assert!(range_ok("éà", 2, 2));
    }

    proptest! {
        #[test]
        fn range_matches_length_predicate(s in ".{0,80}", min in 0usize..10, max in 10usize..60) {
            let len = s.chars().count();
            prop_assert_eq!(range_ok(&s, min, max), min <= len && len <= max);
        }
    }

    #[test]
    fn number_inclusive_bounds() {
        assert!(number_ok(1.0, 1.0, 9999.0));
        assert!(number_ok(9999.0, 1.0, 9999.0));
        assert!(!number_ok(0.5, 1.0, 9999.0));
        assert!(!number_ok(10000.0, 1.0, 9999.0));
        assert!(!number_ok(f64::NAN, 1.0, 9999.0));
    }

    #[test]
    fn email_grammar() {
        assert!(email_ok("hello@example.com"));
        assert!(!email_ok("notanemail"));
        assert!(!email_ok(""));
        assert!(!email_ok("a@b"));
    }

    #[test]
    fn url_wellformedness() {
        assert!(url_ok("https://www.example.com"));
        assert!(!url_ok("https://not a url"));
        assert!(!url_ok("not a url"));
        assert!(!url_ok(""));
        assert!(!url_ok("https://"));
    }

    #[test]
    fn password_policy() {
        assert!(password_ok("Abcdef1!", 8, 50));

        assert!(!password_ok("Abc1!", 8, 50)); // too short
        assert!(!password_ok(&"Abcdef1!".repeat(100), 8, 50)); // too long
        assert!(!password_ok("abcdef1!", 8, 50)); // no uppercase
        assert!(!password_ok("ABCDEF1!", 8, 50)); // no lowercase
        assert!(!password_ok("Abcdefgh!", 8, 50)); // no digit
        assert!(!password_ok("Abcdefg1", 8, 50)); // no symbol
        assert!(!password_ok("Abcdef1! ", 8, 50)); // whitespace
    }
}
