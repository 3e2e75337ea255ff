//! Field validation for request payloads.

use std::sync::LazyLock;

use regex::Regex;

use super::response::ErrorDetail;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Payloads that can check their own field constraints.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ErrorDetail>>;
}

/// Accumulates field errors under a location prefix (`body` or `query`).
#[derive(Debug, Default)]
pub struct Checker {
    location: &'static str,
    errors: Vec<ErrorDetail>,
}

impl Checker {
    pub fn body() -> Self {
        Self {
            location: "body",
            errors: Vec::new(),
        }
    }

    pub fn query() -> Self {
        Self {
            location: "query",
            errors: Vec::new(),
        }
    }

    pub fn fail(&mut self, field: &str, msg: impl Into<String>, kind: &str) {
        self.errors.push(ErrorDetail::field(self.location, field, msg, kind));
    }

    /// Length check on the trimmed value, in characters.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min {
            self.fail(
                field,
                format!("String should have at least {min} character{}", if min == 1 { "" } else { "s" }),
                "string_too_short",
            );
        } else if len > max {
            self.fail(field, format!("String should have at most {max} characters"), "string_too_long");
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.fail(field, "value is not a valid email address", "value_error");
        }
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min {
            self.fail(field, format!("Input should be greater than or equal to {min}"), "greater_than_equal");
        } else if value > max {
            self.fail(field, format!("Input should be less than or equal to {max}"), "less_than_equal");
        }
    }

    pub fn finish(self) -> Result<(), Vec<ErrorDetail>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 255 && EMAIL_RE.is_match(value)
}

/// Lowercase and trim an email for storage and lookup.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ava.patel@hrms.com"));
        assert!(is_valid_email("a+b@sub.example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_length_uses_trimmed_chars() {
        let mut checker = Checker::body();
        checker.length("full_name", "   ", 1, 120);
        checker.length("department", &"x".repeat(121), 1, 120);
        checker.length("ok", " Émile ", 1, 5);
        let errors = checker.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path(), "full_name");
        assert_eq!(errors[1].kind.as_deref(), Some("string_too_long"));
    }

    #[test]
    fn test_range_bounds() {
        let mut checker = Checker::query();
        checker.range("limit", 0, 1, 100);
        checker.range("offset", 5, 0, i64::MAX);
        let errors = checker.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc.as_ref().unwrap()[0], "query".into());
    }
}
