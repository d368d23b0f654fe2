//! Field checks with the wording API clients already know.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::error::{DomainError, FieldViolation};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("Invalid regex pattern")
});

pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Collects every violation so a request reports all bad fields at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Non-blank text of at most `max` characters.
    pub fn text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, BLANK);
        } else if value.chars().count() > max {
            self.push(field, too_long(max));
        }
    }

    /// Like [`Violations::text`], but a missing value is an error unless `partial`.
    pub fn text_opt(&mut self, field: &str, value: Option<&str>, max: usize, partial: bool) {
        match value {
            Some(v) => self.text(field, v, max),
            None if !partial => self.push(field, REQUIRED),
            None => {}
        }
    }

    /// Empty is allowed; anything else must look like an address.
    pub fn email(&mut self, field: &str, value: &str, max: usize) {
        if value.is_empty() {
            return;
        }
        if value.chars().count() > max {
            self.push(field, too_long(max));
        } else if !EMAIL_RE.is_match(value) {
            self.push(field, INVALID_EMAIL);
        }
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation { errors: self.0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(v: Violations) -> Vec<(String, String)> {
        match v.into_result() {
            Ok(()) => vec![],
            Err(DomainError::Validation { errors }) => errors
                .into_iter()
                .map(|e| (e.field, e.message))
                .collect(),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn text_rules() {
        let mut v = Violations::default();
        v.text("full_name", "   ", 50);
        v.text("job", &"x".repeat(51), 50);
        v.text("phone", "555-0100", 15);
        assert_eq!(
            messages(v),
            vec![
                ("full_name".to_string(), BLANK.to_string()),
                ("job".to_string(), too_long(50)),
            ]
        );
    }

    #[test]
    fn missing_values_depend_on_partial() {
        let mut v = Violations::default();
        v.text_opt("job", None, 50, true);
        assert!(v.into_result().is_ok());

        let mut v = Violations::default();
        v.text_opt("job", None, 50, false);
        assert_eq!(messages(v), vec![("job".to_string(), REQUIRED.to_string())]);
    }

    #[test]
    fn email_rules() {
        for ok in ["", "ana@example.com", "first.last+tag@mail.example.org"] {
            let mut v = Violations::default();
            v.email("email", ok, 254);
            assert!(v.into_result().is_ok(), "{ok} should be accepted");
        }
        for bad in ["ana", "ana@", "@example.com", "ana@example", "a b@example.com"] {
            let mut v = Violations::default();
            v.email("email", bad, 254);
            assert!(v.into_result().is_err(), "{bad} should be rejected");
        }
    }
}
