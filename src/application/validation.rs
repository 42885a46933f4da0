//! Field rules shared by the create validators
//!
//! Rules push their message into a [`Violations`] list instead of returning
//! early, so one request reports every failed rule at once.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static CPF_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{3}\.?\d{3}\.?\d{3}-?\d{2}$").expect("CPF pattern is a valid regex")
});

/// `ddd.ddd.ddd-dd`, with the dots and dash optional
pub fn is_valid_cpf_format(cpf: &str) -> bool {
    CPF_FORMAT.is_match(cpf)
}

/// Accumulated rule failures for one request
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Records `message` when `failed` holds
    pub fn check(&mut self, failed: bool, message: &str) {
        if failed {
            self.push(message);
        }
    }

    /// Required, minimum and maximum length rules for a text field.
    /// Returns `false` when the value is missing so dependent rules can be skipped.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> bool {
        let value = value.trim();
        if value.is_empty() {
            self.push(format!("{field} is required."));
            return false;
        }

        let length = value.chars().count();
        self.check(
            length < min,
            &format!("{field} must be at least {min} characters."),
        );
        self.check(
            length > max,
            &format!("{field} must be at most {max} characters."),
        );
        true
    }

    /// An optional reference must not be the nil UUID when supplied
    pub fn optional_id(&mut self, value: Option<Uuid>, message: &str) -> Option<Uuid> {
        match value {
            Some(id) if id.is_nil() => {
                self.push(message);
                None
            }
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}
