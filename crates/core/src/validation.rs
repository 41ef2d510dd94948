//! Declarative checks for configuration values and corpus identifiers
//!
//! A [`Validator`] collects every violation instead of stopping at the
//! first, so a bad config file is reported in one go.
//!
//! # Example
//!
//! ```rust
//! use kinderfrage_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("id", "q12")
//!     .range("threshold", 0.4, 0.0, 1.0)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Pattern every corpus record id must match.
pub const RECORD_ID_PATTERN: &str = r"^q[A-Za-z0-9]{1,10}$";

static RECORD_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(RECORD_ID_PATTERN).unwrap_or_else(|e| panic!("invalid record id pattern: {e}"))
});

/// Kind of check a value failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Blank where a value is needed
    Required,
    /// Does not match the expected shape
    Pattern,
    /// Outside the inclusive bounds
    Range,
    /// Caller-supplied check
    Custom,
    /// Legal but probably a mistake; never fails validation
    Advisory,
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending value
    pub field: String,
    /// Which check failed
    pub rule: Rule,
    /// Human-readable explanation
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Violations found by a [`Validator`], split by severity
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    errors: Vec<Violation>,
    warnings: Vec<Violation>,
}

impl ValidationResult {
    /// No errors (warnings allowed)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations that fail validation
    #[must_use]
    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    /// Advisory findings
    #[must_use]
    pub fn warnings(&self) -> &[Violation] {
        &self.warnings
    }

    /// Fold all errors into one [`ErrorCode::ConfigValidationError`]
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let details = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::new(
            ErrorCode::ConfigValidationError,
            format!("Validation failed: {details}"),
        ))
    }
}

/// Chainable collection of checks
#[derive(Debug, Default)]
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    /// Start with no violations
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(mut self, field: &str, rule: Rule, message: String) -> Self {
        let violation = Violation {
            field: field.to_string(),
            rule,
            message,
        };
        if rule == Rule::Advisory {
            self.result.warnings.push(violation);
        } else {
            self.result.errors.push(violation);
        }
        self
    }

    /// `value` must contain something besides whitespace
    #[must_use]
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.fail(field, Rule::Required, "Must not be blank".to_string());
        }
        self
    }

    /// `value` must match `re`; `description` names the expected shape
    #[must_use]
    pub fn matches(self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if re.is_match(value) {
            return self;
        }
        self.fail(field, Rule::Pattern, format!("'{value}' is not {description}"))
    }

    /// `min <= value <= max`; incomparable values such as NaN fail
    #[must_use]
    pub fn range<T: PartialOrd + fmt::Display>(self, field: &str, value: T, min: T, max: T) -> Self {
        if value >= min && value <= max {
            return self;
        }
        self.fail(field, Rule::Range, format!("{value} is outside {min}..={max}"))
    }

    /// Run `check`; `Some(message)` is a violation
    #[must_use]
    pub fn custom(self, field: &str, check: impl FnOnce() -> Option<String>) -> Self {
        match check() {
            Some(message) => self.fail(field, Rule::Custom, message),
            None => self,
        }
    }

    /// Record a warning when `condition` holds
    #[must_use]
    pub fn warn_if(self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            return self.fail(field, Rule::Advisory, message.to_string());
        }
        self
    }

    /// Finish and hand back what was found
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Check a corpus record identifier: `q` followed by 1-10 letters or digits
#[must_use]
pub fn validate_record_id(id: &str) -> ValidationResult {
    Validator::new()
        .required("id", id)
        .matches("id", id, &RECORD_ID_RE, "q followed by 1-10 letters or digits")
        .validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let result = Validator::new().required("question", "   ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].rule, Rule::Required);
    }

    #[test]
    fn test_matches() {
        let re = Regex::new(r"^q\d+$").unwrap();
        let result = Validator::new().matches("id", "x12", &re, "a q-number").validate();
        assert_eq!(result.errors()[0].rule, Rule::Pattern);
        assert_eq!(result.errors()[0].to_string(), "id: 'x12' is not a q-number");
    }

    #[test]
    fn test_range() {
        let result = Validator::new().range("threshold", 1.5, 0.0, 1.0).validate();
        assert_eq!(result.errors()[0].rule, Rule::Range);
        assert!(Validator::new().range("max_results", 25, 1, 1000).validate().is_valid());
    }

    #[test]
    fn test_range_rejects_nan() {
        let result = Validator::new().range("threshold", f64::NAN, 0.0, 1.0).validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_record_id_accepts_valid_ids() {
        for id in ["q1", "qA", "q1234567890", "qSchlaf01"] {
            assert!(validate_record_id(id).is_valid(), "{id} should be valid");
        }
    }

    #[test]
    fn test_record_id_rejects_invalid_ids() {
        for id in ["", "q", "Q1", "x1", "q12345678901", "q-1", "q 1"] {
            assert!(!validate_record_id(id).is_valid(), "{id} should be invalid");
        }
    }

    #[test]
    fn test_all_violations_collected() {
        let err = Validator::new()
            .range("search.max_results", 0, 1, 1000)
            .custom("search.weights", || Some("sum must be positive".to_string()))
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("search.max_results"));
        assert!(err.message.contains("sum must be positive"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let result = Validator::new()
            .warn_if("search.threshold", true, "loose")
            .warn_if("search.max_results", false, "never recorded")
            .validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].rule, Rule::Advisory);
        assert!(result.to_result().is_ok());
    }
}
