//! Validation rules for attribute values.
//!
//! Casting (see [`super::AttributeDefinition::cast_value`]) turns a raw string into a
//! [`TypedValue`]; the checks here then enforce the definition's
//! [`ValidationRules`] on the typed result. Every applicable rule is checked, so a
//! value can fail several rules at once and all failures are reported together.
//!
//! | Rule | String | Number | Enum | Boolean | Date |
//! |------|--------|--------|------|---------|------|
//! | `min` / `max` | length bounds | value bounds | - | - | - |
//! | `max_length` | yes | - | yes | - | - |
//! | `pattern` | yes | yes | yes | yes | yes |
//! | `options` | yes | yes | yes | yes | yes |
//!
//! `pattern` and `options` are checked against the canonical raw form
//! (`3.50` is checked as `3.5`, `yes` as `true`, dates as `YYYY-MM-DD`).

use super::definition::ValidationRules;
use super::value::TypedValue;
use regex::Regex;

/// Why a value was rejected by its definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Raw value does not parse as a finite number
    NotANumber(String),
    /// Raw value is not a recognised boolean spelling
    NotABoolean(String),
    /// Raw value is not a `YYYY-MM-DD` or RFC 3339 date
    NotADate(String),
    /// Enum value outside the declared set
    NotInEnum { value: String, allowed: Vec<String> },
    /// Enum definition declares no values at all
    MissingEnumValues,
    BelowMinimum { value: f64, min: f64 },
    AboveMaximum { value: f64, max: f64 },
    TooShort { length: usize, min: f64 },
    TooLong { length: usize, max: f64 },
    ExceedsMaxLength { length: usize, max_length: usize },
    PatternMismatch { value: String, pattern: String },
    /// The definition's pattern itself does not compile
    InvalidPattern { pattern: String, reason: String },
    NotAnOption { value: String, options: Vec<String> },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NotANumber(raw) => write!(f, "'{}' is not a valid number", raw),
            ValidationError::NotABoolean(raw) => write!(f, "'{}' is not a valid boolean", raw),
            ValidationError::NotADate(raw) => {
                write!(f, "'{}' is not a valid date (expected YYYY-MM-DD)", raw)
            }
            ValidationError::NotInEnum { value, allowed } => write!(
                f,
                "'{}' is not one of the allowed values: {}",
                value,
                allowed.join(", ")
            ),
            ValidationError::MissingEnumValues => {
                write!(f, "enum attribute declares no allowed values")
            }
            ValidationError::BelowMinimum { value, min } => {
                write!(f, "value {} is below the minimum of {}", value, min)
            }
            ValidationError::AboveMaximum { value, max } => {
                write!(f, "value {} is above the maximum of {}", value, max)
            }
            ValidationError::TooShort { length, min } => {
                write!(f, "length {} is below the minimum of {}", length, min)
            }
            ValidationError::TooLong { length, max } => {
                write!(f, "length {} is above the maximum of {}", length, max)
            }
            ValidationError::ExceedsMaxLength { length, max_length } => {
                write!(f, "length {} exceeds max_length {}", length, max_length)
            }
            ValidationError::PatternMismatch { value, pattern } => {
                write!(f, "'{}' does not match pattern {}", value, pattern)
            }
            ValidationError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern {}: {}", pattern, reason)
            }
            ValidationError::NotAnOption { value, options } => write!(
                f,
                "'{}' is not one of the permitted options: {}",
                value,
                options.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Render errors the way they are persisted on a value row.
pub fn error_messages(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(|e| e.to_string()).collect()
}

/// Check a cast value against the rules. Returns every violation found.
pub fn check_rules(value: &TypedValue, rules: &ValidationRules) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match value {
        TypedValue::Number(n) => {
            if let Some(min) = rules.min {
                if *n < min {
                    errors.push(ValidationError::BelowMinimum { value: *n, min });
                }
            }
            if let Some(max) = rules.max {
                if *n > max {
                    errors.push(ValidationError::AboveMaximum { value: *n, max });
                }
            }
        }
        TypedValue::String(s) => {
            let length = s.chars().count();
            if let Some(min) = rules.min {
                if (length as f64) < min {
                    errors.push(ValidationError::TooShort { length, min });
                }
            }
            if let Some(max) = rules.max {
                if (length as f64) > max {
                    errors.push(ValidationError::TooLong { length, max });
                }
            }
            check_max_length(s, rules, &mut errors);
        }
        TypedValue::Enum(s) => check_max_length(s, rules, &mut errors),
        TypedValue::Boolean(_) | TypedValue::Date(_) => {}
    }

    let canonical = value.to_raw();

    if let Some(pattern) = rules.pattern.as_deref() {
        match compile_pattern(pattern) {
            Ok(re) => {
                if !re.is_match(&canonical) {
                    errors.push(ValidationError::PatternMismatch {
                        value: canonical.clone(),
                        pattern: pattern.to_string(),
                    });
                }
            }
            Err(reason) => errors.push(ValidationError::InvalidPattern {
                pattern: pattern.to_string(),
                reason,
            }),
        }
    }

    if !rules.options.is_empty() && !rules.options.iter().any(|o| *o == canonical) {
        errors.push(ValidationError::NotAnOption {
            value: canonical,
            options: rules.options.clone(),
        });
    }

    errors
}

fn check_max_length(s: &str, rules: &ValidationRules, errors: &mut Vec<ValidationError>) {
    if let Some(max_length) = rules.max_length {
        let length = s.chars().count();
        if length > max_length {
            errors.push(ValidationError::ExceedsMaxLength { length, max_length });
        }
    }
}

/// Patterns may be bare (`^[A-Z]+$`) or slash-delimited (`/^[A-Z]+$/`).
fn compile_pattern(pattern: &str) -> Result<Regex, String> {
    let body = if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        &pattern[1..pattern.len() - 1]
    } else {
        pattern
    };
    Regex::new(body).map_err(|e| e.to_string())
}
