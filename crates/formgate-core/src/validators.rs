#![forbid(unsafe_code)]

//! Elementary validators for single controls.
//!
//! Each constructor returns a [`ValidatorFn`] reporting one failure record
//! under a fixed failure name. Empty values (null, `""`, `[]`) pass every
//! validator except [`Validators::required`] and [`Validators::required_true`],
//! so optional fields only need the checks that apply when filled in.

use std::sync::Arc;

use regex::Regex;
use serde_json::{Value, json};

use crate::control::{Control, ValidationErrors, ValidatorFn};

// ---------------------------------------------------------------------------
// Failure names
// ---------------------------------------------------------------------------

/// Failure name reported by [`Validators::required`].
pub const ERROR_REQUIRED: &str = "required";
/// Failure name reported by [`Validators::required_true`].
pub const ERROR_REQUIRED_TRUE: &str = "required";
/// Failure name reported by [`Validators::min_length`].
pub const ERROR_MIN_LENGTH: &str = "minlength";
/// Failure name reported by [`Validators::max_length`].
pub const ERROR_MAX_LENGTH: &str = "maxlength";
/// Failure name reported by [`Validators::min`].
pub const ERROR_MIN: &str = "min";
/// Failure name reported by [`Validators::max`].
pub const ERROR_MAX: &str = "max";
/// Failure name reported by [`Validators::email`].
pub const ERROR_EMAIL: &str = "email";
/// Failure name reported by [`Validators::pattern`].
pub const ERROR_PATTERN: &str = "pattern";

const EMAIL_MAX_LENGTH: usize = 254;
const EMAIL_LOCAL_MAX_LENGTH: usize = 64;
const EMAIL_LABEL_MAX_LENGTH: usize = 63;

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// `true` for null, the empty string and the empty array.
pub fn is_empty_input(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Length of a string (in characters) or array. Other values have none.
pub fn value_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Convert a number to JSON, keeping whole numbers integral.
///
/// Non-finite numbers become null.
pub fn json_number(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return json!(n as i64);
    }
    json!(n)
}

/// Numeric reading of a value: numbers as-is, numeric strings parsed.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        _ => None,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn failure(name: &str, record: Value) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.insert(name.to_string(), record);
    Some(errors)
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Constructors for the elementary validators.
pub struct Validators;

impl Validators {
    /// Fails with `{required: true}` when the value is empty.
    pub fn required() -> ValidatorFn {
        Arc::new(|control: &Control| {
            if is_empty_input(&control.value()) {
                failure(ERROR_REQUIRED, json!(true))
            } else {
                None
            }
        })
    }

    /// Fails with `{required: true}` unless the value is exactly `true`.
    pub fn required_true() -> ValidatorFn {
        Arc::new(|control: &Control| {
            if control.value() == Value::Bool(true) {
                None
            } else {
                failure(ERROR_REQUIRED_TRUE, json!(true))
            }
        })
    }

    /// Fails with `{minlength: {requiredLength, actualLength}}` when a
    /// non-empty string or array is shorter than `min`.
    pub fn min_length(min: usize) -> ValidatorFn {
        Arc::new(move |control: &Control| {
            let value = control.value();
            if is_empty_input(&value) {
                return None;
            }
            let actual = value_length(&value)?;
            if actual < min {
                failure(
                    ERROR_MIN_LENGTH,
                    json!({ "requiredLength": min, "actualLength": actual }),
                )
            } else {
                None
            }
        })
    }

    /// Fails with `{maxlength: {requiredLength, actualLength}}` when a string
    /// or array is longer than `max`.
    pub fn max_length(max: usize) -> ValidatorFn {
        Arc::new(move |control: &Control| {
            let actual = value_length(&control.value())?;
            if actual > max {
                failure(
                    ERROR_MAX_LENGTH,
                    json!({ "requiredLength": max, "actualLength": actual }),
                )
            } else {
                None
            }
        })
    }

    /// Fails with `{min: {min, actual}}` when a numeric value is below `min`.
    ///
    /// Non-numeric values pass.
    pub fn min(min: f64) -> ValidatorFn {
        Arc::new(move |control: &Control| {
            let value = control.value();
            if is_empty_input(&value) {
                return None;
            }
            let n = as_number(&value)?;
            if n < min {
                failure(ERROR_MIN, json!({ "min": json_number(min), "actual": value }))
            } else {
                None
            }
        })
    }

    /// Fails with `{max: {max, actual}}` when a numeric value is above `max`.
    ///
    /// Non-numeric values pass.
    pub fn max(max: f64) -> ValidatorFn {
        Arc::new(move |control: &Control| {
            let value = control.value();
            if is_empty_input(&value) {
                return None;
            }
            let n = as_number(&value)?;
            if n > max {
                failure(ERROR_MAX, json!({ "max": json_number(max), "actual": value }))
            } else {
                None
            }
        })
    }

    /// Fails with `{email: true}` when a non-empty value is not an address.
    pub fn email() -> ValidatorFn {
        Arc::new(|control: &Control| {
            let value = control.value();
            if is_empty_input(&value) || is_email(&text(&value)) {
                None
            } else {
                failure(ERROR_EMAIL, json!(true))
            }
        })
    }

    /// Fails with `{pattern: {requiredPattern, actualValue}}` when a non-empty
    /// value does not match `pattern` in full.
    ///
    /// The pattern is anchored with `^`/`$` unless it already is.
    pub fn pattern(pattern: &str) -> Result<ValidatorFn, regex::Error> {
        let mut anchored = String::with_capacity(pattern.len() + 2);
        if !pattern.starts_with('^') {
            anchored.push('^');
        }
        anchored.push_str(pattern);
        if !pattern.ends_with('$') {
            anchored.push('$');
        }
        let regex = Regex::new(&anchored)?;

        Ok(Arc::new(move |control: &Control| {
            let value = control.value();
            if is_empty_input(&value) || regex.is_match(&text(&value)) {
                None
            } else {
                failure(
                    ERROR_PATTERN,
                    json!({ "requiredPattern": anchored, "actualValue": value }),
                )
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// Email grammar
// ---------------------------------------------------------------------------

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c)
}

fn is_domain_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            label.len() <= EMAIL_LABEL_MAX_LENGTH
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

/// Dot-atom local part, `@`, then one or more hostname labels.
fn is_email(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > EMAIL_MAX_LENGTH {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > EMAIL_LOCAL_MAX_LENGTH {
        return false;
    }
    let local_ok = local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_local_char));
    local_ok && domain.split('.').all(is_domain_label)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
