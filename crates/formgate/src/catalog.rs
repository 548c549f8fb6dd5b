#![forbid(unsafe_code)]

//! Built-in validator factories.
//!
//! Every factory declares its parameter list up front and builds a
//! [`ValidatorFn`] from the settings bound to that list. The single-control
//! factories wrap the elementary validators from [`formgate_core::Validators`]
//! and attach the resolved message to the failure record. The collection
//! factories (`totals`, `equalValues`, `withinTrueCount`) inspect the
//! children of a group or array.
//!
//! | name | parameters | failure key |
//! |---|---|---|
//! | `required` | | `required` |
//! | `requiredTrue` | | `requiredtrue` |
//! | `minLength` | `minLength` | `minlength` |
//! | `maxLength` | `maxLength` | `maxlength` |
//! | `min` | `min` | `min` |
//! | `max` | `max` | `max` |
//! | `email` | | `email` |
//! | `pattern` | `pattern` | `pattern` |
//! | `withinLength` | `minLength`, `maxLength` | `withinlength` |
//! | `totals` | `total` | `totals` |
//! | `equalValues` | | `equalvalues` |
//! | `withinTrueCount` | `minCount`, `maxCount` | `withintruecount` |
//!
//! Every list ends with `message`, `className`, `propertyName`.

use std::sync::Arc;

use formgate_core::{Control, ValidationErrors, ValidatorFn, Validators, as_number, json_number};
use serde_json::{Value, json};

use crate::binder::BoundArguments;
use crate::error::{Result, RuleError};
use crate::settings::MESSAGE;

/// Builds validators for one validator name.
///
/// Implement this to add validators to a
/// [`ValidatorRegistry`](crate::ValidatorRegistry).
pub trait ValidatorFactory: Send + Sync {
    /// Parameter names in positional order.
    fn parameters(&self) -> &[&str];

    /// Key of the failure record the built validator reports; also the key
    /// its default message is looked up under.
    fn error_key(&self) -> &str;

    /// Build a validator from bound settings and the resolved message.
    fn build(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn>;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn failure(key: &str, record: Value) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.insert(key.to_string(), record);
    Some(errors)
}

/// Run an elementary validator and attach `message` to its record.
fn with_message(base: ValidatorFn, key: &'static str, message: String) -> ValidatorFn {
    Arc::new(move |control: &Control| {
        let mut errors = base(control)?;
        if let Some(Value::Object(record)) = errors.get_mut(key) {
            record.insert(MESSAGE.to_string(), Value::String(message.clone()));
        }
        Some(errors)
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn count_param(validator: &str, args: &BoundArguments, parameter: &str) -> Result<Option<usize>> {
    let Some(value) = args.get(parameter) else {
        return Ok(None);
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            RuleError::invalid_setting(validator, parameter, "must be a non-negative integer")
        })
}

fn required_count(validator: &str, args: &BoundArguments, parameter: &str) -> Result<usize> {
    count_param(validator, args, parameter)?
        .ok_or_else(|| RuleError::invalid_setting(validator, parameter, "is required"))
}

fn required_number(validator: &str, args: &BoundArguments, parameter: &str) -> Result<f64> {
    let value = args
        .get(parameter)
        .ok_or_else(|| RuleError::invalid_setting(validator, parameter, "is required"))?;
    value
        .as_f64()
        .ok_or_else(|| RuleError::invalid_setting(validator, parameter, "must be a number"))
}

fn required_str<'a>(validator: &str, args: &'a BoundArguments, parameter: &str) -> Result<&'a str> {
    let value = args
        .get(parameter)
        .ok_or_else(|| RuleError::invalid_setting(validator, parameter, "is required"))?;
    value
        .as_str()
        .ok_or_else(|| RuleError::invalid_setting(validator, parameter, "must be a string"))
}

/// Declare a unit-struct factory with a fixed name, parameter list and key.
macro_rules! factory {
    ($(#[$meta:meta])* $ty:ident, $name:literal, [$($param:literal),*], $key:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $ty {
            /// Registered name.
            pub const NAME: &'static str = $name;
            /// Failure key.
            pub const KEY: &'static str = $key;
            const PARAMETERS: &'static [&'static str] =
                &[$($param,)* "message", "className", "propertyName"];
        }

        impl ValidatorFactory for $ty {
            fn parameters(&self) -> &[&str] {
                Self::PARAMETERS
            }

            fn error_key(&self) -> &str {
                Self::KEY
            }

            fn build(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
                self.make(args, message)
            }
        }
    };
}

factory!(
    /// Fails with `{required: {isEmpty, message}}` on null or `""`.
    Required, "required", [], "required"
);
factory!(
    /// Fails with `{requiredtrue: {isNotTrue, message}}` unless the value is `true`.
    RequiredTrue, "requiredTrue", [], "requiredtrue"
);
factory!(
    /// Minimum string or array length.
    MinLength, "minLength", ["minLength"], "minlength"
);
factory!(
    /// Maximum string or array length.
    MaxLength, "maxLength", ["maxLength"], "maxlength"
);
factory!(
    /// Minimum number.
    Min, "min", ["min"], "min"
);
factory!(
    /// Maximum number.
    Max, "max", ["max"], "max"
);
factory!(
    /// Fails with `{email: {isNotEmail, message}}` on a non-empty non-address.
    Email, "email", [], "email"
);
factory!(
    /// Full match against a regular expression.
    Pattern, "pattern", ["pattern"], "pattern"
);
factory!(
    /// Length of a string, array, or object between two bounds, inclusive.
    WithinLength, "withinLength", ["minLength", "maxLength"], "withinlength"
);
factory!(
    /// Sum of a collection's truthy child values equals a total.
    Totals, "totals", ["total"], "totals"
);
factory!(
    /// Every child of a collection holds the same truthy value.
    EqualValues, "equalValues", [], "equalvalues"
);
factory!(
    /// Number of children holding exactly `true` lies within a range.
    ///
    /// An absent `minCount` is 0 and an absent `maxCount` is unbounded.
    /// `maxCount: 0` is a real upper bound: no child may be `true`.
    WithinTrueCount, "withinTrueCount", ["minCount", "maxCount"], "withintruecount"
);

impl Required {
    fn make(&self, _args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        Ok(Arc::new(move |control: &Control| {
            if is_blank(&control.value()) {
                failure(Self::KEY, json!({ "isEmpty": true, "message": message }))
            } else {
                None
            }
        }))
    }
}

impl RequiredTrue {
    fn make(&self, _args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let base = Validators::required_true();
        Ok(Arc::new(move |control: &Control| {
            base(control)?;
            failure(Self::KEY, json!({ "isNotTrue": true, "message": message }))
        }))
    }
}

impl MinLength {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let min = required_count(Self::NAME, args, "minLength")?;
        Ok(with_message(Validators::min_length(min), Self::KEY, message))
    }
}

impl MaxLength {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let max = required_count(Self::NAME, args, "maxLength")?;
        Ok(with_message(Validators::max_length(max), Self::KEY, message))
    }
}

impl Min {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let min = required_number(Self::NAME, args, "min")?;
        Ok(with_message(Validators::min(min), Self::KEY, message))
    }
}

impl Max {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let max = required_number(Self::NAME, args, "max")?;
        Ok(with_message(Validators::max(max), Self::KEY, message))
    }
}

impl Email {
    fn make(&self, _args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let base = Validators::email();
        Ok(Arc::new(move |control: &Control| {
            base(control)?;
            failure(Self::KEY, json!({ "isNotEmail": true, "message": message }))
        }))
    }
}

impl Pattern {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let pattern = required_str(Self::NAME, args, "pattern")?;
        let base = Validators::pattern(pattern).map_err(|err| {
            RuleError::invalid_setting(Self::NAME, "pattern", format!("does not compile: {err}"))
        })?;
        Ok(with_message(base, Self::KEY, message))
    }
}

impl WithinLength {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let min = required_count(Self::NAME, args, "minLength")?;
        let max = required_count(Self::NAME, args, "maxLength")?;
        Ok(Arc::new(move |control: &Control| {
            let value = control.value();
            if is_blank(&value) {
                return None;
            }
            let actual = match &value {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(fields) => fields.len(),
                _ => return None,
            };
            if actual < min || actual > max {
                failure(
                    Self::KEY,
                    json!({
                        "minLength": min,
                        "maxLength": max,
                        "actualLength": actual,
                        "message": message,
                    }),
                )
            } else {
                None
            }
        }))
    }
}

impl Totals {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let total = required_number(Self::NAME, args, "total")?;
        Ok(Arc::new(move |control: &Control| {
            let mut sum: Option<f64> = None;
            for child in control.children() {
                let value = child.value();
                if !is_truthy(&value) {
                    continue;
                }
                let n = match &value {
                    Value::Bool(true) => 1.0,
                    other => as_number(other).unwrap_or(f64::NAN),
                };
                sum = Some(sum.unwrap_or(0.0) + n);
            }
            if sum == Some(total) {
                return None;
            }
            failure(
                Self::KEY,
                json!({
                    "requiredTotal": json_number(total),
                    "actualTotal": sum.map_or(Value::Null, json_number),
                    "message": message,
                }),
            )
        }))
    }
}

impl EqualValues {
    fn make(&self, _args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        Ok(Arc::new(move |control: &Control| {
            let mut values = control.children().map(Control::value);
            let equal = match values.next() {
                Some(first) => is_truthy(&first) && values.all(|v| v == first),
                None => false,
            };
            if equal {
                None
            } else {
                failure(Self::KEY, json!({ "message": message }))
            }
        }))
    }
}

impl WithinTrueCount {
    fn make(&self, args: &BoundArguments, message: String) -> Result<ValidatorFn> {
        let min = count_param(Self::NAME, args, "minCount")?.unwrap_or(0);
        let max = count_param(Self::NAME, args, "maxCount")?;
        Ok(Arc::new(move |control: &Control| {
            let count = control
                .children()
                .filter(|child| child.value() == Value::Bool(true))
                .count();
            if count >= min && max.is_none_or(|max| count <= max) {
                return None;
            }
            failure(
                Self::KEY,
                json!({
                    "minTrue": min,
                    "maxTrue": max,
                    "trueCount": count,
                    "message": message,
                }),
            )
        }))
    }
}

fn entry<F: ValidatorFactory + 'static>(
    name: &'static str,
    factory: F,
) -> (&'static str, Arc<dyn ValidatorFactory>) {
    (name, Arc::new(factory))
}

/// Every built-in factory with its registered name, in catalog order.
pub fn builtin_factories() -> Vec<(&'static str, Arc<dyn ValidatorFactory>)> {
    vec![
        entry(Required::NAME, Required),
        entry(RequiredTrue::NAME, RequiredTrue),
        entry(MinLength::NAME, MinLength),
        entry(MaxLength::NAME, MaxLength),
        entry(Min::NAME, Min),
        entry(Max::NAME, Max),
        entry(Email::NAME, Email),
        entry(Pattern::NAME, Pattern),
        entry(WithinLength::NAME, WithinLength),
        entry(Totals::NAME, Totals),
        entry(EqualValues::NAME, EqualValues),
        entry(WithinTrueCount::NAME, WithinTrueCount),
    ]
}
