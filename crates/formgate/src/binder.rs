#![forbid(unsafe_code)]

//! Binding a validator's settings record to its declared parameters.
//!
//! Every factory declares its parameter list up front. [`bind_arguments`]
//! projects a settings record onto that list: one slot per declared
//! position, `None` where the setting is absent or null, and any extra
//! settings keys dropped.
//!
//! ```rust
//! use formgate::{ParameterPositions, Settings, bind_arguments};
//! use serde_json::json;
//!
//! let positions = ParameterPositions::declared(&["minLength", "maxLength", "message"]);
//! let settings = Settings::new().with("maxLength", 10);
//! let args = bind_arguments(&positions, &settings);
//! assert_eq!(args.positional(), &[None, Some(json!(10)), None]);
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::settings::{CLASS_NAME, MESSAGE, PROPERTY_NAME, Settings};

// ---------------------------------------------------------------------------
// ParameterPositions
// ---------------------------------------------------------------------------

/// Parameter name → zero-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPositions(IndexMap<String, usize>);

impl ParameterPositions {
    /// Positions for a declared parameter list.
    ///
    /// Names are trimmed; blank names are skipped without taking a position.
    /// A repeated name keeps its first position.
    pub fn declared(parameters: &[&str]) -> Self {
        let mut positions = IndexMap::new();
        for name in parameters.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            let next = positions.len();
            positions.entry(name.to_string()).or_insert(next);
        }
        Self(positions)
    }

    /// Positions from explicit `(name, position)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, p)| (k.into(), p)).collect())
    }

    /// Position of a parameter.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    /// Number of named parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameter is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of argument slots: one past the highest position.
    pub fn arity(&self) -> usize {
        self.0.values().max().map_or(0, |p| p + 1)
    }

    /// `(name, position)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, p)| (k.as_str(), *p))
    }
}

// ---------------------------------------------------------------------------
// BoundArguments
// ---------------------------------------------------------------------------

/// Settings values laid out by declared parameter position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    names: Vec<Option<String>>,
    values: Vec<Option<Value>>,
}

impl BoundArguments {
    /// One slot per position; `None` for unsupplied parameters.
    pub fn positional(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Consume into the positional slots.
    pub fn into_positional(self) -> Vec<Option<Value>> {
        self.values
    }

    /// The bound value of a named parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n.as_deref() == Some(name))?;
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The bound `message`, if it is a non-empty string.
    pub fn message(&self) -> Option<&str> {
        self.str_arg(MESSAGE)
    }

    /// The bound `className`, if any.
    pub fn class_name(&self) -> Option<&str> {
        self.str_arg(CLASS_NAME)
    }

    /// The bound `propertyName`, if any.
    pub fn property_name(&self) -> Option<&str> {
        self.str_arg(PROPERTY_NAME)
    }

    fn str_arg(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Lay out `settings` by `positions`.
///
/// The result has [`ParameterPositions::arity`] slots. JSON null counts as
/// unsupplied. Settings keys with no declared position are ignored.
pub fn bind_arguments(positions: &ParameterPositions, settings: &Settings) -> BoundArguments {
    let arity = positions.arity();
    let mut names = vec![None; arity];
    let mut values = vec![None; arity];
    for (name, position) in positions.iter() {
        names[position] = Some(name.to_string());
        values[position] = settings.get(name).filter(|v| !v.is_null()).cloned();
    }
    BoundArguments { names, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_positions_follow_order() {
        let p = ParameterPositions::declared(&["minLength", " maxLength ", "message"]);
        assert_eq!(p.position("minLength"), Some(0));
        assert_eq!(p.position("maxLength"), Some(1));
        assert_eq!(p.position("message"), Some(2));
        assert_eq!(p.arity(), 3);
    }

    #[test]
    fn declared_positions_for_no_parameters() {
        let p = ParameterPositions::declared(&[]);
        assert!(p.is_empty());
        assert_eq!(p.arity(), 0);
        assert!(bind_arguments(&p, &Settings::new().with("x", 1)).is_empty());
    }

    #[test]
    fn declared_positions_skip_blank_and_repeated_names() {
        let p = ParameterPositions::declared(&["a", "", "a", "b"]);
        assert_eq!(p.position("a"), Some(0));
        assert_eq!(p.position("b"), Some(1));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn binds_supplied_and_nulls_missing() {
        let p = ParameterPositions::from_pairs([("minLength", 0), ("maxLength", 1), ("message", 2)]);
        let args = bind_arguments(&p, &Settings::new().with("maxLength", 10));
        assert_eq!(args.positional(), &[None, Some(json!(10)), None]);
    }

    #[test]
    fn ignores_undeclared_settings() {
        let p = ParameterPositions::declared(&["message"]);
        let settings = Settings::new()
            .with("message", "hi")
            .with("className", "User")
            .with("unrelated", true);
        let args = bind_arguments(&p, &settings);
        assert_eq!(args.into_positional(), vec![Some(json!("hi"))]);
    }

    #[test]
    fn null_counts_as_unsupplied() {
        let p = ParameterPositions::declared(&["total"]);
        let args = bind_arguments(&p, &Settings::new().with("total", Value::Null));
        assert_eq!(args.len(), 1);
        assert!(args.positional()[0].is_none());
        assert_eq!(args.get("total"), None);
    }

    #[test]
    fn zero_and_false_are_supplied() {
        let p = ParameterPositions::declared(&["minCount", "flag"]);
        let args = bind_arguments(&p, &Settings::new().with("minCount", 0).with("flag", false));
        assert_eq!(args.get("minCount"), Some(&json!(0)));
        assert_eq!(args.get("flag"), Some(&json!(false)));
    }

    #[test]
    fn gaps_in_positions_stay_empty() {
        let p = ParameterPositions::from_pairs([("a", 0), ("c", 2)]);
        let args = bind_arguments(&p, &Settings::new().with("a", 1).with("c", 3));
        assert_eq!(args.positional(), &[Some(json!(1)), None, Some(json!(3))]);
    }

    #[test]
    fn string_accessors_skip_empty_strings() {
        let p = ParameterPositions::declared(&["message", "className", "propertyName"]);
        let settings = Settings::new()
            .with("message", "")
            .with("className", "User")
            .with("propertyName", "email");
        let args = bind_arguments(&p, &settings);
        assert_eq!(args.message(), None);
        assert_eq!(args.class_name(), Some("User"));
        assert_eq!(args.property_name(), Some("email"));
    }
}
