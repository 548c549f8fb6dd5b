#![forbid(unsafe_code)]

//! Rule declarations: per-validator settings, per-property rule sets, and
//! per-class validation tables.
//!
//! All three types are ordered maps that read from and write to plain JSON
//! objects:
//!
//! ```rust
//! use formgate::Validations;
//!
//! let validations: Validations = serde_json::from_str(r#"{
//!     "firstName": {
//!         "required": { "message": "First name is required" },
//!         "maxLength": { "maxLength": 20 }
//!     }
//! }"#).unwrap();
//!
//! let rules = validations.property("firstName").unwrap();
//! assert_eq!(rules.names().collect::<Vec<_>>(), vec!["required", "maxLength"]);
//! ```
//!
//! Merging never mutates its inputs: [`merge_validations`] returns a new
//! [`RuleSet`], so one declaration table can be shared by any number of forms.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Setting key holding a validator's failure message.
pub const MESSAGE: &str = "message";
/// Setting key injected with the domain object's class name.
pub const CLASS_NAME: &str = "className";
/// Setting key injected with the validated property's name.
pub const PROPERTY_NAME: &str = "propertyName";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Parameter name → value for one validator, plus an optional `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(IndexMap<String, Value>);

impl Settings {
    /// Create an empty settings record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a parameter, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a parameter is set.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `message` setting, if it is a string.
    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE).and_then(Value::as_str)
    }

    /// The injected `className` setting.
    pub fn class_name(&self) -> Option<&str> {
        self.get(CLASS_NAME).and_then(Value::as_str)
    }

    /// The injected `propertyName` setting.
    pub fn property_name(&self) -> Option<&str> {
        self.get(PROPERTY_NAME).and_then(Value::as_str)
    }

    /// Overwrite parameters with those in `other`; parameters absent from
    /// `other` are kept.
    pub fn overlay(&mut self, other: &Settings) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Validator name → settings, for one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(IndexMap<String, Settings>);

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator entry, builder style.
    #[must_use]
    pub fn with(mut self, validator: impl Into<String>, settings: Settings) -> Self {
        self.0.insert(validator.into(), settings);
        self
    }

    /// Set a validator entry, returning the previous settings.
    pub fn insert(&mut self, validator: impl Into<String>, settings: Settings) -> Option<Settings> {
        self.0.insert(validator.into(), settings)
    }

    /// Settings for a validator.
    pub fn get(&self, validator: &str) -> Option<&Settings> {
        self.0.get(validator)
    }

    /// Settings for a validator, mutably.
    pub fn get_mut(&mut self, validator: &str) -> Option<&mut Settings> {
        self.0.get_mut(validator)
    }

    /// Whether a validator is declared.
    pub fn contains(&self, validator: &str) -> bool {
        self.0.contains_key(validator)
    }

    /// Validator names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Settings)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries in declaration order, with mutable settings.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Settings)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared validators.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no validator is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a rule set from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// This rule set with `overrides` merged in. See [`merge_validations`].
    #[must_use]
    pub fn merged(&self, overrides: Option<&RuleSet>) -> RuleSet {
        merge_validations(self, overrides)
    }
}

impl<K: Into<String>> FromIterator<(K, Settings)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, Settings)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, Settings);
    type IntoIter = indexmap::map::IntoIter<String, Settings>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Merge override rules onto base rules, returning a new rule set.
///
/// Validators only present in `overrides` are appended unchanged. Validators
/// present in both keep their base position and base parameters, with each
/// override parameter written over the base one. Parameter names are not
/// checked here.
pub fn merge_validations(base: &RuleSet, overrides: Option<&RuleSet>) -> RuleSet {
    let mut merged = base.clone();
    let Some(overrides) = overrides else {
        return merged;
    };
    for (name, settings) in &overrides.0 {
        match merged.0.get_mut(name) {
            Some(existing) => existing.overlay(settings),
            None => {
                merged.0.insert(name.clone(), settings.clone());
            }
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Validations
// ---------------------------------------------------------------------------

/// Property name → rule set, for one domain class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Validations(IndexMap<String, RuleSet>);

impl Validations {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a property, builder style.
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, rules: RuleSet) -> Self {
        self.0.insert(property.into(), rules);
        self
    }

    /// Set rules for a property, returning the previous rules.
    pub fn insert(&mut self, property: impl Into<String>, rules: RuleSet) -> Option<RuleSet> {
        self.0.insert(property.into(), rules)
    }

    /// Rules for a property.
    pub fn property(&self, property: &str) -> Option<&RuleSet> {
        self.0.get(property)
    }

    /// Property names in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of properties with rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no property has rules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a validation table from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Into<String>> FromIterator<(K, RuleSet)> for Validations {
    fn from_iter<I: IntoIterator<Item = (K, RuleSet)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn max_length(n: u64, message: &str) -> RuleSet {
        RuleSet::new().with(
            "maxLength",
            Settings::new().with("maxLength", n).with(MESSAGE, message),
        )
    }

    #[test]
    fn merge_without_overrides_is_a_copy() {
        let base = max_length(8, "a");
        assert_eq!(merge_validations(&base, None), base);
    }

    #[test]
    fn merge_overwrites_only_supplied_parameters() {
        let base = max_length(8, "a");
        let overrides = RuleSet::new().with("maxLength", Settings::new().with(MESSAGE, "b"));
        let merged = merge_validations(&base, Some(&overrides));
        assert_eq!(merged, max_length(8, "b"));
    }

    #[test]
    fn merge_appends_new_validators_unchanged() {
        let base = max_length(8, "a");
        let required = Settings::new().with(MESSAGE, "needed");
        let overrides = RuleSet::new().with("required", required.clone());
        let merged = merge_validations(&base, Some(&overrides));
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["maxLength", "required"]);
        assert_eq!(merged.get("required"), Some(&required));
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let base = max_length(8, "a");
        let overrides = RuleSet::new().with("maxLength", Settings::new().with(MESSAGE, "b"));
        let _ = merge_validations(&base, Some(&overrides));
        assert_eq!(base, max_length(8, "a"));
    }

    #[test]
    fn merge_into_empty_base() {
        let overrides = max_length(3, "short");
        assert_eq!(merge_validations(&RuleSet::new(), Some(&overrides)), overrides);
    }

    #[test]
    fn settings_accessors() {
        let s = Settings::new()
            .with(MESSAGE, "m")
            .with(CLASS_NAME, "User")
            .with(PROPERTY_NAME, "email")
            .with("n", 3);
        assert_eq!(s.message(), Some("m"));
        assert_eq!(s.class_name(), Some("User"));
        assert_eq!(s.property_name(), Some("email"));
        assert_eq!(s.get("n"), Some(&json!(3)));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn settings_message_must_be_a_string() {
        let s = Settings::new().with(MESSAGE, 42);
        assert_eq!(s.message(), None);
    }

    #[test]
    fn rule_set_reads_json_in_order() {
        let rules = RuleSet::from_json(
            r#"{"required": {}, "minLength": {"minLength": 2}, "email": {"message": "bad"}}"#,
        )
        .unwrap();
        assert_eq!(
            rules.names().collect::<Vec<_>>(),
            vec!["required", "minLength", "email"]
        );
        assert_eq!(rules.get("email").unwrap().message(), Some("bad"));
    }

    #[test]
    fn rule_set_rejects_non_object_settings() {
        assert!(RuleSet::from_json(r#"{"required": true}"#).is_err());
    }

    #[test]
    fn validations_round_trip_as_plain_json() {
        let json = json!({"age": {"min": {"min": 18}}});
        let v: Validations = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&v).unwrap(), json);
        assert_eq!(v.properties().collect::<Vec<_>>(), vec!["age"]);
    }
}
