#![forbid(unsafe_code)]

//! Form generation: one control per domain-object property.

use formgate_core::{Control, ValidatorFn, debug};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Domain, VALIDATIONS_KEY};
use crate::error::Result;
use crate::rules::FormGate;
use crate::settings::{RuleSet, Validations};

/// Adjustments applied while generating a form.
///
/// Reads from JSON such as:
///
/// ```json
/// {
///   "only": ["firstName", "email"],
///   "rename": { "email": "emailAddress" },
///   "validations": { "email": { "required": {} } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormMods {
    /// Build controls for exactly these properties, in this order.
    pub only: Option<Vec<String>>,
    /// Leave these properties out. Ignored when `only` is set.
    pub exclude: Vec<String>,
    /// Property name → control name.
    pub rename: IndexMap<String, String>,
    /// Per-property rules merged over the domain object's own.
    pub validations: Validations,
}

impl FormMods {
    /// No adjustments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read mods from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Restrict the form to `properties`.
    #[must_use]
    pub fn only<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Leave `property` out of the form.
    #[must_use]
    pub fn exclude(mut self, property: impl Into<String>) -> Self {
        self.exclude.push(property.into());
        self
    }

    /// Name the control for `property` `control_name`. An empty name keeps
    /// the property name.
    #[must_use]
    pub fn rename(mut self, property: impl Into<String>, control_name: impl Into<String>) -> Self {
        self.rename.insert(property.into(), control_name.into());
        self
    }

    /// Merge `rules` over the domain object's rules for `property`.
    #[must_use]
    pub fn validate(mut self, property: impl Into<String>, rules: RuleSet) -> Self {
        self.validations.insert(property, rules);
        self
    }

    fn includes(&self, property: &str) -> bool {
        self.only.is_some() || !self.exclude.iter().any(|p| p == property)
    }

    fn control_name<'a>(&'a self, property: &'a str) -> &'a str {
        self.rename
            .get(property)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(property)
    }
}

struct PlannedControl {
    value: Value,
    control_name: String,
    validators: Vec<ValidatorFn>,
    include: bool,
}

impl FormGate {
    /// Build a group with one control per property of `domain`.
    ///
    /// Each control starts at the property's current value (null for an
    /// `only` entry the object lacks) and carries the validators
    /// [`FormGate::apply_rules`] builds for that property, with
    /// `mods.validations` as overrides. The `validations` property itself is
    /// never turned into a control.
    ///
    /// # Errors
    ///
    /// Any error from [`FormGate::apply_rules`], including for excluded
    /// properties.
    pub fn generate_form(&self, domain: &dyn Domain, mods: &FormMods) -> Result<Control> {
        let properties: Vec<String> = match &mods.only {
            Some(only) => only.clone(),
            None => domain
                .property_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        let mut plan: IndexMap<String, PlannedControl> = IndexMap::new();
        for property in properties.iter().filter(|p| p.as_str() != VALIDATIONS_KEY) {
            let overrides = mods.validations.property(property);
            let validators = self.apply_rules(Some(domain), property, overrides)?;
            plan.insert(
                property.clone(),
                PlannedControl {
                    value: domain.property(property).unwrap_or(Value::Null),
                    control_name: mods.control_name(property).to_string(),
                    validators,
                    include: mods.includes(property),
                },
            );
        }

        let mut controls = IndexMap::new();
        for planned in plan.into_values().filter(|p| p.include) {
            controls.insert(
                planned.control_name,
                Control::new(planned.value, planned.validators),
            );
        }

        debug!(
            class = domain.class_name(),
            included = controls.len(),
            excluded = properties
                .iter()
                .filter(|p| p.as_str() != VALIDATIONS_KEY && !mods.includes(p.as_str()))
                .count(),
            "form generated"
        );
        Ok(Control::group(controls, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainRecord;
    use serde_json::json;

    fn person() -> DomainRecord {
        DomainRecord::from_json(
            "Person",
            r#"{
                "name": "Ada",
                "email": "ada@example.com",
                "age": 36,
                "validations": {
                    "name": { "required": {} },
                    "age": { "min": { "min": 18 } }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn builds_every_property_but_validations() {
        let form = FormGate::new().generate_form(&person(), &FormMods::new()).unwrap();
        assert!(form.is_group());
        assert_eq!(form.control_names(), vec!["name", "email", "age"]);
        assert_eq!(form.value(), json!({"name": "Ada", "email": "ada@example.com", "age": 36}));
        assert!(form.valid());
    }

    #[test]
    fn only_selects_and_orders() {
        let mods = FormMods::new().only(["age", "name"]);
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.control_names(), vec!["age", "name"]);
    }

    #[test]
    fn only_wins_over_exclude() {
        let mods = FormMods::new().only(["name"]).exclude("name");
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.control_names(), vec!["name"]);
    }

    #[test]
    fn exclude_drops_property() {
        let mods = FormMods::new().exclude("email");
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.control_names(), vec!["name", "age"]);
    }

    #[test]
    fn only_entry_missing_from_domain_is_null() {
        let mods = FormMods::new().only(["nickname"]);
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.get("nickname").unwrap().value(), Value::Null);
    }

    #[test]
    fn only_listing_validations_is_ignored() {
        let mods = FormMods::new().only(["validations", "name"]);
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.control_names(), vec!["name"]);
    }

    #[test]
    fn rename_changes_control_name_and_keeps_rules() {
        let mods = FormMods::new().rename("age", "years");
        let mut form = FormGate::new().generate_form(&person(), &mods).unwrap();
        let years = form.get_mut("years").unwrap();
        years.set_value(json!(12));
        assert!(years.has_error("min"));
    }

    #[test]
    fn empty_rename_keeps_property_name() {
        let mods = FormMods::new().rename("name", "").rename("age", "years");
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        assert_eq!(form.control_names(), vec!["name", "email", "years"]);
    }

    #[test]
    fn mod_validations_override_domain_rules() {
        let mods = FormMods::from_json(r#"{"validations": {"age": {"min": {"min": 40}}}}"#).unwrap();
        let form = FormGate::new().generate_form(&person(), &mods).unwrap();
        let age = form.get("age").unwrap();
        assert_eq!(age.error("min").unwrap()["min"], json!(40));
    }

    #[test]
    fn excluded_properties_still_validate_their_rules() {
        let mods = FormMods::new()
            .exclude("email")
            .validate("email", RuleSet::new().with("bogus", Default::default()));
        assert!(FormGate::new().generate_form(&person(), &mods).is_err());
    }

    #[test]
    fn mods_read_from_json() {
        let mods = FormMods::from_json(
            r#"{"only": ["a"], "exclude": ["b"], "rename": {"a": "alpha"}}"#,
        )
        .unwrap();
        assert_eq!(mods.only, Some(vec!["a".to_string()]));
        assert_eq!(mods.exclude, vec!["b".to_string()]);
        assert_eq!(mods.rename.get("a").map(String::as_str), Some("alpha"));
        assert!(mods.validations.is_empty());
    }
}
