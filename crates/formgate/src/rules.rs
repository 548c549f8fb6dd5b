#![forbid(unsafe_code)]

//! Rule application: turning a property's declared rules into validators.
//!
//! # Design Invariants
//!
//! 1. **Inputs are never mutated**: the domain object's rules and any
//!    overrides are merged into a fresh [`RuleSet`] per call.
//! 2. **Context is injected last**: `className` and `propertyName` are
//!    written into every merged entry after the merge, replacing any value
//!    a declaration supplied.
//! 3. **Order is declaration order**: validators come back in the order
//!    their names appear in the merged rule set.
//! 4. **Errors are raised before any validator escapes**: a call either
//!    returns every validator or an error.

use formgate_core::{ValidatorFn, debug, warn};

use crate::domain::Domain;
use crate::error::{Result, RuleError, SITE_APPLY_COLLECTION_RULE, SITE_APPLY_RULES};
use crate::registry::ValidatorRegistry;
use crate::settings::{CLASS_NAME, PROPERTY_NAME, RuleSet, merge_validations};

/// Entry point for rule application, form utilities, and form generation.
///
/// ```rust
/// use formgate::{Control, FormGate, DomainRecord};
/// use serde_json::json;
///
/// let user = DomainRecord::from_json("User", r#"{
///     "firstName": "",
///     "validations": {
///         "firstName": { "required": { "message": "First name is required" } }
///     }
/// }"#).unwrap();
///
/// let gate = FormGate::new();
/// let validators = gate.apply_rules(Some(&user), "firstName", None).unwrap();
/// let control = Control::new(json!(""), validators);
///
/// assert_eq!(formgate::control_errors_with(&control, false), vec!["First name is required"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormGate {
    registry: ValidatorRegistry,
}

impl FormGate {
    /// A gate over the built-in validator catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate over a custom registry.
    pub fn with_registry(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// The registry validators are resolved against.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Mutable access to the registry.
    pub fn registry_mut(&mut self) -> &mut ValidatorRegistry {
        &mut self.registry
    }

    /// The rules that apply to `property`: the domain object's own rules
    /// merged with `overrides`, with context injected.
    pub fn merged_rules(
        &self,
        domain: Option<&dyn Domain>,
        property: &str,
        overrides: Option<&RuleSet>,
    ) -> RuleSet {
        let base = domain
            .and_then(|d| d.validations())
            .and_then(|v| v.property(property));
        let mut merged = match base {
            Some(base) => merge_validations(base, overrides),
            None => merge_validations(&RuleSet::new(), overrides),
        };
        for (_, settings) in merged.iter_mut() {
            match domain {
                Some(d) => {
                    settings.insert(CLASS_NAME, d.class_name());
                }
                None => {
                    settings.remove(CLASS_NAME);
                }
            }
            if property.is_empty() {
                settings.remove(PROPERTY_NAME);
            } else {
                settings.insert(PROPERTY_NAME, property);
            }
        }
        merged
    }

    /// Build every validator declared for `property`.
    ///
    /// A missing domain object, a domain object without rules, or a property
    /// without rules all yield an empty list (plus whatever `overrides` adds).
    ///
    /// # Errors
    ///
    /// [`RuleError::UnknownValidator`] if a rule names an unregistered
    /// validator; [`RuleError::InvalidSetting`] if a factory rejects its
    /// settings.
    pub fn apply_rules(
        &self,
        domain: Option<&dyn Domain>,
        property: &str,
        overrides: Option<&RuleSet>,
    ) -> Result<Vec<ValidatorFn>> {
        let merged = self.merged_rules(domain, property, overrides);
        debug!(
            property,
            validators = ?merged.names().collect::<Vec<_>>(),
            "applying rules"
        );

        let mut validators = Vec::with_capacity(merged.len());
        for (name, settings) in merged.iter() {
            match self.registry.instantiate(SITE_APPLY_RULES, name, settings) {
                Ok(validator) => validators.push(validator),
                Err(err) => {
                    warn!(property, validator = name, error = %err, "rule rejected");
                    return Err(err);
                }
            }
        }

        debug!(property, count = validators.len(), "rules applied");
        Ok(validators)
    }

    /// Build the single validator declared for a group or array property.
    ///
    /// Returns `None` when no rule applies.
    ///
    /// # Errors
    ///
    /// [`RuleError::MultipleCollectionValidators`] if more than one rule
    /// applies, plus the errors of [`FormGate::apply_rules`].
    pub fn apply_collection_rule(
        &self,
        domain: Option<&dyn Domain>,
        property: &str,
        overrides: Option<&RuleSet>,
    ) -> Result<Option<ValidatorFn>> {
        let merged = self.merged_rules(domain, property, overrides);
        debug!(
            property,
            validators = ?merged.names().collect::<Vec<_>>(),
            "applying collection rule"
        );

        if merged.len() > 1 {
            let err = RuleError::MultipleCollectionValidators {
                site: SITE_APPLY_COLLECTION_RULE,
                property: property.to_string(),
                names: merged.names().map(str::to_string).collect(),
            };
            warn!(property, error = %err, "collection rule rejected");
            return Err(err);
        }

        let Some((name, settings)) = merged.iter().next() else {
            return Ok(None);
        };
        match self
            .registry
            .instantiate(SITE_APPLY_COLLECTION_RULE, name, settings)
        {
            Ok(validator) => Ok(Some(validator)),
            Err(err) => {
                warn!(property, validator = name, error = %err, "collection rule rejected");
                Err(err)
            }
        }
    }
}
