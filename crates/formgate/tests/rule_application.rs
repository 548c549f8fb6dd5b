//! Rule application against domain objects, overrides, and custom registries.

use std::sync::{Arc, Mutex};

use formgate::{
    BoundArguments, Control, DomainRecord, FormGate, RuleError, RuleSet, Settings,
    ValidatorFactory, ValidatorFn, ValidatorRegistry, Validations,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn member() -> DomainRecord {
    DomainRecord::from_json(
        "Member",
        r#"{
            "firstName": "",
            "lastName": "",
            "interests": [],
            "validations": {
                "firstName": {
                    "required": { "message": "First name is required" },
                    "maxLength": { "maxLength": 8, "message": "Too long" }
                },
                "interests": {
                    "withinTrueCount": { "minCount": 1, "maxCount": 2 }
                }
            }
        }"#,
    )
    .unwrap()
}

/// Records every settings record it is asked to build from.
#[derive(Clone, Default)]
struct Probe {
    calls: Arc<Mutex<Vec<BoundArguments>>>,
}

impl ValidatorFactory for Probe {
    fn parameters(&self) -> &[&str] {
        &["level", "message", "className", "propertyName"]
    }

    fn error_key(&self) -> &str {
        "probe"
    }

    fn build(&self, args: &BoundArguments, _message: String) -> formgate::Result<ValidatorFn> {
        self.calls.lock().unwrap().push(args.clone());
        Ok(Arc::new(|_: &Control| None))
    }
}

fn gate_with_probe() -> (FormGate, Arc<Mutex<Vec<BoundArguments>>>) {
    let probe = Probe::default();
    let calls = probe.calls.clone();
    let gate = FormGate::with_registry(ValidatorRegistry::builtin().with("probe", probe));
    (gate, calls)
}

fn error_messages(control: &Control) -> Vec<String> {
    formgate::control_errors_with(control, false)
}

// ---------------------------------------------------------------------------
// apply_rules
// ---------------------------------------------------------------------------

#[test]
fn empty_for_missing_domain_object() {
    let validators = FormGate::new().apply_rules(None, "", None).unwrap();
    assert!(validators.is_empty());
}

#[test]
fn empty_for_domain_without_validations() {
    let plain = DomainRecord::new("Plain").with_property("name", "x");
    let validators = FormGate::new().apply_rules(Some(&plain), "name", None).unwrap();
    assert!(validators.is_empty());
}

#[test]
fn empty_for_property_without_rules() {
    let member = member();
    let gate = FormGate::new();
    assert!(gate.apply_rules(Some(&member), "lastName", None).unwrap().is_empty());
    assert!(gate.apply_rules(Some(&member), "nonexistent", None).unwrap().is_empty());
}

#[test]
fn base_rules_produce_working_validators() {
    let member = member();
    let validators = FormGate::new()
        .apply_rules(Some(&member), "firstName", None)
        .unwrap();
    assert_eq!(validators.len(), 2);

    let mut control = Control::new(json!(""), validators);
    assert_eq!(error_messages(&control), vec!["First name is required"]);

    control.set_value("Bartholomew");
    assert_eq!(error_messages(&control), vec!["Too long"]);

    control.set_value("Bart");
    assert!(control.valid());
}

#[test]
fn overrides_overlay_and_extend_base_rules() {
    let member = member();
    let overrides = RuleSet::new()
        .with("maxLength", Settings::new().with("message", "Eight at most"))
        .with("pattern", Settings::new().with("pattern", "[A-Za-z]+"));
    let validators = FormGate::new()
        .apply_rules(Some(&member), "firstName", Some(&overrides))
        .unwrap();
    assert_eq!(validators.len(), 3);

    let control = Control::new(json!("Bartholomew9"), validators);
    assert!(control.has_error("maxlength"));
    assert!(control.has_error("pattern"));
    assert_eq!(control.error("maxlength").unwrap()["message"], json!("Eight at most"));
    assert_eq!(control.error("maxlength").unwrap()["requiredLength"], json!(8));
}

#[test]
fn overrides_do_not_leak_into_domain_rules() {
    let member = member();
    let gate = FormGate::new();
    let overrides = RuleSet::new().with("maxLength", Settings::new().with("maxLength", 2));
    gate.apply_rules(Some(&member), "firstName", Some(&overrides))
        .unwrap();

    let validators = gate.apply_rules(Some(&member), "firstName", None).unwrap();
    let control = Control::new(json!("Bart"), validators);
    assert!(control.valid());
    assert_eq!(member, self::member());
}

#[test]
fn unknown_validator_is_an_error() {
    let member = member();
    let overrides = RuleSet::new().with("foo", Settings::new());
    let err = FormGate::new()
        .apply_rules(Some(&member), "firstName", Some(&overrides))
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        r#"apply_rules: validation method "foo" is not registered"#
    );
}

#[test]
fn invalid_setting_is_an_error() {
    let overrides = RuleSet::new().with("minLength", Settings::new().with("minLength", "three"));
    let err = FormGate::new()
        .apply_rules(None, "name", Some(&overrides))
        .err()
        .unwrap();
    assert!(matches!(err, RuleError::InvalidSetting { .. }));
}

#[test]
fn factory_receives_declared_parameters_and_context() {
    let (gate, calls) = gate_with_probe();
    let overrides = RuleSet::new().with(
        "probe",
        Settings::new().with("level", 3).with("ignored", true),
    );
    let member = member();
    gate.apply_rules(Some(&member), "lastName", Some(&overrides))
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].positional(),
        &[
            Some(json!(3)),
            None,
            Some(json!("Member")),
            Some(json!("lastName")),
        ]
    );
}

#[test]
fn zero_and_false_settings_reach_the_factory() {
    let (gate, calls) = gate_with_probe();
    let overrides = RuleSet::new().with("probe", Settings::new().with("level", 0));
    gate.apply_rules(None, "flag", Some(&overrides)).unwrap();
    assert_eq!(calls.lock().unwrap()[0].get("level"), Some(&json!(0)));
}

#[test]
fn scoped_messages_follow_class_and_property() {
    let mut gate = FormGate::new();
    gate.registry_mut()
        .messages_mut()
        .set_scoped("Member", "lastName", "required", "Surname, please");
    let overrides = RuleSet::new().with("required", Settings::new());
    let member = member();

    let validators = gate
        .apply_rules(Some(&member), "lastName", Some(&overrides))
        .unwrap();
    let control = Control::new(Value::Null, validators);
    assert_eq!(error_messages(&control), vec!["Surname, please"]);

    let validators = gate.apply_rules(None, "lastName", Some(&overrides)).unwrap();
    let control = Control::new(Value::Null, validators);
    assert_eq!(error_messages(&control), vec!["A value is required"]);
}

// ---------------------------------------------------------------------------
// apply_collection_rule
// ---------------------------------------------------------------------------

fn checkboxes(values: &[bool]) -> Vec<Control> {
    values.iter().map(|v| Control::new(*v, vec![])).collect()
}

#[test]
fn collection_rule_absent_when_nothing_declared() {
    let gate = FormGate::new();
    assert!(gate.apply_collection_rule(None, "", None).unwrap().is_none());
    let member = member();
    assert!(
        gate.apply_collection_rule(Some(&member), "lastName", None)
            .unwrap()
            .is_none()
    );
}

#[test]
fn collection_rule_validates_group_children() {
    let member = member();
    let rule = FormGate::new()
        .apply_collection_rule(Some(&member), "interests", None)
        .unwrap()
        .unwrap();

    let mut interests = Control::array(checkboxes(&[false, false, false]), vec![rule]);
    assert!(interests.has_error("withintruecount"));

    interests.set_value(json!([true, false, true]));
    assert!(interests.valid());

    interests.set_value(json!([true, true, true]));
    assert_eq!(
        interests.error("withintruecount").unwrap()["trueCount"],
        json!(3)
    );
}

#[test]
fn collection_rule_merges_overrides() {
    let member = member();
    let overrides = RuleSet::new().with("withinTrueCount", Settings::new().with("maxCount", 3));
    let rule = FormGate::new()
        .apply_collection_rule(Some(&member), "interests", Some(&overrides))
        .unwrap()
        .unwrap();
    let interests = Control::array(checkboxes(&[true, true, true]), vec![rule]);
    assert!(interests.valid());
}

#[test]
fn collection_rule_rejects_multiple_validators() {
    let overrides = RuleSet::new()
        .with("totals", Settings::new().with("total", 100))
        .with("equalValues", Settings::new());
    let err = FormGate::new()
        .apply_collection_rule(None, "allocation", Some(&overrides))
        .err()
        .unwrap();
    match &err {
        RuleError::MultipleCollectionValidators { property, names, .. } => {
            assert_eq!(property, "allocation");
            assert_eq!(names, &["totals", "equalValues"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("apply_collection_rule:"));
}

#[test]
fn collection_rule_rejects_unknown_validator() {
    let overrides = RuleSet::new().with("foo", Settings::new());
    let err = FormGate::new()
        .apply_collection_rule(None, "allocation", Some(&overrides))
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        r#"apply_collection_rule: validation method "foo" is not registered"#
    );
}

#[test]
fn totals_on_a_group_tracks_child_changes() {
    let validations = Validations::from_json(
        r#"{"allocation": {"totals": {"total": 100, "message": "Must add up to 100%"}}}"#,
    )
    .unwrap();
    let plan = DomainRecord::new("Plan").with_validations(validations);
    let rule = FormGate::new()
        .apply_collection_rule(Some(&plan), "allocation", None)
        .unwrap()
        .unwrap();

    let children = [("stocks", 60), ("bonds", 30)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Control::new(v, vec![])))
        .collect();
    let mut allocation = Control::group(children, vec![rule]);
    assert_eq!(error_messages(&allocation), vec!["Must add up to 100%"]);

    allocation.set_value(json!({"stocks": 70, "bonds": 30}));
    assert!(allocation.valid());
}
