#![forbid(unsafe_code)]

//! Form controls: leaf values, named groups, and indexed arrays.
//!
//! # Design Invariants
//!
//! 1. **Validation on write**: construction, [`Control::set_value`] and
//!    [`Control::reset`] re-run the receiving control's validators before
//!    returning.
//! 2. **Live aggregate state**: `valid`, `dirty` and `touched` on a group or
//!    array fold in the children's current state, so a child changed through
//!    [`Control::get_mut`] is reflected without re-validating the parent.
//! 3. **Stale parent validators**: validators attached to a group or array
//!    only re-run when that control is written or
//!    [`Control::update_value_and_validity`] is called on it.
//! 4. **Merged failures**: failures from several validators form one ordered
//!    record; on a name clash the later validator wins.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Failure records keyed by failure name (`"required"`, `"minlength"`, ...).
pub type ValidationErrors = IndexMap<String, Value>;

/// A validator closure. Returns `None` when the control passes.
///
/// Closures are shared (`Arc`) so one validator can be attached to many
/// controls.
pub type ValidatorFn = Arc<dyn Fn(&Control) -> Option<ValidationErrors> + Send + Sync>;

/// The shape of a control.
#[derive(Debug, Clone)]
pub enum ControlKind {
    /// A single value.
    Value(Value),
    /// Named children, in insertion order.
    Group(IndexMap<String, Control>),
    /// Indexed children.
    Array(Vec<Control>),
}

/// A value holder with validity and interaction tracking.
#[derive(Clone)]
pub struct Control {
    kind: ControlKind,
    validators: Vec<ValidatorFn>,
    errors: Option<ValidationErrors>,
    /// Set once the value was modified through the UI or programmatically.
    dirty: bool,
    /// Set once the user interacted with (focused then left) the control.
    touched: bool,
}

impl Control {
    /// Create a leaf control holding `value`.
    pub fn new(value: impl Into<Value>, validators: Vec<ValidatorFn>) -> Self {
        Self::with_kind(ControlKind::Value(value.into()), validators)
    }

    /// Create a group of named child controls.
    pub fn group(controls: IndexMap<String, Control>, validators: Vec<ValidatorFn>) -> Self {
        Self::with_kind(ControlKind::Group(controls), validators)
    }

    /// Create an array of child controls.
    pub fn array(controls: Vec<Control>, validators: Vec<ValidatorFn>) -> Self {
        Self::with_kind(ControlKind::Array(controls), validators)
    }

    fn with_kind(kind: ControlKind, validators: Vec<ValidatorFn>) -> Self {
        let mut control = Self {
            kind,
            validators,
            errors: None,
            dirty: false,
            touched: false,
        };
        control.update_value_and_validity();
        control
    }

    /// The control's shape.
    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    /// Whether this is a group of named controls.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ControlKind::Group(_))
    }

    /// Whether this is an array of controls.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ControlKind::Array(_))
    }

    /// The current value.
    ///
    /// Groups yield an object of child values, arrays an array of them.
    pub fn value(&self) -> Value {
        match &self.kind {
            ControlKind::Value(v) => v.clone(),
            ControlKind::Group(controls) => Value::Object(
                controls
                    .iter()
                    .map(|(name, c)| (name.clone(), c.value()))
                    .collect::<Map<String, Value>>(),
            ),
            ControlKind::Array(controls) => {
                Value::Array(controls.iter().map(Control::value).collect())
            }
        }
    }

    /// Child controls in order. Leaves have none.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Control> + '_> {
        match &self.kind {
            ControlKind::Value(_) => Box::new(std::iter::empty()),
            ControlKind::Group(controls) => Box::new(controls.values()),
            ControlKind::Array(controls) => Box::new(controls.iter()),
        }
    }

    /// Number of child controls.
    pub fn child_count(&self) -> usize {
        match &self.kind {
            ControlKind::Value(_) => 0,
            ControlKind::Group(controls) => controls.len(),
            ControlKind::Array(controls) => controls.len(),
        }
    }

    /// Names of a group's children, in order. Empty for other kinds.
    pub fn control_names(&self) -> Vec<&str> {
        match &self.kind {
            ControlKind::Group(controls) => controls.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a group child by name.
    pub fn get(&self, name: &str) -> Option<&Control> {
        match &self.kind {
            ControlKind::Group(controls) => controls.get(name),
            _ => None,
        }
    }

    /// Look up a group child by name, mutably.
    ///
    /// The group's own validators are not re-run when the child changes; call
    /// [`Control::update_value_and_validity`] on the group afterwards.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Control> {
        match &mut self.kind {
            ControlKind::Group(controls) => controls.get_mut(name),
            _ => None,
        }
    }

    /// Look up an array child by index.
    pub fn at(&self, index: usize) -> Option<&Control> {
        match &self.kind {
            ControlKind::Array(controls) => controls.get(index),
            _ => None,
        }
    }

    /// Look up an array child by index, mutably.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Control> {
        match &mut self.kind {
            ControlKind::Array(controls) => controls.get_mut(index),
            _ => None,
        }
    }

    /// Add (or replace) a named child. Returns `false` if this is not a group.
    pub fn add_control(&mut self, name: impl Into<String>, control: Control) -> bool {
        let ControlKind::Group(controls) = &mut self.kind else {
            return false;
        };
        controls.insert(name.into(), control);
        self.update_value_and_validity();
        true
    }

    /// Append a child. Returns `false` if this is not an array.
    pub fn push(&mut self, control: Control) -> bool {
        let ControlKind::Array(controls) = &mut self.kind else {
            return false;
        };
        controls.push(control);
        self.update_value_and_validity();
        true
    }

    // -------------------------------------------------------------------------
    // Value changes
    // -------------------------------------------------------------------------

    /// Assign a new value and re-run validators.
    ///
    /// For a group, entries of an object value are written to the children of
    /// the same name; for an array, items are written by index. Entries with no
    /// matching child are ignored.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        let value = value.into();
        match (&mut self.kind, value) {
            (ControlKind::Value(current), value) => *current = value,
            (ControlKind::Group(controls), Value::Object(entries)) => {
                for (name, v) in entries {
                    if let Some(child) = controls.get_mut(&name) {
                        child.set_value(v);
                    }
                }
            }
            (ControlKind::Array(controls), Value::Array(items)) => {
                for (child, v) in controls.iter_mut().zip(items) {
                    child.set_value(v);
                }
            }
            _ => {}
        }
        self.update_value_and_validity();
    }

    /// Assign a value and return the control to pristine, untouched state.
    pub fn reset(&mut self, value: impl Into<Value>) {
        self.set_value(value);
        self.mark_as_pristine();
        self.mark_as_untouched();
    }

    /// Re-run this control's own validators.
    pub fn update_value_and_validity(&mut self) {
        let mut merged = ValidationErrors::new();
        for validator in &self.validators {
            if let Some(errors) = validator(self) {
                merged.extend(errors);
            }
        }
        self.errors = (!merged.is_empty()).then_some(merged);
    }

    // -------------------------------------------------------------------------
    // Validators
    // -------------------------------------------------------------------------

    /// Replace the validator list and re-validate.
    pub fn set_validators(&mut self, validators: Vec<ValidatorFn>) {
        self.validators = validators;
        self.update_value_and_validity();
    }

    /// Append validators and re-validate.
    pub fn add_validators(&mut self, validators: impl IntoIterator<Item = ValidatorFn>) {
        self.validators.extend(validators);
        self.update_value_and_validity();
    }

    /// Remove all validators. The control becomes valid on its own account.
    pub fn clear_validators(&mut self) {
        self.validators.clear();
        self.errors = None;
    }

    /// Number of attached validators.
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    // -------------------------------------------------------------------------
    // Validity
    // -------------------------------------------------------------------------

    /// This control's own failures, if any.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// The failure record stored under `name`.
    pub fn error(&self, name: &str) -> Option<&Value> {
        self.errors.as_ref().and_then(|e| e.get(name))
    }

    /// Whether a failure named `name` is present.
    pub fn has_error(&self, name: &str) -> bool {
        self.error(name).is_some()
    }

    /// `true` if this control and all of its children pass validation.
    pub fn valid(&self) -> bool {
        self.errors.is_none() && self.children().all(Control::valid)
    }

    /// Negation of [`Control::valid`].
    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    // -------------------------------------------------------------------------
    // Interaction state
    // -------------------------------------------------------------------------

    /// `true` if the value was modified here or in any child.
    pub fn dirty(&self) -> bool {
        self.dirty || self.children().any(Control::dirty)
    }

    /// Negation of [`Control::dirty`].
    pub fn pristine(&self) -> bool {
        !self.dirty()
    }

    /// `true` if the user interacted with this control or any child.
    pub fn touched(&self) -> bool {
        self.touched || self.children().any(Control::touched)
    }

    /// Negation of [`Control::touched`].
    pub fn untouched(&self) -> bool {
        !self.touched()
    }

    /// Flag the control as modified.
    pub fn mark_as_dirty(&mut self) {
        self.dirty = true;
    }

    /// Flag the control as interacted-with.
    pub fn mark_as_touched(&mut self) {
        self.touched = true;
    }

    /// Clear the modified flag here and in every child.
    pub fn mark_as_pristine(&mut self) {
        self.dirty = false;
        self.for_each_child_mut(Control::mark_as_pristine);
    }

    /// Clear the interacted-with flag here and in every child.
    pub fn mark_as_untouched(&mut self) {
        self.touched = false;
        self.for_each_child_mut(Control::mark_as_untouched);
    }

    fn for_each_child_mut(&mut self, f: fn(&mut Control)) {
        match &mut self.kind {
            ControlKind::Value(_) => {}
            ControlKind::Group(controls) => controls.values_mut().for_each(f),
            ControlKind::Array(controls) => controls.iter_mut().for_each(f),
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("kind", &self.kind)
            .field("validators", &format!("[{} validators]", self.validators.len()))
            .field("errors", &self.errors)
            .field("dirty", &self.dirty)
            .field("touched", &self.touched)
            .finish()
    }
}
