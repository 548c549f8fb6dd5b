#![forbid(unsafe_code)]

//! Helpers for presenting and driving validated controls.

use formgate_core::Control;
use serde_json::Value;

use crate::rules::FormGate;
use crate::settings::MESSAGE;

/// Whether a control's errors should be shown: it must be dirty, invalid,
/// and touched.
pub fn show_errors(control: &Control) -> bool {
    show_errors_with(control, true)
}

/// [`show_errors`] with the touched requirement optional.
pub fn show_errors_with(control: &Control, only_after_touched: bool) -> bool {
    let active = !only_after_touched || control.touched();
    control.dirty() && control.invalid() && active
}

/// Messages of a dirty control's failures, in failure order.
pub fn control_errors(control: &Control) -> Vec<String> {
    control_errors_with(control, true)
}

/// [`control_errors`] with the dirty requirement optional.
///
/// Failure records without a non-empty `message` string are skipped.
pub fn control_errors_with(control: &Control, only_when_dirty: bool) -> Vec<String> {
    if only_when_dirty && !control.dirty() {
        return Vec::new();
    }
    let Some(errors) = control.errors() else {
        return Vec::new();
    };
    errors
        .values()
        .filter_map(|record| record.get(MESSAGE).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assign a value as if the user had: mark the control dirty and touched,
/// then set the value.
pub fn change_control_value(control: &mut Control, value: impl Into<Value>) {
    change_control_value_with(control, value, true);
}

/// [`change_control_value`] with touching optional.
pub fn change_control_value_with(control: &mut Control, value: impl Into<Value>, mark_touched: bool) {
    control.mark_as_dirty();
    if mark_touched {
        control.mark_as_touched();
    }
    control.set_value(value);
}

impl FormGate {
    /// See [`show_errors_with`].
    pub fn show_errors(&self, control: &Control, only_after_touched: bool) -> bool {
        show_errors_with(control, only_after_touched)
    }

    /// See [`control_errors_with`].
    pub fn control_errors(&self, control: &Control, only_when_dirty: bool) -> Vec<String> {
        control_errors_with(control, only_when_dirty)
    }

    /// See [`change_control_value_with`].
    pub fn change_control_value(
        &self,
        control: &mut Control,
        value: impl Into<Value>,
        mark_touched: bool,
    ) {
        change_control_value_with(control, value, mark_touched);
    }
}
