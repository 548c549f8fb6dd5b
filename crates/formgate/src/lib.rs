#![forbid(unsafe_code)]

//! Declarative validation rules for formgate controls.
//!
//! Domain objects declare their rules as plain data, keyed by property and
//! validator name:
//!
//! ```json
//! {
//!   "email": {
//!     "required": { "message": "An email address is required" },
//!     "email": {}
//!   },
//!   "age": { "min": { "min": 18 } }
//! }
//! ```
//!
//! A [`FormGate`] resolves each validator name against its
//! [`ValidatorRegistry`], binds the settings to the factory's declared
//! parameters, and returns ready-to-attach [`ValidatorFn`]s. Overrides passed
//! at the call site are merged over the declared rules without modifying
//! either.
//!
//! # Example
//!
//! ```rust
//! use formgate::{DomainRecord, FormGate, FormMods, show_errors};
//! use serde_json::json;
//!
//! let user = DomainRecord::from_json("User", r#"{
//!     "email": "",
//!     "age": 30,
//!     "validations": {
//!         "email": { "required": {}, "email": {} },
//!         "age": { "min": { "min": 18 } }
//!     }
//! }"#).unwrap();
//!
//! let gate = FormGate::new();
//! let mut form = gate.generate_form(&user, &FormMods::new()).unwrap();
//! assert!(form.invalid());
//!
//! let email = form.get_mut("email").unwrap();
//! formgate::change_control_value(email, "not an address");
//! assert!(show_errors(email));
//! assert_eq!(formgate::control_errors(email), vec!["The email is invalid"]);
//! ```
//!
//! # Feature Flags
//!
//! - `tracing`: structured logging of rule application and form generation.

pub mod binder;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod generator;
pub mod messages;
pub mod registry;
pub mod rules;
pub mod settings;
pub mod utils;

pub use binder::{BoundArguments, ParameterPositions, bind_arguments};
pub use catalog::{
    Email, EqualValues, Max, MaxLength, Min, MinLength, Pattern, Required, RequiredTrue, Totals,
    ValidatorFactory, WithinLength, WithinTrueCount, builtin_factories,
};
pub use domain::{Domain, DomainRecord};
pub use error::{Result, RuleError};
pub use generator::FormMods;
pub use messages::{FALLBACK_MESSAGE, MessageCatalog};
pub use registry::ValidatorRegistry;
pub use rules::FormGate;
pub use settings::{RuleSet, Settings, Validations, merge_validations};
pub use utils::{
    change_control_value, change_control_value_with, control_errors, control_errors_with,
    show_errors, show_errors_with,
};

pub use formgate_core::{Control, ControlKind, ValidationErrors, ValidatorFn, Validators};
