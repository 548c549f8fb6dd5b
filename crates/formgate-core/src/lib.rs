#![forbid(unsafe_code)]

//! Core: form controls, validity tracking, and elementary validators.
//!
//! A [`Control`] is a value holder that tracks whether the user modified it
//! (`dirty`), interacted with it (`touched`), and whether its validators
//! currently pass. Validators are plain closures ([`ValidatorFn`]) that return
//! `None` for a passing control or a [`ValidationErrors`] record keyed by
//! failure name.
//!
//! # Example
//!
//! ```rust
//! use formgate_core::{Control, Validators};
//! use serde_json::json;
//!
//! let mut name = Control::new(json!(""), vec![Validators::required()]);
//! assert!(name.invalid());
//!
//! name.set_value(json!("Ada"));
//! assert!(name.valid());
//! ```

pub mod control;
pub mod logging;
pub mod validators;

pub use control::{Control, ControlKind, ValidationErrors, ValidatorFn};
pub use validators::{Validators, as_number, is_empty_input, json_number, value_length};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
