#![forbid(unsafe_code)]

//! Failure messages keyed by failure name, with per-class, per-property
//! overrides.
//!
//! A catalog can be extended from JSON:
//!
//! ```json
//! {
//!   "defaults": { "required": "Please fill this in" },
//!   "scoped": { "User": { "email": { "email": "That address looks wrong" } } }
//! }
//! ```
//!
//! Both keys are optional. Entries are layered over the built-in defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message used when no explicit, scoped, or default message exists.
pub const FALLBACK_MESSAGE: &str = "The value is invalid";

const BUILTIN_MESSAGES: &[(&str, &str)] = &[
    ("required", "A value is required"),
    ("requiredtrue", "The value must be true"),
    ("minlength", "The value is too short"),
    ("maxlength", "The value is too long"),
    ("min", "The number is too small"),
    ("max", "The number is too large"),
    ("email", "The email is invalid"),
    ("pattern", "The value does not match the pattern"),
    ("withinlength", "The value does not meet the size requirements"),
    ("totals", "The total value does not meet the required total"),
    ("equalvalues", "The values are not equal"),
    (
        "withintruecount",
        "The number of true values does not meet the requirement",
    ),
];

type ScopedMessages = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Failure name → message, plus class → property → failure name → message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCatalog {
    #[serde(default)]
    defaults: BTreeMap<String, String>,
    #[serde(default)]
    scoped: ScopedMessages,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MessageCatalog {
    /// A catalog with no messages at all.
    pub fn empty() -> Self {
        Self {
            defaults: BTreeMap::new(),
            scoped: BTreeMap::new(),
        }
    }

    /// The built-in English defaults.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (key, message) in BUILTIN_MESSAGES {
            catalog.set_default(*key, *message);
        }
        catalog
    }

    /// The built-in defaults with the entries of a JSON document layered on top.
    pub fn from_json(json: &str) -> Result<Self> {
        let overlay: MessageCatalog = serde_json::from_str(json)?;
        let mut catalog = Self::builtin();
        catalog.extend(overlay);
        Ok(catalog)
    }

    /// Layer every entry of `other` over this catalog.
    pub fn extend(&mut self, other: MessageCatalog) {
        self.defaults.extend(other.defaults);
        for (class, properties) in other.scoped {
            let class_entry = self.scoped.entry(class).or_default();
            for (property, messages) in properties {
                class_entry.entry(property).or_default().extend(messages);
            }
        }
    }

    /// Set the default message for a failure name.
    pub fn set_default(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.defaults.insert(key.into(), message.into());
    }

    /// Builder form of [`MessageCatalog::set_default`].
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.set_default(key, message);
        self
    }

    /// Set the message for a failure name on one property of one class.
    pub fn set_scoped(
        &mut self,
        class_name: impl Into<String>,
        property_name: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.scoped
            .entry(class_name.into())
            .or_default()
            .entry(property_name.into())
            .or_default()
            .insert(key.into(), message.into());
    }

    /// Builder form of [`MessageCatalog::set_scoped`].
    #[must_use]
    pub fn with_scoped(
        mut self,
        class_name: impl Into<String>,
        property_name: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.set_scoped(class_name, property_name, key, message);
        self
    }

    /// The default message for a failure name.
    pub fn default_message(&self, key: &str) -> Option<&str> {
        self.defaults.get(key).map(String::as_str)
    }

    /// The message for a failure name, preferring a scoped entry when both
    /// class and property are known.
    pub fn lookup(
        &self,
        key: &str,
        class_name: Option<&str>,
        property_name: Option<&str>,
    ) -> Option<&str> {
        let scoped = class_name.zip(property_name).and_then(|(class, property)| {
            self.scoped
                .get(class)
                .and_then(|properties| properties.get(property))
                .and_then(|messages| messages.get(key))
        });
        scoped
            .map(String::as_str)
            .or_else(|| self.default_message(key))
    }

    /// The message a validator reports: `explicit` if given, else
    /// [`MessageCatalog::lookup`], else [`FALLBACK_MESSAGE`].
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        key: &str,
        class_name: Option<&str>,
        property_name: Option<&str>,
    ) -> String {
        explicit
            .or_else(|| self.lookup(key, class_name, property_name))
            .unwrap_or(FALLBACK_MESSAGE)
            .to_string()
    }
}
