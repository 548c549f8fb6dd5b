#![forbid(unsafe_code)]

//! Validator name → factory lookup, plus the messages factories report.
//!
//! A registry is a plain value. Each [`FormGate`](crate::FormGate) owns one,
//! so tests and applications can register their own factories or replace
//! built-ins without touching any shared state.

use std::fmt;
use std::sync::Arc;

use formgate_core::{ValidatorFn, trace};
use indexmap::IndexMap;

use crate::binder::{ParameterPositions, bind_arguments};
use crate::catalog::{ValidatorFactory, builtin_factories};
use crate::error::{Result, RuleError};
use crate::messages::MessageCatalog;
use crate::settings::Settings;

/// Named validator factories and the message catalog they draw from.
#[derive(Clone)]
pub struct ValidatorRegistry {
    factories: IndexMap<String, Arc<dyn ValidatorFactory>>,
    messages: MessageCatalog,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("messages", &self.messages)
            .finish()
    }
}

impl ValidatorRegistry {
    /// A registry with no factories and no messages.
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
            messages: MessageCatalog::empty(),
        }
    }

    /// The built-in catalog with the built-in messages.
    pub fn builtin() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
            messages: MessageCatalog::builtin(),
        };
        for (name, factory) in builtin_factories() {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    /// Add a factory under `name`, returning the one it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl ValidatorFactory + 'static,
    ) -> Option<Arc<dyn ValidatorFactory>> {
        self.register_shared(name, Arc::new(factory))
    }

    /// Add an already shared factory under `name`.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn ValidatorFactory>,
    ) -> Option<Arc<dyn ValidatorFactory>> {
        self.factories.insert(name.into(), factory)
    }

    /// Builder form of [`ValidatorRegistry::register`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, factory: impl ValidatorFactory + 'static) -> Self {
        self.register(name, factory);
        self
    }

    /// Remove a factory.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn ValidatorFactory>> {
        self.factories.shift_remove(name)
    }

    /// Look up a factory.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValidatorFactory>> {
        self.factories.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// The message catalog.
    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Mutable access to the message catalog.
    pub fn messages_mut(&mut self) -> &mut MessageCatalog {
        &mut self.messages
    }

    /// Replace the message catalog, builder style.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Build the validator `name` from its settings.
    ///
    /// Binds `settings` to the factory's declared parameters, resolves the
    /// failure message, and hands both to the factory. `site` names the
    /// caller in the error raised for an unregistered name.
    pub fn instantiate(
        &self,
        site: &'static str,
        name: &str,
        settings: &Settings,
    ) -> Result<ValidatorFn> {
        let factory = self.get(name).ok_or_else(|| RuleError::UnknownValidator {
            site,
            name: name.to_string(),
        })?;
        let positions = ParameterPositions::declared(factory.parameters());
        let args = bind_arguments(&positions, settings);
        let message = self.messages.resolve(
            args.message(),
            factory.error_key(),
            args.class_name(),
            args.property_name(),
        );
        trace!(validator = name, arity = args.len(), resolved = %message, "binding validator");
        factory.build(&args, message)
    }
}
