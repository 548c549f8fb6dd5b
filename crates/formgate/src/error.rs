#![forbid(unsafe_code)]

//! Errors raised while turning rule declarations into validators.
//!
//! Every variant describes a configuration mistake. Callers are expected to
//! fix the declaration rather than recover at runtime.

/// Call site name reported by [`crate::FormGate::apply_rules`].
pub const SITE_APPLY_RULES: &str = "apply_rules";
/// Call site name reported by [`crate::FormGate::apply_collection_rule`].
pub const SITE_APPLY_COLLECTION_RULE: &str = "apply_collection_rule";

/// Errors from rule application, factory construction, and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A rule names a validator the registry does not know.
    #[error("{site}: validation method \"{name}\" is not registered")]
    UnknownValidator {
        /// The entry point that resolved the name.
        site: &'static str,
        /// The unresolved validator name.
        name: String,
    },

    /// A collection rule declared more than one validator.
    #[error(
        "{site}: a single validation method must be applied to \"{property}\", found {}",
        .names.join(", ")
    )]
    MultipleCollectionValidators {
        /// The entry point that rejected the rule.
        site: &'static str,
        /// The property carrying the rule.
        property: String,
        /// Every validator name in the merged rule.
        names: Vec<String>,
    },

    /// A validator setting is missing, mistyped, or unusable.
    #[error("validator \"{validator}\": parameter \"{parameter}\" {reason}")]
    InvalidSetting {
        /// The validator being built.
        validator: String,
        /// The offending parameter.
        parameter: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A JSON document could not be read as rules, messages, mods, or a domain object.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl RuleError {
    pub(crate) fn invalid_setting(
        validator: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            validator: validator.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Standard result type for formgate APIs.
pub type Result<T> = std::result::Result<T, RuleError>;
