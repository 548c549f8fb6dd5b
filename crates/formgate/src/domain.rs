#![forbid(unsafe_code)]

//! Domain objects: keyed records that may carry their own validation rules.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::settings::Validations;

/// Property name under which a domain object carries its rules.
pub const VALIDATIONS_KEY: &str = "validations";

/// A keyed record the rule layer can build forms and validators for.
pub trait Domain {
    /// Type name, used to select scoped messages.
    fn class_name(&self) -> &str;

    /// Property names in declaration order.
    fn property_names(&self) -> Vec<&str>;

    /// Current value of a property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Rules declared by the object itself.
    fn validations(&self) -> Option<&Validations> {
        None
    }
}

/// A domain object held as a JSON record.
///
/// ```rust
/// use formgate::{Domain, DomainRecord};
///
/// let user = DomainRecord::from_json("User", r#"{
///     "firstName": "Ada",
///     "validations": { "firstName": { "required": {} } }
/// }"#).unwrap();
///
/// assert_eq!(user.property_names(), vec!["firstName"]);
/// assert!(user.validations().unwrap().property("firstName").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainRecord {
    class_name: String,
    properties: IndexMap<String, Value>,
    validations: Option<Validations>,
}

impl DomainRecord {
    /// An empty record of the given class.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set a property, returning its previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(name.into(), value.into())
    }

    /// Attach rules, builder style.
    #[must_use]
    pub fn with_validations(mut self, validations: Validations) -> Self {
        self.validations = Some(validations);
        self
    }

    /// Read a JSON object; a top-level `validations` entry becomes the
    /// record's rules.
    pub fn from_json(class_name: impl Into<String>, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(class_name, value)
    }

    /// Build from any serializable value, named after its type.
    ///
    /// The value must serialize to an object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let class_name = short_type_name::<T>();
        Self::from_value(class_name, serde_json::to_value(value)?)
    }

    fn from_value(class_name: impl Into<String>, value: Value) -> Result<Self> {
        let mut fields: serde_json::Map<String, Value> = serde_json::from_value(value)?;
        let validations = match fields.shift_remove(VALIDATIONS_KEY) {
            None | Some(Value::Null) => None,
            Some(rules) => Some(serde_json::from_value(rules)?),
        };
        Ok(Self {
            class_name: class_name.into(),
            properties: fields.into_iter().collect(),
            validations,
        })
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Domain for DomainRecord {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn validations(&self) -> Option<&Validations> {
        self.validations.as_ref()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Account {
        user_name: String,
        age: u32,
    }

    #[test]
    fn from_json_lifts_validations() {
        let record = DomainRecord::from_json(
            "User",
            r#"{"a": 1, "validations": {"a": {"min": {"min": 0}}}, "b": "x"}"#,
        )
        .unwrap();
        assert_eq!(record.class_name(), "User");
        assert_eq!(record.property_names(), vec!["a", "b"]);
        assert_eq!(record.property("b"), Some(json!("x")));
        assert!(record.property(VALIDATIONS_KEY).is_none());
        let rules = record.validations().unwrap().property("a").unwrap();
        assert!(rules.contains("min"));
    }

    #[test]
    fn from_json_without_validations() {
        let record = DomainRecord::from_json("User", r#"{"a": 1}"#).unwrap();
        assert!(record.validations().is_none());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(DomainRecord::from_json("User", "[1, 2]").is_err());
        assert!(DomainRecord::from_json("User", r#"{"validations": 3}"#).is_err());
    }

    #[test]
    fn from_serialize_uses_type_name() {
        let record = DomainRecord::from_serialize(&Account {
            user_name: "ada".into(),
            age: 36,
        })
        .unwrap();
        assert_eq!(record.class_name(), "Account");
        assert_eq!(record.property_names(), vec!["userName", "age"]);
        assert_eq!(record.property("age"), Some(json!(36)));
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let record = DomainRecord::new("Order")
            .with_property("b", 2)
            .with_property("a", 1);
        assert_eq!(record.property_names(), vec!["b", "a"]);
        assert_eq!(record.properties().count(), 2);
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<Account>(), "Account");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
