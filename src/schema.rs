use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::SchemaError;

/// Longest function name the function calling API accepts.
pub const MAX_FUNCTION_NAME_LEN: usize = 64;

/// Schema key for one (entity, attribute) pair. Every whitespace character in
/// either label becomes `_`.
pub fn parameter_key(entity: &str, attribute: &str) -> String {
    format!("{entity}_{attribute}")
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Checks a function name against `^[A-Za-z0-9_-]{1,64}$`.
pub fn validate_function_name(name: &str) -> Result<(), SchemaError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_FUNCTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

/// One string-typed schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl Property {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            kind: "string".into(),
            description: description.into(),
        }
    }
}

impl From<Property> for Value {
    fn from(property: Property) -> Self {
        json!({ "type": property.kind, "description": property.description })
    }
}

/// The `parameters` object of a function definition. Properties keep their
/// insertion order and every property is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    properties: Map<String, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    /// Returns the previous property when the key was already present.
    pub fn insert(&mut self, key: String, property: Property) -> Option<Value> {
        self.properties.insert(key, property.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Property keys in insertion order. This is also the `required` list.
    pub fn required(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// `{"type": "object", "properties": {..}, "required": [..]}`
    pub fn to_value(&self) -> Value {
        let required = self.properties.keys().cloned().map(Value::String).collect();

        let mut object = Map::new();
        object.insert("type".into(), Value::String("object".into()));
        object.insert("properties".into(), Value::Object(self.properties.clone()));
        object.insert("required".into(), Value::Array(required));
        Value::Object(object)
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// A function the completion service may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Parameters,
}

impl FunctionDefinition {
    /// JSON form sent on the wire.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".into(), Value::String(self.name.clone()));
        object.insert("description".into(), Value::String(self.description.clone()));
        object.insert("parameters".into(), self.parameters.to_value());
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_replaces_inner_whitespace() {
        assert_eq!(
            parameter_key("United States", "Cuisine"),
            "United_States_Cuisine"
        );
        assert_eq!(parameter_key("New\tZealand", "Top  Sights"), "New_Zealand_Top__Sights");
    }

    #[test]
    fn function_name_rules() {
        assert!(validate_function_name("define_country_attributes").is_ok());
        assert!(validate_function_name("define-x-2").is_ok());
        assert!(validate_function_name("").is_err());
        assert!(validate_function_name("has space").is_err());
        assert!(validate_function_name("../escape").is_err());
        assert!(validate_function_name(&"a".repeat(65)).is_err());
        assert!(validate_function_name(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params = Parameters::new();
        params.insert("a".into(), Property::string("first"));
        params.insert("b".into(), Property::string("second"));
        let old = params.insert("a".into(), Property::string("third"));

        assert_eq!(old, Some(Value::from(Property::string("first"))));
        assert_eq!(params.required(), vec!["a", "b"]);
        assert_eq!(params.get("a").unwrap()["description"], "third");
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut params = Parameters::new();
        params.insert("zeta".into(), Property::string("z"));
        params.insert("alpha".into(), Property::string("a"));
        let def = FunctionDefinition {
            name: "f".into(),
            description: "d".into(),
            parameters: params,
        };

        let text = serde_json::to_string(&def).unwrap();
        assert!(text.find("\"zeta\"").unwrap() < text.find("\"alpha\"").unwrap());

        let value = def.to_value();
        assert_eq!(value, serde_json::to_value(&def).unwrap());
        assert_eq!(value["name"], "f");
        assert_eq!(value["parameters"]["type"], "object");
        assert_eq!(value["parameters"]["properties"]["zeta"]["type"], "string");
        assert_eq!(
            value["parameters"]["required"],
            serde_json::json!(["zeta", "alpha"])
        );
    }
}
