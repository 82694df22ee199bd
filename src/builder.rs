use std::collections::HashMap;

use tracing::warn;

use crate::error::{InvokeError, SchemaError};
use crate::events::InvocationEvent;
use crate::invoker::{InvocationResult, Invoker};
use crate::schema::{parameter_key, validate_function_name, FunctionDefinition, Parameters, Property};

/// What to do when two (entity, attribute) pairs normalize to the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Later pair replaces the earlier property in place. Logged as a warning.
    #[default]
    Overwrite,
    /// Fail with `SchemaError::DuplicateParameter`.
    Reject,
    /// Append `_2`, `_3`, ... until the key is free.
    Disambiguate,
}

/// Turns entities x attributes into a function definition and runs it.
///
/// Nothing is cached: every call to [`definition`](Self::definition) or
/// [`completion`](Self::completion) rebuilds the schema from the inputs.
#[derive(Debug, Clone)]
pub struct FunctionCallBuilder {
    entities: Vec<String>,
    attributes: Vec<String>,
    function_name: String,
    function_description: String,
    collisions: CollisionPolicy,
}

impl FunctionCallBuilder {
    pub fn new<E, A>(
        entities: E,
        attributes: A,
        function_name: impl Into<String>,
        function_description: impl Into<String>,
    ) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            entities: entities.into_iter().map(Into::into).collect(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            function_name: function_name.into(),
            function_description: function_description.into(),
            collisions: CollisionPolicy::default(),
        }
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Build the definition. Keys are generated entity-major, so the
    /// `required` list reads entity 1's attributes, then entity 2's, and so on.
    pub fn definition(&self) -> Result<FunctionDefinition, SchemaError> {
        validate_function_name(&self.function_name)?;
        if self.entities.is_empty() {
            return Err(SchemaError::NoEntities);
        }
        if self.attributes.is_empty() {
            return Err(SchemaError::NoAttributes);
        }
        check_labels("entity", &self.entities)?;
        check_labels("attribute", &self.attributes)?;

        let mut parameters = Parameters::new();
        // (entity, attribute) that first produced each key, for collision reports.
        let mut origins: HashMap<String, String> = HashMap::new();

        for entity in &self.entities {
            for attribute in &self.attributes {
                let mut key = parameter_key(entity, attribute);
                let property = Property::string(format!("Define the {attribute} for {entity}"));
                let origin = format!("{entity}, {attribute}");

                if let Some(first) = origins.get(&key) {
                    match self.collisions {
                        CollisionPolicy::Overwrite => {
                            warn!(
                                key = %key,
                                first = %first,
                                second = %origin,
                                "parameter key collision, later pair overwrites"
                            );
                        }
                        CollisionPolicy::Reject => {
                            return Err(SchemaError::DuplicateParameter {
                                key,
                                first: first.clone(),
                                second: origin,
                            });
                        }
                        CollisionPolicy::Disambiguate => {
                            let base = key.clone();
                            let mut n = 2;
                            while parameters.contains_key(&key) {
                                key = format!("{base}_{n}");
                                n += 1;
                            }
                        }
                    }
                }

                if parameters.insert(key.clone(), property).is_none() {
                    origins.insert(key, origin);
                }
            }
        }

        Ok(FunctionDefinition {
            name: self.function_name.clone(),
            description: self.function_description.clone(),
            parameters,
        })
    }

    /// Rebuild the definition and send it with `user_message` in one call.
    pub async fn completion(
        &self,
        invoker: &Invoker,
        user_message: &str,
    ) -> Result<InvocationResult, InvokeError> {
        let definition = self.definition()?;
        invoker.invoke(user_message, &definition).await
    }

    /// Like [`completion`](Self::completion), with events on `tx`.
    pub async fn completion_streaming(
        &self,
        invoker: &Invoker,
        user_message: &str,
        tx: tokio::sync::mpsc::Sender<InvocationEvent>,
    ) -> Result<InvocationResult, InvokeError> {
        let definition = self.definition()?;
        invoker.invoke_streaming(user_message, &definition, tx).await
    }
}

fn check_labels(kind: &'static str, labels: &[String]) -> Result<(), SchemaError> {
    match labels.iter().position(|l| l.trim().is_empty()) {
        Some(index) => Err(SchemaError::BlankLabel { kind, index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;

    fn build(entities: &[&str], attributes: &[&str]) -> FunctionCallBuilder {
        FunctionCallBuilder::new(
            entities.iter().copied(),
            attributes.iter().copied(),
            "define_x",
            "Define things.",
        )
    }

    #[test]
    fn cartesian_product_in_entity_major_order() {
        let def = build(&["USA", "Canada", "Germany"], &["Cuisine", "Sports"])
            .definition()
            .unwrap();

        assert_eq!(def.parameters.len(), 6);
        assert_eq!(
            def.parameters.required(),
            vec![
                "USA_Cuisine",
                "USA_Sports",
                "Canada_Cuisine",
                "Canada_Sports",
                "Germany_Cuisine",
                "Germany_Sports",
            ]
        );
    }

    #[test]
    fn two_countries_one_attribute() {
        let def = build(&["USA", "Canada"], &["Cuisine"]).definition().unwrap();
        let value = def.to_value();

        assert_eq!(
            value["parameters"]["required"],
            serde_json::json!(["USA_Cuisine", "Canada_Cuisine"])
        );
        assert_eq!(
            value["parameters"]["properties"]["USA_Cuisine"],
            serde_json::json!({ "type": "string", "description": "Define the Cuisine for USA" })
        );
        assert_eq!(
            value["parameters"]["properties"]["Canada_Cuisine"]["description"],
            "Define the Cuisine for Canada"
        );
        assert_eq!(value["name"], "define_x");
        assert_eq!(value["description"], "Define things.");
    }

    #[test]
    fn whitespace_is_normalized_in_keys_not_descriptions() {
        let def = build(&["United States"], &["Cuisine"]).definition().unwrap();
        assert_eq!(def.parameters.required(), vec!["United_States_Cuisine"]);
        assert_eq!(
            def.parameters.get("United_States_Cuisine").unwrap()["description"],
            "Define the Cuisine for United States"
        );
    }

    #[test]
    fn repeated_builds_are_identical() {
        let builder = build(&["A", "B"], &["C", "D"]);
        assert_eq!(builder.definition().unwrap(), builder.definition().unwrap());
    }

    #[test]
    fn spaced_entity_and_split_entities_do_not_collide() {
        let joined = build(&["A B"], &["C"]).definition().unwrap();
        assert_eq!(joined.parameters.required(), vec!["A_B_C"]);

        let split = build(&["A", "B"], &["C"]).definition().unwrap();
        assert_eq!(split.parameters.required(), vec!["A_C", "B_C"]);
    }

    #[test]
    fn collision_overwrites_by_default() {
        let def = build(&["A B", "A_B"], &["C"]).definition().unwrap();
        assert_eq!(def.parameters.len(), 1);
        assert_eq!(
            def.parameters.get("A_B_C").unwrap()["description"],
            "Define the C for A_B"
        );
    }

    #[test]
    fn collision_can_be_rejected() {
        let err = build(&["A B", "A_B"], &["C"])
            .with_collision_policy(CollisionPolicy::Reject)
            .definition()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateParameter {
                key: "A_B_C".into(),
                first: "A B, C".into(),
                second: "A_B, C".into(),
            }
        );
    }

    #[test]
    fn collision_can_be_disambiguated() {
        let def = build(&["A B", "A_B", "A\tB"], &["C"])
            .with_collision_policy(CollisionPolicy::Disambiguate)
            .definition()
            .unwrap();
        assert_eq!(def.parameters.required(), vec!["A_B_C", "A_B_C_2", "A_B_C_3"]);
        assert_eq!(
            def.parameters.get("A_B_C_2").unwrap()["description"],
            "Define the C for A_B"
        );
    }

    #[test]
    fn empty_inputs_fail_fast() {
        assert_eq!(build(&[], &["C"]).definition(), Err(SchemaError::NoEntities));
        assert_eq!(build(&["A"], &[]).definition(), Err(SchemaError::NoAttributes));
        assert_eq!(
            build(&["A", "  "], &["C"]).definition(),
            Err(SchemaError::BlankLabel {
                kind: "entity",
                index: 1
            })
        );
    }

    #[test]
    fn overwrite_warns_once_per_collision() {
        let logs = CapturedLogs::default();
        let _guard = logs.install(tracing::Level::WARN);

        let def = build(&["A B", "A_B", "A\tB"], &["C", "D"]).definition().unwrap();
        assert_eq!(def.parameters.required(), vec!["A_B_C", "A_B_D"]);

        let out = logs.contents();
        assert_eq!(out.matches("parameter key collision").count(), 4);
        assert_eq!(out.matches("WARN").count(), 4);
        assert!(out.contains("key=A_B_C first=A B, C second=A_B, C"));
    }

    #[test]
    fn distinct_keys_log_nothing() {
        let logs = CapturedLogs::default();
        let _guard = logs.install(tracing::Level::WARN);

        build(&["USA", "Canada"], &["Cuisine"]).definition().unwrap();
        assert!(logs.contents().is_empty());
    }

    #[test]
    fn large_product_keeps_every_key() {
        let entities: Vec<String> = (0..400).map(|i| format!("entity {i}")).collect();
        let attributes: Vec<String> = (0..100).map(|i| format!("attr{i}")).collect();
        let def = FunctionCallBuilder::new(entities, attributes, "define_many", "d")
            .definition()
            .unwrap();

        let required = def.parameters.required();
        assert_eq!(required.len(), 40_000);
        assert_eq!(required[0], "entity_0_attr0");
        assert_eq!(required[1], "entity_0_attr1");
        assert_eq!(required[39_999], "entity_399_attr99");
    }

    #[test]
    fn bad_function_name_is_rejected() {
        let err = FunctionCallBuilder::new(["A"], ["B"], "define things", "d")
            .definition()
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidName("define things".into()));
    }
}
