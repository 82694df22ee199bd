use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::FunctionCallBuilder;
use crate::error::CatalogError;

/// One premade example from the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub entities: Vec<String>,
    pub attributes: Vec<String>,
}

/// Everything the core needs for one invocation, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRequest {
    pub entities: Vec<String>,
    pub attributes: Vec<String>,
    pub function_name: String,
    pub function_description: String,
    pub user_message: String,
}

impl SchemaRequest {
    /// Build a request whose message asks the model to call the function.
    pub fn new(
        entities: Vec<String>,
        attributes: Vec<String>,
        function_name: impl Into<String>,
        function_description: impl Into<String>,
    ) -> Self {
        let function_name = function_name.into();
        let user_message = default_user_message(&function_name, &attributes);
        Self {
            entities,
            attributes,
            function_name,
            function_description: function_description.into(),
            user_message,
        }
    }

    /// Parse free-text menu input. Lists are comma-separated.
    pub fn from_input(entities: &str, attributes: &str, name: &str, description: &str) -> Self {
        Self::new(
            split_list(entities),
            split_list(attributes),
            name.trim(),
            description.trim(),
        )
    }

    pub fn builder(&self) -> FunctionCallBuilder {
        FunctionCallBuilder::new(
            self.entities.iter().cloned(),
            self.attributes.iter().cloned(),
            self.function_name.clone(),
            self.function_description.clone(),
        )
    }
}

impl From<CatalogEntry> for SchemaRequest {
    fn from(entry: CatalogEntry) -> Self {
        Self::new(entry.entities, entry.attributes, entry.name, entry.description)
    }
}

/// ``Please use your `{name}` function to define the {a, b, c} for each entity.``
pub fn default_user_message(function_name: &str, attributes: &[String]) -> String {
    format!(
        "Please use your `{function_name}` function to define the {} for each entity.",
        attributes.join(", ")
    )
}

/// Split on commas and trim. Empty items are dropped.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Load the whole catalog. A missing file and malformed JSON are distinct errors.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogEntry>, CatalogError> {
    let path = path.as_ref();
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_str(&json).map_err(|e| CatalogError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The country example the tool has always shipped with.
pub fn demo_request() -> SchemaRequest {
    let function_name = "define_country_attributes";
    SchemaRequest {
        entities: vec!["USA".into(), "Canada".into(), "Germany".into()],
        attributes: vec![
            "Tourist_Attractions".into(),
            "Cultural_Experience".into(),
            "Cuisine".into(),
        ],
        function_name: function_name.into(),
        function_description: "Define attributes for various countries.".into(),
        user_message: format!(
            "Please use your `{function_name}` function to define the tourist attractions, \
             cultural experiences, and cuisine for each country."
        ),
    }
}
