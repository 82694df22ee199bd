pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod inference;
pub mod invoker;
pub mod menu;
pub mod schema;
pub mod store;
pub mod token;
pub mod types;

#[cfg(test)]
mod test_support;

pub use builder::{CollisionPolicy, FunctionCallBuilder};
pub use catalog::{default_user_message, demo_request, load_catalog, CatalogEntry, SchemaRequest};
pub use config::CompletionConfig;
pub use error::{CatalogError, InferenceError, InvokeError, MenuError, SchemaError};
pub use events::InvocationEvent;
pub use inference::{InferenceProvider, OpenAiProvider};
pub use invoker::{InvocationResult, Invoker};
pub use menu::Menu;
pub use schema::{parameter_key, FunctionDefinition, Parameters, Property};
pub use store::{FileResultStore, NoResultStore, ResultStore};
pub use token::{estimate_str_tokens, HeuristicTokenCounter, TokenCounter};
pub use types::{InferenceRequest, InferenceResponse, Reply, StopReason, Usage};
