use std::fmt;

use serde_json::{json, Value};

use crate::schema::FunctionDefinition;

/// Fully-formed request. The provider just sends it.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<Value>,
    pub functions: Vec<FunctionDefinition>,
}

impl InferenceRequest {
    /// A single user turn with one callable function.
    pub fn single_call(
        config: &crate::CompletionConfig,
        user_message: &str,
        definition: &FunctionDefinition,
    ) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            messages: vec![json!({ "role": "user", "content": user_message })],
            functions: vec![definition.clone()],
        }
    }
}

/// What came back from the completion service.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub stop_reason: StopReason,
    pub reply: Reply,
    pub usage: Usage,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    FunctionCall,
    MaxTokens,
}

/// The model either called the function or answered in prose.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    FunctionCall { name: String, arguments: Value },
    Text(String),
}

impl Reply {
    /// Arguments of a function call, if the model made one.
    pub fn arguments(&self) -> Option<&Value> {
        match self {
            Reply::FunctionCall { arguments, .. } => Some(arguments),
            Reply::Text(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::FunctionCall { name, arguments } => {
                let call = json!({ "function_call": { "name": name, "arguments": arguments } });
                let rendered = serde_json::to_string_pretty(&call).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
            Reply::Text(text) => f.write_str(text),
        }
    }
}

/// Token usage reported by the service for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
