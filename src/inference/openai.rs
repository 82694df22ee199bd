use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::InferenceProvider;
use crate::error::InferenceError;
use crate::types::{InferenceRequest, InferenceResponse, Reply, StopReason, Usage};

/// OpenAI-compatible provider. Works with vLLM, LM Studio, OpenRouter,
/// or any server that implements the `/v1/chat/completions` endpoint with
/// function calling.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Set an API key (required for OpenAI, OpenRouter, etc.).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Request body for `/v1/chat/completions`.
    pub fn build_body(request: &InferenceRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        if !request.functions.is_empty() {
            let functions: Vec<Value> = request.functions.iter().map(|f| f.to_value()).collect();
            body["functions"] = Value::Array(functions);
        }

        body
    }

    /// Map a chat completion payload to a tagged reply. Accepts both the
    /// legacy `function_call` field and `tool_calls`.
    pub fn parse_response(parsed: &Value) -> Result<InferenceResponse, InferenceError> {
        let choice = parsed["choices"]
            .get(0)
            .ok_or_else(|| InferenceError::Parse("response has no choices".into()))?;

        let stop_reason = match choice["finish_reason"].as_str().unwrap_or("stop") {
            "stop" => StopReason::EndTurn,
            "function_call" | "tool_calls" => StopReason::FunctionCall,
            "length" => StopReason::MaxTokens,
            other => {
                debug!(finish_reason = %other, "unknown finish_reason, treating as EndTurn");
                StopReason::EndTurn
            }
        };

        let message = &choice["message"];
        let call = if message["function_call"].is_object() {
            Some(&message["function_call"])
        } else {
            message["tool_calls"]
                .get(0)
                .map(|tc| &tc["function"])
                .filter(|f| f.is_object())
        };

        let reply = match call {
            Some(call) => {
                let name = call["name"].as_str().unwrap_or("").to_string();
                let args_str = call["arguments"].as_str().unwrap_or("{}");
                // Truncated output (finish_reason "length") is kept as the raw string.
                let arguments = serde_json::from_str(args_str)
                    .unwrap_or_else(|_| Value::String(args_str.to_string()));
                Reply::FunctionCall { name, arguments }
            }
            None => Reply::Text(message["content"].as_str().unwrap_or("").to_string()),
        };

        let usage = Usage {
            input_tokens: parsed["usage"]["prompt_tokens"]
                .as_u64()
                .unwrap_or(0) as u32,
            output_tokens: parsed["usage"]["completion_tokens"]
                .as_u64()
                .unwrap_or(0) as u32,
        };

        Ok(InferenceResponse {
            stop_reason,
            reply,
            usage,
        })
    }
}

#[async_trait]
impl InferenceProvider for OpenAiProvider {
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = Self::build_body(&request);

        debug!(
            model = %request.model,
            functions = request.functions.len(),
            max_tokens = request.max_tokens,
            "openai inference request"
        );

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("content-type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("authorization", format!("Bearer {key}"));
        }

        let resp = req
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        if status != 200 {
            return Err(InferenceError::ApiError { status, body: text });
        }

        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| InferenceError::Parse(e.to_string()))?;

        Self::parse_response(&parsed)
    }
}
