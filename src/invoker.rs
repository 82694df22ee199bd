use std::path::PathBuf;

use tracing::info;

use crate::config::CompletionConfig;
use crate::error::InvokeError;
use crate::events::InvocationEvent;
use crate::inference::InferenceProvider;
use crate::schema::FunctionDefinition;
use crate::store::{FileResultStore, ResultStore};
use crate::token::{HeuristicTokenCounter, TokenCounter};
use crate::types::{InferenceRequest, Reply, StopReason, Usage};

/// Result of one invocation.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub reply: Reply,
    pub stop_reason: StopReason,
    /// String form of the reply, as printed and persisted.
    pub rendered: String,
    pub token_count: u32,
    pub usage: Usage,
    pub persisted_to: Option<PathBuf>,
}

impl InvocationResult {
    /// Contents of the persisted artifact.
    pub fn artifact(&self) -> String {
        render_artifact(&self.rendered, self.token_count)
    }
}

fn render_artifact(rendered: &str, token_count: u32) -> String {
    format!("{rendered}\nToken count: {token_count}")
}

/// Sends one function definition and one user message to the completion
/// service, then reports and persists what came back.
pub struct Invoker {
    provider: Box<dyn InferenceProvider>,
    counter: Box<dyn TokenCounter>,
    store: Box<dyn ResultStore>,
    config: CompletionConfig,
}

impl Invoker {
    /// Defaults: chars/4 token counting, results written to the working directory.
    pub fn new(provider: impl InferenceProvider + 'static, config: CompletionConfig) -> Self {
        Self {
            provider: Box::new(provider),
            counter: Box::new(HeuristicTokenCounter),
            store: Box::new(FileResultStore::current_dir()),
            config,
        }
    }

    pub fn with_token_counter(mut self, counter: impl TokenCounter + 'static) -> Self {
        self.counter = Box::new(counter);
        self
    }

    pub fn with_store(mut self, store: impl ResultStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub async fn invoke(
        &self,
        user_message: &str,
        definition: &FunctionDefinition,
    ) -> Result<InvocationResult, InvokeError> {
        self.run(user_message, definition, None).await
    }

    /// Invocation with events on `tx` as each stage completes.
    pub async fn invoke_streaming(
        &self,
        user_message: &str,
        definition: &FunctionDefinition,
        tx: tokio::sync::mpsc::Sender<InvocationEvent>,
    ) -> Result<InvocationResult, InvokeError> {
        self.run(user_message, definition, Some(tx)).await
    }

    async fn run(
        &self,
        user_message: &str,
        definition: &FunctionDefinition,
        tx: Option<tokio::sync::mpsc::Sender<InvocationEvent>>,
    ) -> Result<InvocationResult, InvokeError> {
        if let Some(ref tx) = tx {
            let _ = tx
                .send(InvocationEvent::Request {
                    function: definition.name.clone(),
                    parameters: definition.parameters.len(),
                })
                .await;
        }

        let request = InferenceRequest::single_call(&self.config, user_message, definition);
        let response = self.provider.infer(request).await?;

        let rendered = response.reply.to_string();
        let token_count = self.counter.count(&rendered);

        info!(
            function = %definition.name,
            stop_reason = ?response.stop_reason,
            token_count,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );
        match tx {
            Some(ref tx) => {
                let _ = tx
                    .send(InvocationEvent::Response {
                        rendered: rendered.clone(),
                        token_count,
                    })
                    .await;
            }
            // No listener: the response itself goes to the log.
            None => info!(function = %definition.name, token_count, "{rendered}"),
        }

        let persisted_to = self
            .store
            .save(&definition.name, &render_artifact(&rendered, token_count))
            .await?;

        if let (Some(tx), Some(path)) = (tx.as_ref(), persisted_to.as_ref()) {
            let _ = tx
                .send(InvocationEvent::Persisted { path: path.clone() })
                .await;
        }

        Ok(InvocationResult {
            reply: response.reply,
            stop_reason: response.stop_reason,
            rendered,
            token_count,
            usage: response.usage,
            persisted_to,
        })
    }
}
