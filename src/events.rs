use std::path::PathBuf;

/// Events emitted during an invocation, for UI display.
#[derive(Debug, Clone)]
pub enum InvocationEvent {
    Request { function: String, parameters: usize },
    Response { rendered: String, token_count: u32 },
    Persisted { path: PathBuf },
}
