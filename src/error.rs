use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Why a set of entities and attributes could not become a function definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("at least one entity is required")]
    NoEntities,
    #[error("at least one attribute is required")]
    NoAttributes,
    #[error("blank {kind} label at position {index}")]
    BlankLabel { kind: &'static str, index: usize },
    #[error("invalid function name '{0}': use 1-64 characters of a-z, A-Z, 0-9, '_' or '-'")]
    InvalidName(String),
    #[error("parameter '{key}' is produced by both ({first}) and ({second})")]
    DuplicateParameter {
        key: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog file {} was not found", path.display())]
    NotFound { path: PathBuf },
    #[error("catalog file {} is not valid JSON: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
    #[error("failed to persist result: {0}")]
    Persist(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
