use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::InvokeError;

/// Durable home for invocation results, keyed by function name.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist `contents` under `function_name`, replacing any previous result.
    /// Returns where it went, if anywhere.
    async fn save(&self, function_name: &str, contents: &str)
        -> Result<Option<PathBuf>, InvokeError>;
}

// --- NoResultStore ---

/// No persistence.
pub struct NoResultStore;

#[async_trait]
impl ResultStore for NoResultStore {
    async fn save(&self, _: &str, _: &str) -> Result<Option<PathBuf>, InvokeError> {
        Ok(None)
    }
}

// --- FileResultStore ---

/// Writes `{function_name}.txt` into a directory. Two invocations with the same
/// function name write the same file, and the last one wins.
pub struct FileResultStore {
    dir: PathBuf,
}

impl FileResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn path_for(&self, function_name: &str) -> PathBuf {
        self.dir.join(format!("{function_name}.txt"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn save(
        &self,
        function_name: &str,
        contents: &str,
    ) -> Result<Option<PathBuf>, InvokeError> {
        let path = self.path_for(function_name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| InvokeError::Persist(format!("{}: {e}", path.display())))?;
        Ok(Some(path))
    }
}
