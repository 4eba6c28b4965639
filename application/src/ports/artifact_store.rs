//! Artifact store port
//!
//! Planning documents are addressed by `/`-separated logical paths relative
//! to the project root (`planning/session.yaml`, `docs/tech/hono/summary.md`).
//! The store only moves text; typed access lives in
//! [`PlanningRepository`](crate::use_cases::repository::PlanningRepository).

use thiserror::Error;

/// Errors raised by artifact storage
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document {path}: {detail}")]
    Serialization { path: String, detail: String },
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(path: impl Into<String>, detail: impl ToString) -> Self {
        StoreError::Serialization {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            StoreError::Io { path, .. } | StoreError::Serialization { path, .. } => path,
        }
    }
}

/// Key-value document store keyed by logical path.
///
/// Last writer wins; there are no transactions.
pub trait ArtifactStore: Send + Sync {
    /// Read a document. `Ok(None)` when it does not exist.
    fn read(&self, path: &str) -> Result<Option<String>, StoreError>;

    /// Write a document, creating parent directories as needed.
    fn write(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Remove a document or a whole directory. Returns `false` if nothing
    /// existed at `path`.
    fn remove(&self, path: &str) -> Result<bool, StoreError>;

    /// Sorted names of the entries directly under `dir`. Empty when the
    /// directory does not exist.
    fn list(&self, dir: &str) -> Result<Vec<String>, StoreError>;

    fn exists(&self, path: &str) -> bool;
}
