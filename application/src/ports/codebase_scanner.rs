//! Codebase scanner port
//!
//! Produces the [`CodebaseAnalysis`] snapshot used by brownfield planning.

use planner_domain::CodebaseAnalysis;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Target repository not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Analyzes an existing repository
pub trait CodebaseScanner: Send + Sync {
    fn analyze(&self, root: &Path) -> Result<CodebaseAnalysis, ScanError>;
}
