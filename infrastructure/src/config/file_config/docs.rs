//! `[docs]` and `[logging]` sections

use serde::{Deserialize, Serialize};

/// Registry documentation limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDocsConfig {
    /// HTTP timeout per registry request
    pub timeout_seconds: u64,
    /// Maximum characters in a cached summary
    pub summary_chars: usize,
    /// Maximum characters per summary section
    pub section_chars: usize,
}

impl Default for FileDocsConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            summary_chars: 8000,
            section_chars: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a JSONL transcript to `planning/logs/<session-id>.jsonl`
    pub transcript: bool,
}
