//! Brownfield codebase analysis snapshot (`planning/codebase-analysis.yaml`)

use super::tech_stack::Dependency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A convention observed in the existing codebase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPattern {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub example: String,
}

impl ExistingPattern {
    pub fn new(name: &str, description: &str, files: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            files,
            example: String::new(),
        }
    }
}

/// One entry of a directory listing: a file name, or a nested directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectoryNode {
    File(String),
    Directory(BTreeMap<String, DirectorySummary>),
}

/// Depth-limited listing of a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    #[serde(default)]
    pub children: Vec<DirectoryNode>,
}

/// Read-only snapshot of an existing repository, consumed by the
/// architect phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebaseAnalysis {
    pub analyzed_at: DateTime<Utc>,
    #[serde(default)]
    pub detected_language: String,
    #[serde(default)]
    pub detected_framework: String,
    #[serde(default)]
    pub package_manager: String,
    #[serde(default)]
    pub existing_dependencies: Vec<Dependency>,
    #[serde(default)]
    pub patterns: Vec<ExistingPattern>,
    /// Common top-level directories found in the repository
    #[serde(default)]
    pub directory_structure: BTreeMap<String, DirectorySummary>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl CodebaseAnalysis {
    pub fn new(analyzed_at: DateTime<Utc>) -> Self {
        Self {
            analyzed_at,
            detected_language: String::new(),
            detected_framework: String::new(),
            package_manager: String::new(),
            existing_dependencies: Vec::new(),
            patterns: Vec::new(),
            directory_structure: BTreeMap::new(),
            constraints: Vec::new(),
        }
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.existing_dependencies.iter().any(|d| d.name == name)
    }
}
