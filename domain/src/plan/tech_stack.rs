//! Tech stack document produced by the architect phase

use crate::core::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A project dependency with the reason it was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub purpose: String,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            purpose: purpose.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub docs_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub language: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub runtime: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub runtime_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub orm: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub orm_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingConfig {
    #[serde(default, deserialize_with = "lenient::string")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub e2e: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub integration: String,
}

impl TestingConfig {
    /// Configured tools in `unit`, `e2e`, `integration` order, skipping blanks.
    pub fn tools(&self) -> impl Iterator<Item = &str> {
        [&self.unit, &self.e2e, &self.integration]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_project_type() -> String {
    "web_application".to_string()
}

/// Complete tech stack definition (`planning/tech-stack.yaml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechStack {
    #[serde(default = "default_version", deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default = "default_project_type", deserialize_with = "lenient::string")]
    pub project_type: String,
    #[serde(default)]
    pub runtime: Option<RuntimeConfig>,
    /// Keyed by role, e.g. `frontend`, `backend`
    #[serde(default)]
    pub frameworks: BTreeMap<String, FrameworkConfig>,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub testing: Option<TestingConfig>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub security_notes: Vec<String>,
}

impl Default for TechStack {
    fn default() -> Self {
        Self {
            version: default_version(),
            created: None,
            project_type: default_project_type(),
            runtime: None,
            frameworks: BTreeMap::new(),
            database: None,
            testing: None,
            dependencies: Vec::new(),
            security_notes: Vec::new(),
        }
    }
}

impl TechStack {
    /// Every named technology worth caching documentation for:
    /// frameworks, the ORM, test tools and dependencies, deduplicated in
    /// first-seen order.
    pub fn technology_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };

        for framework in self.frameworks.values() {
            push(&framework.name);
        }
        if let Some(db) = &self.database {
            push(&db.orm);
        }
        if let Some(testing) = &self.testing {
            for tool in testing.tools() {
                push(tool);
            }
        }
        for dep in &self.dependencies {
            push(&dep.name);
        }

        names
    }
}
