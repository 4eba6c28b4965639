//! Typed access to the planning documents
//!
//! Every planning document lives at a fixed logical path under the project
//! root. [`PlanningRepository`] maps those paths to domain types and back
//! using YAML, over whatever [`ArtifactStore`] the binary injects.

use crate::ports::artifact_store::{ArtifactStore, StoreError};
use planner_domain::plan::task::is_task_id;
use planner_domain::{
    CodebaseAnalysis, GroupDefinition, LayerDefinition, Persona, PhasePrompt, PlanningPhase,
    PlanningSession, TaskDocument, TechStack, normalize_tech_name,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SESSION_PATH: &str = "planning/session.yaml";
pub const TECH_STACK_PATH: &str = "planning/tech-stack.yaml";
pub const LAYERS_PATH: &str = "planning/layers.yaml";
pub const CODEBASE_ANALYSIS_PATH: &str = "planning/codebase-analysis.yaml";
pub const GROUPS_DIR: &str = "planning/groups";
pub const TASKS_DIR: &str = "planning/tasks";
pub const TECH_DOCS_DIR: &str = "docs/tech";

/// `planning/groups/<layer_id>/groups.yaml`
pub fn groups_path(layer_id: &str) -> String {
    format!("{}/{}/groups.yaml", GROUPS_DIR, layer_id)
}

pub fn tasks_dir(group_id: &str) -> String {
    format!("{}/{}", TASKS_DIR, group_id)
}

pub fn task_path(group_id: &str, task: &TaskDocument) -> String {
    format!("{}/{}", tasks_dir(group_id), task.file_name())
}

/// Cache directory of a technology's docs, keyed by normalized name.
pub fn tech_docs_dir(name: &str) -> String {
    format!("{}/{}", TECH_DOCS_DIR, normalize_tech_name(name))
}

pub fn tech_docs_summary_path(name: &str) -> String {
    format!("{}/summary.md", tech_docs_dir(name))
}

/// Typed planning documents over an [`ArtifactStore`].
#[derive(Clone)]
pub struct PlanningRepository {
    store: Arc<dyn ArtifactStore>,
}

impl PlanningRepository {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    fn load_yaml<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, StoreError> {
        match self.store.read(path)? {
            Some(text) => serde_yaml::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::serialization(path, e)),
            None => Ok(None),
        }
    }

    fn save_yaml<T: Serialize>(&self, path: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_yaml::to_string(value).map_err(|e| StoreError::serialization(path, e))?;
        self.store.write(path, &text)
    }

    // ==================== Session ====================

    pub fn load_session(&self) -> Result<Option<PlanningSession>, StoreError> {
        self.load_yaml(SESSION_PATH)
    }

    pub fn save_session(&self, session: &PlanningSession) -> Result<(), StoreError> {
        debug!("Saving session {} ({})", session.id, session.current_phase);
        self.save_yaml(SESSION_PATH, session)
    }

    // ==================== Phase documents ====================

    pub fn load_tech_stack(&self) -> Result<Option<TechStack>, StoreError> {
        self.load_yaml(TECH_STACK_PATH)
    }

    pub fn save_tech_stack(&self, tech_stack: &TechStack) -> Result<(), StoreError> {
        self.save_yaml(TECH_STACK_PATH, tech_stack)
    }

    pub fn load_layers(&self) -> Result<Option<LayerDefinition>, StoreError> {
        self.load_yaml(LAYERS_PATH)
    }

    pub fn save_layers(&self, layers: &LayerDefinition) -> Result<(), StoreError> {
        self.save_yaml(LAYERS_PATH, layers)
    }

    pub fn load_groups(&self, layer_id: &str) -> Result<Option<GroupDefinition>, StoreError> {
        self.load_yaml(&groups_path(layer_id))
    }

    pub fn save_groups(&self, layer_id: &str, groups: &GroupDefinition) -> Result<(), StoreError> {
        self.save_yaml(&groups_path(layer_id), groups)
    }

    pub fn load_codebase_analysis(&self) -> Result<Option<CodebaseAnalysis>, StoreError> {
        self.load_yaml(CODEBASE_ANALYSIS_PATH)
    }

    pub fn save_codebase_analysis(&self, analysis: &CodebaseAnalysis) -> Result<(), StoreError> {
        self.save_yaml(CODEBASE_ANALYSIS_PATH, analysis)
    }

    // ==================== Tasks ====================

    /// Write a task verbatim and return its path.
    pub fn save_task(&self, group_id: &str, task: &TaskDocument) -> Result<String, StoreError> {
        let path = task_path(group_id, task);
        self.store.write(&path, &task.markdown)?;
        Ok(path)
    }

    /// Ids of the stored tasks of a group, sorted.
    pub fn list_tasks(&self, group_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .list(&tasks_dir(group_id))?
            .into_iter()
            .filter_map(|name| name.strip_suffix(".md").map(str::to_string))
            .filter(|id| is_task_id(id))
            .collect())
    }

    pub fn remove_tasks(&self, group_id: &str) -> Result<bool, StoreError> {
        self.store.remove(&tasks_dir(group_id))
    }

    pub fn remove(&self, path: &str) -> Result<bool, StoreError> {
        self.store.remove(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.store.exists(path)
    }

    // ==================== Project customisation ====================

    /// Persona overrides from `dir`. Files that fail to read or parse are
    /// skipped.
    pub fn load_personas(&self, dir: &str) -> Vec<Persona> {
        let names = match self.store.list(dir) {
            Ok(names) => names,
            Err(e) => {
                warn!("Cannot list personas in {}: {}", dir, e);
                return Vec::new();
            }
        };

        names
            .into_iter()
            .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
            .filter_map(|name| {
                let path = format!("{}/{}", dir, name);
                match self.store.read(&path) {
                    Ok(Some(text)) => match Persona::from_yaml(&text) {
                        Ok(persona) => Some(persona),
                        Err(e) => {
                            warn!("Skipping persona {}: {}", path, e);
                            None
                        }
                    },
                    Ok(None) => None,
                    Err(e) => {
                        warn!("Skipping persona {}: {}", path, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Project template for a phase's task prompt, if one exists.
    pub fn load_prompt_template(&self, dir: &str, phase: PlanningPhase) -> Option<String> {
        let file = PhasePrompt::file_name(phase)?;
        let path = format!("{}/{}", dir, file);
        match self.store.read(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Ignoring prompt template {}: {}", path, e);
                None
            }
        }
    }

    /// Cached documentation summary of a technology.
    pub fn cached_docs(&self, name: &str) -> Option<String> {
        self.store
            .read(&tech_docs_summary_path(name))
            .ok()
            .flatten()
    }
}
