//! Group definition document produced by the layer planner phase

use super::graph::{self, DependencyReport};
use crate::core::lenient;
use serde::{Deserialize, Serialize};

/// An exported symbol a group promises to provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractExport {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub file: String,
}

/// An interface and its ordered method signatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupContract {
    #[serde(default)]
    pub exports: Vec<ContractExport>,
    #[serde(default)]
    pub interfaces: Vec<ContractInterface>,
}

impl GroupContract {
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty() && self.interfaces.is_empty()
    }
}

/// A cohesive functional subdivision of a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub order: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub contracts: Option<GroupContract>,
    #[serde(default)]
    pub depends_on_groups: Vec<String>,
    /// Hint only, never enforced
    #[serde(default, deserialize_with = "lenient::count")]
    pub estimated_tasks: u32,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// `planning/groups/<layer_id>/groups.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    #[serde(default = "default_version", deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub layer_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub layer_name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Batches of group ids that may run in parallel (advisory)
    #[serde(default)]
    pub execution_order: Vec<Vec<String>>,
}

impl Default for GroupDefinition {
    fn default() -> Self {
        Self {
            version: default_version(),
            layer_id: String::new(),
            layer_name: String::new(),
            groups: Vec::new(),
            execution_order: Vec::new(),
        }
    }
}

impl GroupDefinition {
    pub fn get_group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Groups in ascending `order`; ties keep document order.
    pub fn sorted_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    /// Check `depends_on_groups` edges for cycles and unknown group ids.
    pub fn dependency_report(&self) -> DependencyReport {
        graph::analyze(
            self.groups
                .iter()
                .map(|g| (g.id.as_str(), g.depends_on_groups.as_slice())),
        )
    }

    /// Ids named in `execution_order` that are not groups of this layer.
    pub fn unknown_execution_ids(&self) -> Vec<String> {
        let mut unknown = Vec::new();
        for id in self.execution_order.iter().flatten() {
            if self.get_group(id).is_none() && !unknown.contains(id) {
                unknown.push(id.clone());
            }
        }
        unknown
    }
}
