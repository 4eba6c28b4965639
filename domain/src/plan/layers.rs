//! Layer definition document produced by the architect phase

use super::graph::{self, DependencyReport};
use crate::core::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An architectural partition of the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub order: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    /// Output directories owned by the layer
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// `planning/layers.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    #[serde(default = "default_version", deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub architect_summary: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Default for LayerDefinition {
    fn default() -> Self {
        Self {
            version: default_version(),
            created: None,
            architect_summary: String::new(),
            layers: Vec::new(),
        }
    }
}

impl LayerDefinition {
    pub fn get_layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// Layers in ascending `order`; ties keep document order.
    pub fn sorted_layers(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.order);
        layers
    }

    /// Check `depends_on` edges for cycles and unknown layer ids.
    pub fn dependency_report(&self) -> DependencyReport {
        graph::analyze(
            self.layers
                .iter()
                .map(|l| (l.id.as_str(), l.depends_on.as_slice())),
        )
    }
}
