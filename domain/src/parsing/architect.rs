//! Architect reply parser: tech stack + layers blocks

use super::blocks::{FencedBlock, fenced_blocks};
use super::failure::{BlockKind, ParseFailure};
use super::is_path_segment;
use crate::plan::layers::LayerDefinition;
use crate::plan::tech_stack::TechStack;
use std::collections::HashSet;

/// Typed architect output
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectDraft {
    pub tech_stack: TechStack,
    pub layers: LayerDefinition,
    /// Non-fatal findings (unknown dependency ids)
    pub warnings: Vec<String>,
}

/// Classify a YAML block by its top-level keys.
pub fn classify(block: &FencedBlock) -> Option<BlockKind> {
    if !block.is_yaml() {
        return None;
    }
    if block.has_top_level_keys(&["architect_summary", "layers"]) {
        Some(BlockKind::Layers)
    } else if block.has_top_level_keys(&["layer_id", "groups"]) {
        Some(BlockKind::Groups)
    } else if block.has_top_level_keys(&["project_type"]) {
        Some(BlockKind::TechStack)
    } else {
        None
    }
}

/// First YAML block of the given kind.
pub fn find_block(blocks: &[FencedBlock], kind: BlockKind) -> Option<&FencedBlock> {
    blocks.iter().find(|b| classify(b) == Some(kind))
}

/// Parse an architect reply. Both blocks must be present and valid.
pub fn parse_architect(reply: &str) -> Result<ArchitectDraft, ParseFailure> {
    let blocks = fenced_blocks(reply);

    let tech_block =
        find_block(&blocks, BlockKind::TechStack).ok_or(ParseFailure::missing(BlockKind::TechStack))?;
    let layers_block =
        find_block(&blocks, BlockKind::Layers).ok_or(ParseFailure::missing(BlockKind::Layers))?;

    let tech_stack: TechStack = serde_yaml::from_str(&tech_block.body)
        .map_err(|e| ParseFailure::malformed(BlockKind::TechStack, e.to_string()))?;
    let layers: LayerDefinition = serde_yaml::from_str(&layers_block.body)
        .map_err(|e| ParseFailure::malformed(BlockKind::Layers, e.to_string()))?;

    let warnings = validate_layers(&layers)?;

    Ok(ArchitectDraft {
        tech_stack,
        layers,
        warnings,
    })
}

fn validate_layers(layers: &LayerDefinition) -> Result<Vec<String>, ParseFailure> {
    if layers.layers.is_empty() {
        return Err(ParseFailure::below_minimum(BlockKind::Layers, 0, 1));
    }

    let mut seen = HashSet::new();
    for layer in &layers.layers {
        if layer.id.trim().is_empty() {
            return Err(ParseFailure::malformed(BlockKind::Layers, "layer with empty id"));
        }
        if !is_path_segment(&layer.id) {
            return Err(ParseFailure::malformed(
                BlockKind::Layers,
                format!("layer id '{}' is not a plain name", layer.id),
            ));
        }
        if !seen.insert(layer.id.as_str()) {
            return Err(ParseFailure::malformed(
                BlockKind::Layers,
                format!("duplicate layer id '{}'", layer.id),
            ));
        }
    }

    let report = layers.dependency_report();
    if let Some(cycle) = report.cycle {
        return Err(ParseFailure::malformed(
            BlockKind::Layers,
            format!("dependency cycle: {}", cycle.join(" -> ")),
        ));
    }

    Ok(report.warnings())
}
