//! Context Builder
//!
//! Rebuilds the context text of each phase from the persisted artifacts.
//! Nothing carries over from earlier conversations: a phase sees its
//! persona, this context and its task prompt, nothing else.
//!
//! Missing upstream documents degrade to labelled placeholder sections.
//! Corrupted ones are logged and treated as missing.

use super::repository::PlanningRepository;
use crate::ports::artifact_store::StoreError;
use crate::ports::product_source::ProductSource;
use planner_domain::{
    CodebaseAnalysis, Feature, GroupDefinition, LayerDefinition, Requirement, TechStack,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// What the project has so far, for status displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactsSummary {
    pub prd_exists: bool,
    pub feature_count: usize,
    pub requirement_count: usize,
    pub tech_stack_defined: bool,
    pub layers_defined: bool,
    pub layer_count: usize,
}

pub struct ContextBuilder {
    repository: PlanningRepository,
    product: Arc<dyn ProductSource>,
}

impl ContextBuilder {
    pub fn new(repository: PlanningRepository, product: Arc<dyn ProductSource>) -> Self {
        Self {
            repository,
            product,
        }
    }

    // ==================== Lenient loads ====================

    fn lenient<T>(&self, what: &str, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Treating {} as missing: {}", what, e);
                None
            }
        }
    }

    pub fn tech_stack(&self) -> Option<TechStack> {
        self.lenient("tech stack", self.repository.load_tech_stack())
            .flatten()
    }

    pub fn layers(&self) -> Option<LayerDefinition> {
        self.lenient("layers", self.repository.load_layers())
            .flatten()
    }

    pub fn groups(&self, layer_id: &str) -> Option<GroupDefinition> {
        self.lenient("groups", self.repository.load_groups(layer_id))
            .flatten()
    }

    fn prd(&self) -> Option<String> {
        self.lenient("PRD", self.product.load_prd())
            .flatten()
            .filter(|text| !text.trim().is_empty())
    }

    fn features(&self) -> Vec<Feature> {
        self.lenient("features", self.product.load_features())
            .unwrap_or_default()
    }

    fn requirements(&self) -> Vec<Requirement> {
        self.lenient("requirements", self.product.load_requirements())
            .unwrap_or_default()
    }

    // ==================== Architect ====================

    /// PRD, features, requirements and, for brownfield projects, the
    /// codebase analysis.
    pub fn architect_context(&self, codebase: Option<&CodebaseAnalysis>) -> String {
        let mut sections = Vec::new();

        sections.push("# Product Requirements Document\n".to_string());
        sections.push(self.prd().unwrap_or_else(|| "No PRD found.".to_string()));
        sections.push(String::new());

        sections.push(format_features(&self.features()));
        sections.push(String::new());
        sections.push(format_requirements(&self.requirements()));

        if let Some(analysis) = codebase {
            sections.push(String::new());
            sections.push(format_codebase(analysis));
        }

        sections.join("\n")
    }

    // ==================== Layer planner ====================

    /// Tech stack, the full layer list with the current layer marked, the
    /// current layer's details and cached docs of the chosen technologies.
    pub fn layer_context(&self, layer_id: &str) -> String {
        let tech_stack = self.tech_stack();
        let mut sections = Vec::new();

        sections.push("# Tech Stack\n".to_string());
        match &tech_stack {
            Some(stack) => sections.extend(tech_stack_lines(stack, true)),
            None => sections.push("No tech stack defined yet.".to_string()),
        }
        sections.push(String::new());

        sections.push("# Architecture Layers\n".to_string());
        match self.layers() {
            Some(layers) => {
                sections.push(format!("Summary: {}\n", layers.architect_summary.trim()));

                match layers.get_layer(layer_id) {
                    Some(layer) => {
                        sections.push(format!("## Current Layer: {}\n", layer.name));
                        sections.push(format!("Order: {}", layer.order));
                        sections.push(format!("Description: {}", layer.description.trim()));

                        if !layer.responsibilities.is_empty() {
                            sections.push("\nResponsibilities:".to_string());
                            for item in &layer.responsibilities {
                                sections.push(format!("  - {}", item));
                            }
                        }
                        if !layer.outputs.is_empty() {
                            sections.push("\nOutput Directories:".to_string());
                            for item in &layer.outputs {
                                sections.push(format!("  - {}", item));
                            }
                        }
                        if !layer.depends_on.is_empty() {
                            sections.push(format!("\nDependencies: {}", layer.depends_on.join(", ")));
                        }
                    }
                    None => sections.push(format!("Layer {} is not defined.", layer_id)),
                }

                sections.push("\n## All Layers\n".to_string());
                for layer in layers.sorted_layers() {
                    let marker = if layer.id == layer_id { ">>> " } else { "    " };
                    sections.push(format!(
                        "{}{}: {} (order: {})",
                        marker, layer.id, layer.name, layer.order
                    ));
                }
            }
            None => sections.push("No layers defined yet.".to_string()),
        }

        if let Some(stack) = &tech_stack {
            if let Some(docs) = self.tech_docs(stack) {
                sections.push(String::new());
                sections.push(docs);
            }
        }

        sections.join("\n")
    }

    // ==================== Group planner ====================

    /// The group's description and contract, plus the interface-only
    /// contracts of the groups it depends on.
    pub fn group_context(&self, layer_id: &str, group_id: &str) -> String {
        let mut sections = Vec::new();

        match self.groups(layer_id) {
            Some(groups) => {
                let layer_name = if groups.layer_name.is_empty() {
                    layer_id
                } else {
                    groups.layer_name.as_str()
                };
                sections.push(format!("# Layer: {}\n", layer_name));

                let current = groups.get_group(group_id);
                match current {
                    Some(group) => {
                        sections.push(format!("## Current Group: {}\n", group.name));
                        sections.push(format!("Description: {}", group.description.trim()));
                        sections.push(format!("Estimated Tasks: {}", group.estimated_tasks));

                        if !group.depends_on_groups.is_empty() {
                            sections.push(format!(
                                "\nDepends on groups: {}",
                                group.depends_on_groups.join(", ")
                            ));
                        }

                        if let Some(contract) = group.contracts.as_ref().filter(|c| !c.is_empty()) {
                            sections.push("\n### Contracts to Define".to_string());
                            if !contract.exports.is_empty() {
                                sections.push("\nExports:".to_string());
                                for export in &contract.exports {
                                    sections.push(format!(
                                        "  - {}: {} ({})",
                                        export.name, export.kind, export.file
                                    ));
                                }
                            }
                            if !contract.interfaces.is_empty() {
                                sections.push("\nInterfaces:".to_string());
                                for interface in &contract.interfaces {
                                    sections.push(format!("  - {}", interface.name));
                                    for method in &interface.methods {
                                        sections.push(format!("      {}", method));
                                    }
                                }
                            }
                        }
                    }
                    None => sections.push(format!("Group {} is not defined.", group_id)),
                }

                sections.push("\n## Dependent Group Contracts\n".to_string());
                let dependencies = current.map(|g| g.depends_on_groups.as_slice()).unwrap_or(&[]);
                if dependencies.is_empty() {
                    sections.push("This group depends on no other group.".to_string());
                }
                for dep_id in dependencies {
                    let Some(dep) = groups.get_group(dep_id) else {
                        continue;
                    };
                    let Some(contract) = &dep.contracts else {
                        continue;
                    };
                    sections.push(format!("### From {}", dep.name));
                    for interface in &contract.interfaces {
                        sections.push("```typescript".to_string());
                        sections.push(format!("interface {} {{", interface.name));
                        for method in &interface.methods {
                            sections.push(format!("  {}", method));
                        }
                        sections.push("}".to_string());
                        sections.push("```".to_string());
                    }
                }
            }
            None => {
                sections.push(format!("# Layer: {}\n", layer_id));
                sections.push("No groups defined yet.".to_string());
            }
        }
        sections.push(String::new());

        sections.push("# Tech Stack Reference\n".to_string());
        match self.tech_stack() {
            Some(stack) => {
                sections.extend(tech_stack_lines(&stack, false));
                if let Some(docs) = self.tech_docs(&stack) {
                    sections.push(String::new());
                    sections.push(docs);
                }
            }
            None => sections.push("No tech stack defined yet.".to_string()),
        }

        sections.join("\n")
    }

    /// Cached docs of the stack's technologies, if any are cached.
    fn tech_docs(&self, stack: &TechStack) -> Option<String> {
        let docs: Vec<(String, String)> = stack
            .technology_names()
            .into_iter()
            .filter_map(|name| self.repository.cached_docs(&name).map(|doc| (name, doc)))
            .collect();
        if docs.is_empty() {
            return None;
        }

        let mut lines = vec!["## Technology Documentation\n".to_string()];
        for (name, content) in docs {
            lines.push(format!("### {}\n", name));
            lines.push(content.trim().to_string());
            lines.push(String::new());
        }
        Some(lines.join("\n"))
    }

    pub fn artifacts_summary(&self) -> ArtifactsSummary {
        let layers = self.layers();
        ArtifactsSummary {
            prd_exists: self.prd().is_some(),
            feature_count: self.features().len(),
            requirement_count: self.requirements().len(),
            tech_stack_defined: self.tech_stack().is_some(),
            layers_defined: layers.is_some(),
            layer_count: layers.map(|l| l.layers.len()).unwrap_or(0),
        }
    }
}

/// Append the reviewer's feedback on a rejected attempt to a context.
pub fn with_feedback(context: String, feedback: Option<&str>) -> String {
    match feedback.map(str::trim).filter(|f| !f.is_empty()) {
        Some(feedback) => format!(
            "{}\n\n# Reviewer Feedback\n\nThe previous attempt was rejected. Address this feedback:\n\n{}",
            context, feedback
        ),
        None => context,
    }
}

fn format_features(features: &[Feature]) -> String {
    if features.is_empty() {
        return "## Features\n\nNo features defined yet.".to_string();
    }

    let mut lines = vec!["## Features\n".to_string()];
    for feature in features {
        lines.push(format!("### {}: {}", feature.id, feature.title));
        lines.push(format!(
            "Priority: {} | Status: {}",
            feature.priority.as_str(),
            feature.status.as_str()
        ));
        if !feature.description.is_empty() {
            lines.push(format!("\n{}", feature.description));
        }
        if !feature.acceptance_criteria.is_empty() {
            lines.push("\nAcceptance Criteria:".to_string());
            for criterion in &feature.acceptance_criteria {
                lines.push(format!("  - {}", criterion));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn format_requirements(requirements: &[Requirement]) -> String {
    if requirements.is_empty() {
        return "## Requirements\n\nNo requirements defined yet.".to_string();
    }

    let mut lines = vec!["## Requirements\n".to_string()];
    let (functional, non_functional): (Vec<&Requirement>, Vec<&Requirement>) =
        requirements.iter().partition(|r| r.functional);

    for (heading, group) in [
        ("### Functional Requirements\n", functional),
        ("### Non-Functional Requirements\n", non_functional),
    ] {
        if group.is_empty() {
            continue;
        }
        lines.push(heading.to_string());
        for req in group {
            lines.push(format!("**{}: {}**", req.id, req.title));
            lines.push(format!("Priority: {}", req.priority.as_str()));
            if !req.description.is_empty() {
                lines.push(req.description.clone());
            }
            if let Some(feature) = &req.feature {
                lines.push(format!("Feature: {}", feature));
            }
            lines.push(String::new());
        }
    }
    lines.join("\n")
}

fn format_codebase(analysis: &CodebaseAnalysis) -> String {
    let mut lines = vec![
        "# Existing Codebase Analysis\n".to_string(),
        format!("Language: {}", analysis.detected_language),
        format!("Framework: {}", analysis.detected_framework),
        format!("Package Manager: {}", analysis.package_manager),
    ];

    if !analysis.existing_dependencies.is_empty() {
        lines.push("\n## Existing Dependencies".to_string());
        for dep in &analysis.existing_dependencies {
            lines.push(format!("- {}@{}: {}", dep.name, dep.version, dep.purpose));
        }
    }
    if !analysis.patterns.is_empty() {
        lines.push("\n## Existing Patterns".to_string());
        for pattern in &analysis.patterns {
            lines.push(format!("- **{}**: {}", pattern.name, pattern.description));
        }
    }
    if !analysis.constraints.is_empty() {
        lines.push("\n## Constraints".to_string());
        for constraint in &analysis.constraints {
            lines.push(format!("- {}", constraint));
        }
    }
    lines.join("\n")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn tech_stack_lines(stack: &TechStack, with_database: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(runtime) = &stack.runtime {
        lines.push(format!("Language: {} {}", runtime.language, runtime.version));
    }
    for (role, framework) in &stack.frameworks {
        lines.push(format!(
            "{}: {} {}",
            title_case(role),
            framework.name,
            framework.version
        ));
    }
    if with_database {
        if let Some(db) = &stack.database {
            lines.push(format!("Database: {} {}", db.kind, db.version));
            if !db.orm.is_empty() {
                lines.push(format!("ORM: {} {}", db.orm, db.orm_version));
            }
        }
    }
    lines
}
