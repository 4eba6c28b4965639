//! Technical Architect phase: tech stack and architecture layers

use super::{PhaseAssets, PhaseRunner};
use crate::ports::artifact_store::StoreError;
use crate::use_cases::context_builder::{ContextBuilder, with_feedback};
use crate::use_cases::repository::{LAYERS_PATH, TECH_STACK_PATH};
use chrono::Utc;
use planner_domain::persona::{self, Persona};
use planner_domain::{
    ArchitectDraft, CodebaseAnalysis, ParseFailure, PlanningPhase, parse_architect,
};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ArchitectInput {
    /// Present for brownfield projects
    pub codebase: Option<CodebaseAnalysis>,
    /// Reviewer feedback on a rejected previous attempt
    pub feedback: Option<String>,
}

pub struct ArchitectPhase {
    assets: PhaseAssets,
    context: Arc<ContextBuilder>,
}

impl ArchitectPhase {
    pub fn new(assets: PhaseAssets, context: Arc<ContextBuilder>) -> Self {
        Self { assets, context }
    }
}

impl PhaseRunner for ArchitectPhase {
    type Input = ArchitectInput;
    type Output = ArchitectDraft;

    fn phase(&self) -> PlanningPhase {
        PlanningPhase::Architect
    }

    fn assets(&self) -> &PhaseAssets {
        &self.assets
    }

    fn builtin_persona(&self) -> Persona {
        persona::architect_persona()
    }

    fn build_context(&self, input: &ArchitectInput) -> String {
        with_feedback(
            self.context.architect_context(input.codebase.as_ref()),
            input.feedback.as_deref(),
        )
    }

    fn parse(&self, _input: &ArchitectInput, reply: &str) -> Result<ArchitectDraft, ParseFailure> {
        let mut draft = parse_architect(reply)?;
        let now = Utc::now();
        draft.tech_stack.created.get_or_insert(now);
        draft.layers.created.get_or_insert(now);
        Ok(draft)
    }

    fn warnings(&self, output: &ArchitectDraft) -> Vec<String> {
        output.warnings.clone()
    }

    fn save_artifacts(
        &self,
        _input: &ArchitectInput,
        output: &ArchitectDraft,
    ) -> Result<Vec<String>, StoreError> {
        let repository = self.assets.repository();
        repository.save_tech_stack(&output.tech_stack)?;
        repository.save_layers(&output.layers)?;
        Ok(vec![TECH_STACK_PATH.to_string(), LAYERS_PATH.to_string()])
    }

    fn success_message(&self, _input: &ArchitectInput, output: &ArchitectDraft) -> String {
        format!("Architecture defined: {} layers", output.layers.layers.len())
    }

    fn failure_message(&self, failure: &ParseFailure) -> String {
        format!(
            "Could not parse architecture output. Expected tech-stack and layers YAML blocks. ({})",
            failure
        )
    }
}
