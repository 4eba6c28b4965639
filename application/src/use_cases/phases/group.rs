//! Group Planner phase: one group into task documents
//!
//! The phase only extracts tasks. Writing them to `planning/tasks/` is done
//! by the orchestrator once the phase succeeded.

use super::{PhaseAssets, PhaseRunner};
use crate::ports::artifact_store::StoreError;
use crate::use_cases::context_builder::{ContextBuilder, with_feedback};
use planner_domain::persona::{self, Persona};
use planner_domain::{ParseFailure, ParseThresholds, PlanningPhase, TaskDocument, parse_tasks};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct GroupInput {
    pub layer_id: String,
    pub group_id: String,
    pub feedback: Option<String>,
}

impl GroupInput {
    pub fn new(layer_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            group_id: group_id.into(),
            feedback: None,
        }
    }
}

pub struct GroupPhase {
    assets: PhaseAssets,
    context: Arc<ContextBuilder>,
    thresholds: ParseThresholds,
}

impl GroupPhase {
    pub fn new(assets: PhaseAssets, context: Arc<ContextBuilder>, thresholds: ParseThresholds) -> Self {
        Self {
            assets,
            context,
            thresholds,
        }
    }
}

impl PhaseRunner for GroupPhase {
    type Input = GroupInput;
    type Output = Vec<TaskDocument>;

    fn phase(&self) -> PlanningPhase {
        PlanningPhase::GroupPlanning
    }

    fn assets(&self) -> &PhaseAssets {
        &self.assets
    }

    fn builtin_persona(&self) -> Persona {
        persona::group_persona()
    }

    fn target(&self, input: &GroupInput) -> Option<String> {
        Some(input.group_id.clone())
    }

    fn build_context(&self, input: &GroupInput) -> String {
        with_feedback(
            self.context.group_context(&input.layer_id, &input.group_id),
            input.feedback.as_deref(),
        )
    }

    fn parse(&self, _input: &GroupInput, reply: &str) -> Result<Vec<TaskDocument>, ParseFailure> {
        parse_tasks(reply, &self.thresholds)
    }

    fn save_artifacts(
        &self,
        _input: &GroupInput,
        _output: &Vec<TaskDocument>,
    ) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn success_message(&self, input: &GroupInput, output: &Vec<TaskDocument>) -> String {
        format!("Group {} tasks: {} tasks created", input.group_id, output.len())
    }

    fn failure_message(&self, failure: &ParseFailure) -> String {
        format!("Could not parse tasks from output. ({})", failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GROUP_REPLY, MockGateway, Scripted, StaticProductSource};
    use crate::use_cases::phases::test_env::Harness;
    use crate::use_cases::phases::{PhaseOutput, run_phase};

    fn phase(harness: &Harness) -> GroupPhase {
        let context = ContextBuilder::new(
            harness.repository.clone(),
            Arc::new(StaticProductSource::default()),
        );
        GroupPhase::new(harness.assets(), Arc::new(context), ParseThresholds::default())
    }

    #[tokio::test]
    async fn test_tasks_extracted_in_order() {
        let harness = Harness::new(MockGateway::new(vec![Scripted::reply(GROUP_REPLY)]));
        let phase = phase(&harness);

        let result = run_phase(&phase, &GroupInput::new("layer-01", "g1"), &harness.env())
            .await
            .unwrap();

        assert_eq!(result.message, "Group g1 tasks: 2 tasks created");
        assert!(result.artifacts.is_empty());
        let output = PhaseOutput::Group(result);
        assert_eq!(output.task_ids(), vec!["T-001", "T-002"]);
        // the phase itself writes nothing
        assert!(harness.store.paths().is_empty());
    }

    #[tokio::test]
    async fn test_zero_tasks_is_failure() {
        let harness = Harness::new(MockGateway::new(vec![Scripted::reply(
            "I need more detail about the contracts before writing tasks.",
        )]));
        let phase = phase(&harness);

        let result = run_phase(&phase, &GroupInput::new("layer-01", "g1"), &harness.env())
            .await
            .unwrap();

        assert!(!result.success());
        assert_eq!(
            result.message,
            "Could not parse tasks from output. (tasks block not found)"
        );
        assert!(PhaseOutput::Group(result).task_ids().is_empty());
    }
}
