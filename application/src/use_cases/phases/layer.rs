//! Layer Planner phase: one layer into functional groups

use super::{PhaseAssets, PhaseRunner};
use crate::ports::artifact_store::StoreError;
use crate::use_cases::context_builder::{ContextBuilder, with_feedback};
use crate::use_cases::repository::groups_path;
use planner_domain::persona::{self, Persona};
use planner_domain::{GroupsDraft, ParseFailure, ParseThresholds, PlanningPhase, parse_groups};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LayerInput {
    pub layer_id: String,
    pub feedback: Option<String>,
}

impl LayerInput {
    pub fn new(layer_id: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            feedback: None,
        }
    }
}

pub struct LayerPhase {
    assets: PhaseAssets,
    context: Arc<ContextBuilder>,
    thresholds: ParseThresholds,
}

impl LayerPhase {
    pub fn new(assets: PhaseAssets, context: Arc<ContextBuilder>, thresholds: ParseThresholds) -> Self {
        Self {
            assets,
            context,
            thresholds,
        }
    }
}

impl PhaseRunner for LayerPhase {
    type Input = LayerInput;
    type Output = GroupsDraft;

    fn phase(&self) -> PlanningPhase {
        PlanningPhase::LayerPlanning
    }

    fn assets(&self) -> &PhaseAssets {
        &self.assets
    }

    fn builtin_persona(&self) -> Persona {
        persona::layer_persona()
    }

    fn target(&self, input: &LayerInput) -> Option<String> {
        Some(input.layer_id.clone())
    }

    fn build_context(&self, input: &LayerInput) -> String {
        with_feedback(
            self.context.layer_context(&input.layer_id),
            input.feedback.as_deref(),
        )
    }

    fn parse(&self, input: &LayerInput, reply: &str) -> Result<GroupsDraft, ParseFailure> {
        parse_groups(reply, &input.layer_id, &self.thresholds)
    }

    fn warnings(&self, output: &GroupsDraft) -> Vec<String> {
        output.warnings.clone()
    }

    fn save_artifacts(&self, input: &LayerInput, output: &GroupsDraft) -> Result<Vec<String>, StoreError> {
        self.assets
            .repository()
            .save_groups(&input.layer_id, &output.groups)?;
        Ok(vec![groups_path(&input.layer_id)])
    }

    fn success_message(&self, input: &LayerInput, output: &GroupsDraft) -> String {
        format!(
            "Layer {} breakdown: {} groups",
            input.layer_id,
            output.groups.groups.len()
        )
    }

    fn failure_message(&self, failure: &ParseFailure) -> String {
        format!(
            "Could not parse layer output. Expected groups YAML block. ({})",
            failure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LAYER_REPLY, MockGateway, Scripted, StaticProductSource};
    use crate::use_cases::phases::run_phase;
    use crate::use_cases::phases::test_env::Harness;
    use planner_domain::FailureKind;

    fn phase(harness: &Harness, thresholds: ParseThresholds) -> LayerPhase {
        let context = ContextBuilder::new(
            harness.repository.clone(),
            Arc::new(StaticProductSource::default()),
        );
        LayerPhase::new(harness.assets(), Arc::new(context), thresholds)
    }

    #[tokio::test]
    async fn test_groups_saved_under_layer() {
        let harness = Harness::new(MockGateway::new(vec![Scripted::reply(LAYER_REPLY)]));
        let phase = phase(&harness, ParseThresholds::default());

        let result = run_phase(&phase, &LayerInput::new("layer-01"), &harness.env())
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.message, "Layer layer-01 breakdown: 2 groups");
        assert_eq!(result.artifacts, vec!["planning/groups/layer-01/groups.yaml"]);
        let groups = harness.repository.load_groups("layer-01").unwrap().unwrap();
        assert_eq!(groups.groups[1].depends_on_groups, vec!["g1"]);
        assert!(harness.gateway.requests()[0].system_prompt.contains("Layer Planner"));
    }

    #[tokio::test]
    async fn test_mismatched_layer_id_is_warning() {
        let harness = Harness::new(MockGateway::new(vec![Scripted::reply(LAYER_REPLY)]));
        let phase = phase(&harness, ParseThresholds::default());

        let result = run_phase(&phase, &LayerInput::new("layer-03"), &harness.env())
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.message.contains("\n  warning: "));
        let stored = harness.repository.load_groups("layer-03").unwrap().unwrap();
        assert_eq!(stored.layer_id, "layer-03");
    }

    #[tokio::test]
    async fn test_threshold_failure() {
        let harness = Harness::new(MockGateway::new(vec![Scripted::reply(LAYER_REPLY)]));
        let phase = phase(
            &harness,
            ParseThresholds {
                min_groups: 3,
                min_tasks: 1,
            },
        );

        let result = run_phase(&phase, &LayerInput::new("layer-01"), &harness.env())
            .await
            .unwrap();

        assert!(!result.success());
        assert_eq!(
            result.outcome.as_ref().unwrap_err().kind,
            FailureKind::BelowMinimum {
                found: 2,
                required: 3
            }
        );
        assert!(result.message.starts_with("Could not parse layer output."));
        assert!(harness.repository.load_groups("layer-01").unwrap().is_none());
    }
}
