//! Phase Runner
//!
//! A phase is one isolated LLM generation step. Every phase runs the same
//! way ([`run_phase`]): fresh conversation, one request made of the built
//! context and the task prompt, streamed reply, parse, and on success only,
//! persist. What differs between phases is supplied through [`PhaseRunner`].

pub mod architect;
pub mod group;
pub mod layer;

pub use architect::{ArchitectInput, ArchitectPhase};
pub use group::{GroupInput, GroupPhase};
pub use layer::{LayerInput, LayerPhase};

use super::conversation::Conversation;
use super::repository::PlanningRepository;
use crate::error::PlannerError;
use crate::ports::artifact_store::StoreError;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::PlanningProgress;
use planner_domain::persona::{self, Persona};
use planner_domain::{
    ArchitectDraft, GroupsDraft, ParseFailure, PhasePrompt, PlanningPhase, TaskDocument,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Project-level customisation shared by all phases: persona overrides and
/// prompt templates.
#[derive(Clone)]
pub struct PhaseAssets {
    repository: PlanningRepository,
    prompts_dir: String,
    personas_dir: String,
}

impl PhaseAssets {
    pub fn new(
        repository: PlanningRepository,
        prompts_dir: impl Into<String>,
        personas_dir: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            prompts_dir: prompts_dir.into(),
            personas_dir: personas_dir.into(),
        }
    }

    pub fn repository(&self) -> &PlanningRepository {
        &self.repository
    }

    /// The project's persona with the built-in's id, else the built-in.
    pub fn persona(&self, builtin: Persona) -> Persona {
        persona::resolve(builtin, &self.repository.load_personas(&self.personas_dir))
    }

    pub fn task_prompt(&self, phase: PlanningPhase) -> String {
        let template = self.repository.load_prompt_template(&self.prompts_dir, phase);
        PhasePrompt::select(phase, template.as_deref())
    }
}

/// Collaborators of one phase run
pub struct PhaseEnv<'a> {
    pub gateway: &'a dyn LlmGateway,
    pub model: &'a str,
    pub progress: &'a dyn PlanningProgress,
    pub logger: &'a dyn ConversationLogger,
    pub cancel: &'a CancellationToken,
}

/// What a concrete phase supplies to [`run_phase`]
pub trait PhaseRunner: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    fn phase(&self) -> PlanningPhase;

    fn assets(&self) -> &PhaseAssets;

    fn builtin_persona(&self) -> Persona;

    /// Layer or group the input targets, for progress and logs.
    fn target(&self, _input: &Self::Input) -> Option<String> {
        None
    }

    fn build_context(&self, input: &Self::Input) -> String;

    fn parse(&self, input: &Self::Input, reply: &str) -> Result<Self::Output, ParseFailure>;

    /// Non-fatal findings of a parsed output.
    fn warnings(&self, _output: &Self::Output) -> Vec<String> {
        Vec::new()
    }

    /// Persist the output and return the written paths in write order.
    fn save_artifacts(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<String>, StoreError>;

    fn success_message(&self, input: &Self::Input, output: &Self::Output) -> String;

    fn failure_message(&self, failure: &ParseFailure) -> String;

    fn persona(&self) -> Persona {
        self.assets().persona(self.builtin_persona())
    }

    fn task_prompt(&self) -> String {
        self.assets().task_prompt(self.phase())
    }
}

/// Result of one phase run. A parse failure is a normal outcome, carried
/// in `outcome`.
#[derive(Debug, Clone)]
pub struct PhaseResult<T> {
    pub phase: PlanningPhase,
    pub message: String,
    pub artifacts: Vec<String>,
    pub raw_response: String,
    pub warnings: Vec<String>,
    pub outcome: Result<T, ParseFailure>,
}

impl<T> PhaseResult<T> {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of whichever phase `continue_planning` ran
#[derive(Debug, Clone)]
pub enum PhaseOutput {
    Architect(PhaseResult<ArchitectDraft>),
    Layer(PhaseResult<GroupsDraft>),
    Group(PhaseResult<Vec<TaskDocument>>),
}

impl PhaseOutput {
    pub fn phase(&self) -> PlanningPhase {
        match self {
            PhaseOutput::Architect(r) => r.phase,
            PhaseOutput::Layer(r) => r.phase,
            PhaseOutput::Group(r) => r.phase,
        }
    }

    pub fn success(&self) -> bool {
        match self {
            PhaseOutput::Architect(r) => r.success(),
            PhaseOutput::Layer(r) => r.success(),
            PhaseOutput::Group(r) => r.success(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PhaseOutput::Architect(r) => &r.message,
            PhaseOutput::Layer(r) => &r.message,
            PhaseOutput::Group(r) => &r.message,
        }
    }

    pub fn artifacts(&self) -> &[String] {
        match self {
            PhaseOutput::Architect(r) => &r.artifacts,
            PhaseOutput::Layer(r) => &r.artifacts,
            PhaseOutput::Group(r) => &r.artifacts,
        }
    }

    pub fn raw_response(&self) -> &str {
        match self {
            PhaseOutput::Architect(r) => &r.raw_response,
            PhaseOutput::Layer(r) => &r.raw_response,
            PhaseOutput::Group(r) => &r.raw_response,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            PhaseOutput::Architect(r) => r.outcome.as_ref().err(),
            PhaseOutput::Layer(r) => r.outcome.as_ref().err(),
            PhaseOutput::Group(r) => r.outcome.as_ref().err(),
        }
    }

    /// Task ids extracted by a group phase, in reply order.
    pub fn task_ids(&self) -> Vec<String> {
        match self {
            PhaseOutput::Group(PhaseResult {
                outcome: Ok(tasks), ..
            }) => tasks.iter().map(|t| t.id.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

fn with_warnings(message: String, warnings: &[String]) -> String {
    if warnings.is_empty() {
        return message;
    }
    let mut lines = vec![message];
    lines.extend(warnings.iter().map(|w| format!("  warning: {}", w)));
    lines.join("\n")
}

/// Drive one phase: fresh conversation, stream, parse, persist.
///
/// Transport failures and cancellation are errors. A reply that does not
/// parse is a failed [`PhaseResult`] and nothing is written.
pub async fn run_phase<R: PhaseRunner>(
    runner: &R,
    input: &R::Input,
    env: &PhaseEnv<'_>,
) -> Result<PhaseResult<R::Output>, PlannerError> {
    let phase = runner.phase();
    let target = runner.target(input);
    info!(
        "Starting {} phase{}",
        phase.display_name(),
        target.as_deref().map(|t| format!(" for {}", t)).unwrap_or_default()
    );
    env.progress.on_phase_start(phase, target.as_deref());

    let persona = runner.persona();
    let mut conversation = Conversation::new(env.model, persona::system_prompt(&persona));
    let request = PhasePrompt::compose_request(&runner.build_context(input), &runner.task_prompt());

    env.logger.log(ConversationEvent::new(
        "phase_request",
        json!({
            "phase": phase.as_str(),
            "target": target,
            "model": env.model,
            "persona": persona.id,
            "system_prompt": conversation.system_prompt(),
            "content": request,
        }),
    ));

    let reply = match conversation
        .send_streaming(env.gateway, &request, env.progress, env.cancel)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            if matches!(e, GatewayError::Cancelled) {
                warn!("{} phase cancelled", phase.display_name());
                env.logger.log(ConversationEvent::new(
                    "phase_cancelled",
                    json!({ "phase": phase.as_str(), "target": target }),
                ));
            } else {
                warn!("{} phase request failed: {}", phase.display_name(), e);
            }
            env.progress.on_phase_complete(phase, false);
            return Err(e.into());
        }
    };

    env.logger.log(ConversationEvent::new(
        "phase_response",
        json!({
            "phase": phase.as_str(),
            "target": target,
            "bytes": reply.len(),
            "content": reply,
        }),
    ));

    let output = match runner.parse(input, &reply) {
        Ok(output) => output,
        Err(failure) => {
            warn!("{} output rejected: {}", phase.display_name(), failure);
            env.logger.log(ConversationEvent::new(
                "phase_parse_failed",
                json!({
                    "phase": phase.as_str(),
                    "target": target,
                    "block": failure.block.as_str(),
                    "failure": failure.to_string(),
                }),
            ));
            env.progress.on_phase_complete(phase, false);
            return Ok(PhaseResult {
                phase,
                message: runner.failure_message(&failure),
                artifacts: Vec::new(),
                raw_response: reply,
                warnings: Vec::new(),
                outcome: Err(failure),
            });
        }
    };

    let artifacts = match runner.save_artifacts(input, &output) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            env.progress.on_phase_complete(phase, false);
            return Err(e.into());
        }
    };

    let warnings = runner.warnings(&output);
    for warning in &warnings {
        warn!("{}: {}", phase.display_name(), warning);
    }
    let message = with_warnings(runner.success_message(input, &output), &warnings);
    info!("{} phase succeeded: {} artifacts", phase.display_name(), artifacts.len());
    env.progress.on_phase_complete(phase, true);

    Ok(PhaseResult {
        phase,
        message,
        artifacts,
        raw_response: reply,
        warnings,
        outcome: Ok(output),
    })
}

#[cfg(test)]
pub(crate) mod test_env {
    use super::*;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::testing::{MemoryArtifactStore, MockGateway, RecordingProgress};
    use std::sync::Arc;

    pub struct Harness {
        pub store: Arc<MemoryArtifactStore>,
        pub repository: PlanningRepository,
        pub gateway: MockGateway,
        pub progress: RecordingProgress,
        pub cancel: CancellationToken,
    }

    impl Harness {
        pub fn new(gateway: MockGateway) -> Self {
            let store = Arc::new(MemoryArtifactStore::new());
            Self {
                repository: PlanningRepository::new(store.clone()),
                store,
                gateway,
                progress: RecordingProgress::default(),
                cancel: CancellationToken::new(),
            }
        }

        pub fn assets(&self) -> PhaseAssets {
            PhaseAssets::new(self.repository.clone(), "tooling/prompts/planner", "design/personas")
        }

        pub fn env(&self) -> PhaseEnv<'_> {
            PhaseEnv {
                gateway: &self.gateway,
                model: "sonnet",
                progress: &self.progress,
                logger: &NoConversationLogger,
                cancel: &self.cancel,
            }
        }
    }
}
