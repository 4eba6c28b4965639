//! Planner Orchestrator
//!
//! The phase state machine. [`PlannerOrchestrator::get_next_action`] is the
//! single source of truth for progression; the `run_*` methods are thin
//! dispatchers that check the checkpoint gate, move the session pointers,
//! run the phase and turn a successful output into a checkpoint.

use super::checkpoints::CheckpointManager;
use super::context_builder::{ArtifactsSummary, ContextBuilder};
use super::phases::{
    ArchitectInput, ArchitectPhase, GroupInput, GroupPhase, LayerInput, LayerPhase, PhaseAssets,
    PhaseEnv, PhaseOutput, PhaseResult, run_phase,
};
use super::repository::{LAYERS_PATH, PlanningRepository, TECH_STACK_PATH, groups_path};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::ports::artifact_store::ArtifactStore;
use crate::ports::codebase_scanner::CodebaseScanner;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::docs_fetcher::DocsFetcher;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::product_source::ProductSource;
use crate::ports::progress::PlanningProgress;
use chrono::Utc;
use planner_domain::{
    ArchitectDraft, Checkpoint, CheckpointSummary, CodebaseAnalysis, DomainError, GroupsDraft,
    PlanningPhase, PlanningSession, ProjectType, TaskDocument,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What should happen next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    Start,
    Checkpoint {
        checkpoint_id: String,
        phase: PlanningPhase,
    },
    Architect,
    LayerPlanning {
        layer_id: String,
    },
    GroupPlanning {
        layer_id: String,
        group_id: String,
    },
    Completed,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::Start => "start",
            NextAction::Checkpoint { .. } => "checkpoint",
            NextAction::Architect => "architect",
            NextAction::LayerPlanning { .. } => "layer_planning",
            NextAction::GroupPlanning { .. } => "group_planning",
            NextAction::Completed => "completed",
        }
    }

    pub fn message(&self) -> String {
        match self {
            NextAction::Start => "Start a planning session with /plan start".to_string(),
            NextAction::Checkpoint { phase, .. } => format!(
                "Pending checkpoint for {}. Use /plan approve or /plan reject",
                phase
            ),
            NextAction::Architect => "Run architect phase with /plan continue".to_string(),
            NextAction::LayerPlanning { layer_id } => {
                format!("Plan groups for layer {} with /plan continue", layer_id)
            }
            NextAction::GroupPlanning { group_id, .. } => {
                format!("Plan tasks for group {} with /plan continue", group_id)
            }
            NextAction::Completed => "Planning complete. All tasks have been created.".to_string(),
        }
    }
}

/// Snapshot of the current session
#[derive(Debug, Clone, Serialize)]
pub struct PlanningStatus {
    pub session_id: String,
    pub project_type: ProjectType,
    pub current_phase: PlanningPhase,
    pub current_layer: Option<String>,
    pub current_group: Option<String>,
    pub completed_layers: Vec<String>,
    pub completed_groups: Vec<String>,
    pub checkpoints: CheckpointSummary,
    pub can_continue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub estimated_tasks: u32,
    pub completed: bool,
}

/// Top-level planning state machine.
///
/// Owns the in-memory session for the process lifetime. The session is
/// loaded lazily and written through on every mutation.
pub struct PlannerOrchestrator {
    repository: PlanningRepository,
    context: Arc<ContextBuilder>,
    checkpoints: CheckpointManager,
    architect: ArchitectPhase,
    layer: LayerPhase,
    group: GroupPhase,
    gateway: Arc<dyn LlmGateway>,
    docs: Option<Arc<dyn DocsFetcher>>,
    scanner: Option<Arc<dyn CodebaseScanner>>,
    logger: Arc<dyn ConversationLogger>,
    config: PlannerConfig,
    session: Option<PlanningSession>,
    loaded: bool,
}

impl PlannerOrchestrator {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        product: Arc<dyn ProductSource>,
        gateway: Arc<dyn LlmGateway>,
        config: PlannerConfig,
    ) -> Self {
        let repository = PlanningRepository::new(store);
        let context = Arc::new(ContextBuilder::new(repository.clone(), product));
        let assets = PhaseAssets::new(
            repository.clone(),
            config.prompts_dir.clone(),
            config.personas_dir.clone(),
        );

        Self {
            checkpoints: CheckpointManager::new(repository.clone()),
            architect: ArchitectPhase::new(assets.clone(), context.clone()),
            layer: LayerPhase::new(assets.clone(), context.clone(), config.thresholds),
            group: GroupPhase::new(assets, context.clone(), config.thresholds),
            repository,
            context,
            gateway,
            docs: None,
            scanner: None,
            logger: Arc::new(NoConversationLogger),
            config,
            session: None,
            loaded: false,
        }
    }

    pub fn with_docs_fetcher(mut self, docs: Arc<dyn DocsFetcher>) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn CodebaseScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    // ==================== Session ====================

    fn load(&mut self) -> Result<(), PlannerError> {
        if !self.loaded {
            self.session = self.checkpoints.load_session()?;
            self.loaded = true;
        }
        Ok(())
    }

    /// The current session, loaded on first access.
    pub fn session(&mut self) -> Result<Option<&PlanningSession>, PlannerError> {
        self.load()?;
        Ok(self.session.as_ref())
    }

    fn session_mut(&mut self) -> Result<&mut PlanningSession, PlannerError> {
        self.load()?;
        self.session
            .as_mut()
            .ok_or(PlannerError::Domain(DomainError::NoSession))
    }

    fn flush(&mut self) -> Result<(), PlannerError> {
        if let Some(session) = self.session.as_mut() {
            self.checkpoints.save_session(session)?;
        }
        Ok(())
    }

    /// Create a new session, replacing any existing one.
    ///
    /// Brownfield sessions analyze `target_repo` and store the snapshot.
    pub fn start_planning(
        &mut self,
        greenfield: bool,
        target_repo: Option<PathBuf>,
    ) -> Result<PlanningSession, PlannerError> {
        let project_type = ProjectType::from_greenfield(greenfield);
        if project_type == ProjectType::Brownfield {
            let Some(target) = &target_repo else {
                return Err(DomainError::MissingTargetRepo.into());
            };
            match &self.scanner {
                Some(scanner) => {
                    let analysis = scanner.analyze(target)?;
                    self.repository.save_codebase_analysis(&analysis)?;
                    info!(
                        "Analyzed {}: {} {}",
                        target.display(),
                        analysis.detected_language,
                        analysis.detected_framework
                    );
                }
                None => warn!("No codebase scanner configured; skipping analysis"),
            }
        }

        let simple = Uuid::new_v4().simple().to_string();
        let id = format!("plan-{}", &simple[..8]);
        let mut session = PlanningSession::new(id, project_type, target_repo, Utc::now());
        self.checkpoints.save_session(&mut session)?;
        info!("Started {} planning session {}", project_type, session.id);

        self.session = Some(session.clone());
        self.loaded = true;
        Ok(session)
    }

    pub fn status(&mut self) -> Result<Option<PlanningStatus>, PlannerError> {
        self.load()?;
        let Some(session) = &self.session else {
            return Ok(None);
        };
        let checkpoints = self.checkpoints.summary(session);
        Ok(Some(PlanningStatus {
            session_id: session.id.clone(),
            project_type: session.project_type,
            current_phase: session.current_phase,
            current_layer: session.current_layer_id.clone(),
            current_group: session.current_group_id.clone(),
            completed_layers: session.completed_layers.clone(),
            completed_groups: session.completed_groups.clone(),
            can_continue: checkpoints.can_proceed,
            checkpoints,
        }))
    }

    // ==================== Next action ====================

    /// Decide what comes next.
    ///
    /// Side effects: a layer whose groups are all complete is recorded as
    /// completed, and the session flips to `completed` once every layer is.
    pub fn get_next_action(&mut self) -> Result<NextAction, PlannerError> {
        self.load()?;
        let Some(session) = self.session.as_mut() else {
            return Ok(NextAction::Start);
        };

        if let Some(pending) = self.checkpoints.pending(session) {
            return Ok(NextAction::Checkpoint {
                checkpoint_id: pending.id.clone(),
                phase: pending.phase,
            });
        }

        let Some(layers) = self.repository.load_layers()? else {
            return Ok(NextAction::Architect);
        };

        let mut dirty = false;
        let mut next = None;
        for layer in layers.sorted_layers() {
            if session.is_layer_completed(&layer.id) {
                continue;
            }
            let Some(groups) = self.repository.load_groups(&layer.id)? else {
                next = Some(NextAction::LayerPlanning {
                    layer_id: layer.id.clone(),
                });
                break;
            };
            if let Some(group) = groups
                .sorted_groups()
                .into_iter()
                .find(|g| !session.is_group_completed(&g.id))
            {
                next = Some(NextAction::GroupPlanning {
                    layer_id: layer.id.clone(),
                    group_id: group.id.clone(),
                });
                break;
            }
            debug!("All groups of {} complete", layer.id);
            dirty |= session.mark_layer_completed(&layer.id);
        }

        let next = match next {
            Some(action) => action,
            None => {
                if session.current_phase != PlanningPhase::Completed {
                    info!("Planning complete for session {}", session.id);
                    session.current_phase = PlanningPhase::Completed;
                    dirty = true;
                }
                NextAction::Completed
            }
        };

        if dirty {
            self.checkpoints.save_session(session)?;
        }
        Ok(next)
    }

    /// Run whatever [`get_next_action`](Self::get_next_action) decides.
    pub async fn continue_planning(
        &mut self,
        progress: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<PhaseOutput, PlannerError> {
        match self.get_next_action()? {
            NextAction::Start => Err(DomainError::NoSession.into()),
            NextAction::Checkpoint { checkpoint_id, .. } => Err(DomainError::CheckpointPending {
                id: checkpoint_id,
            }
            .into()),
            NextAction::Completed => Err(DomainError::PlanningComplete.into()),
            NextAction::Architect => {
                let codebase = match self.session_mut()?.project_type {
                    ProjectType::Brownfield => self.repository.load_codebase_analysis()?,
                    ProjectType::Greenfield => None,
                };
                self.run_architect_phase(codebase, progress, cancel)
                    .await
                    .map(PhaseOutput::Architect)
            }
            NextAction::LayerPlanning { layer_id } => self
                .run_layer_planning(&layer_id, progress, cancel)
                .await
                .map(PhaseOutput::Layer),
            NextAction::GroupPlanning { layer_id, group_id } => self
                .run_group_planning(&layer_id, &group_id, progress, cancel)
                .await
                .map(PhaseOutput::Group),
        }
    }

    // ==================== Phase dispatch ====================

    fn env<'a>(
        &'a self,
        progress: &'a dyn PlanningProgress,
        cancel: &'a CancellationToken,
    ) -> PhaseEnv<'a> {
        PhaseEnv {
            gateway: self.gateway.as_ref(),
            model: &self.config.model,
            progress,
            logger: self.logger.as_ref(),
            cancel,
        }
    }

    /// Move the session to `phase` after checking the gate.
    fn enter_phase(
        &mut self,
        phase: PlanningPhase,
        layer_id: Option<&str>,
        group_id: Option<&str>,
    ) -> Result<Option<String>, PlannerError> {
        self.load()?;
        let session = self
            .session
            .as_mut()
            .ok_or(PlannerError::Domain(DomainError::NoSession))?;
        self.checkpoints.ensure_can_proceed(session)?;

        session.current_phase = phase;
        session.current_layer_id = layer_id.map(str::to_string);
        session.current_group_id = group_id.map(str::to_string);
        let feedback = session
            .rejection_feedback(phase, layer_id, group_id)
            .map(str::to_string);

        self.flush()?;
        Ok(feedback)
    }

    fn record_checkpoint(
        &mut self,
        phase: PlanningPhase,
        description: &str,
        artifacts: Vec<String>,
    ) -> Result<Checkpoint, PlannerError> {
        self.load()?;
        let session = self
            .session
            .as_mut()
            .ok_or(PlannerError::Domain(DomainError::NoSession))?;
        self.checkpoints
            .create_checkpoint(session, phase, description, artifacts)
    }

    pub async fn run_architect_phase(
        &mut self,
        codebase: Option<CodebaseAnalysis>,
        progress: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<PhaseResult<ArchitectDraft>, PlannerError> {
        let feedback = self.enter_phase(PlanningPhase::Architect, None, None)?;
        let input = ArchitectInput { codebase, feedback };

        let result = run_phase(&self.architect, &input, &self.env(progress, cancel)).await?;

        if let Ok(draft) = &result.outcome {
            self.record_checkpoint(
                PlanningPhase::Architect,
                &format!("Architecture defined: {} layers", draft.layers.layers.len()),
                result.artifacts.clone(),
            )?;
            self.fetch_docs(draft).await;
        }
        Ok(result)
    }

    /// Best-effort documentation cache fill for the chosen stack.
    async fn fetch_docs(&self, draft: &ArchitectDraft) {
        if !self.config.fetch_docs {
            return;
        }
        let Some(docs) = &self.docs else {
            return;
        };
        let names = draft.tech_stack.technology_names();
        if names.is_empty() {
            return;
        }
        let cached = docs.fetch_many(&names).await;
        info!("Cached docs for {}/{} technologies", cached.len(), names.len());
    }

    pub async fn run_layer_planning(
        &mut self,
        layer_id: &str,
        progress: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<PhaseResult<GroupsDraft>, PlannerError> {
        let layers = self.repository.load_layers()?;
        if layers.as_ref().and_then(|l| l.get_layer(layer_id)).is_none() {
            return Err(DomainError::UnknownLayer(layer_id.to_string()).into());
        }

        let feedback = self.enter_phase(PlanningPhase::LayerPlanning, Some(layer_id), None)?;
        let input = LayerInput {
            layer_id: layer_id.to_string(),
            feedback,
        };

        let result = run_phase(&self.layer, &input, &self.env(progress, cancel)).await?;

        if let Ok(draft) = &result.outcome {
            self.record_checkpoint(
                PlanningPhase::LayerPlanning,
                &format!("Layer {} breakdown: {} groups", layer_id, draft.groups.groups.len()),
                result.artifacts.clone(),
            )?;
        }
        Ok(result)
    }

    pub async fn run_group_planning(
        &mut self,
        layer_id: &str,
        group_id: &str,
        progress: &dyn PlanningProgress,
        cancel: &CancellationToken,
    ) -> Result<PhaseResult<Vec<TaskDocument>>, PlannerError> {
        let groups = self.repository.load_groups(layer_id)?;
        if groups.as_ref().and_then(|g| g.get_group(group_id)).is_none() {
            return Err(DomainError::UnknownGroup {
                layer_id: layer_id.to_string(),
                group_id: group_id.to_string(),
            }
            .into());
        }

        let feedback =
            self.enter_phase(PlanningPhase::GroupPlanning, Some(layer_id), Some(group_id))?;
        let input = GroupInput {
            layer_id: layer_id.to_string(),
            group_id: group_id.to_string(),
            feedback,
        };

        let mut result = run_phase(&self.group, &input, &self.env(progress, cancel)).await?;

        if let Ok(tasks) = &result.outcome {
            self.repository.remove_tasks(group_id)?;
            let mut paths = Vec::with_capacity(tasks.len());
            for task in tasks {
                paths.push(self.repository.save_task(group_id, task)?);
            }
            result.artifacts = paths;

            self.record_checkpoint(
                PlanningPhase::GroupPlanning,
                &format!("Group {} tasks: {} tasks created", group_id, tasks.len()),
                result.artifacts.clone(),
            )?;

            if self.session_mut()?.mark_group_completed(group_id) {
                self.flush()?;
            }
        }
        Ok(result)
    }

    // ==================== Checkpoint actions ====================

    /// Approve the pending checkpoint. `None` when nothing is pending.
    pub fn approve_checkpoint(&mut self, feedback: &str) -> Result<Option<Checkpoint>, PlannerError> {
        self.load()?;
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let Some(id) = self.checkpoints.pending(session).map(|c| c.id.clone()) else {
            return Ok(None);
        };
        self.checkpoints.approve(session, &id, feedback)
    }

    /// Reject the pending checkpoint and reopen the work it covered, so the
    /// next action offers the same phase again. `None` when nothing is
    /// pending.
    pub fn reject_checkpoint(&mut self, feedback: &str) -> Result<Option<Checkpoint>, PlannerError> {
        self.load()?;
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let Some(id) = self.checkpoints.pending(session).map(|c| c.id.clone()) else {
            return Ok(None);
        };
        let Some(checkpoint) = self.checkpoints.reject(session, &id, feedback)? else {
            return Ok(None);
        };

        match checkpoint.phase {
            PlanningPhase::Architect => {
                self.repository.remove(TECH_STACK_PATH)?;
                self.repository.remove(LAYERS_PATH)?;
            }
            PlanningPhase::LayerPlanning => {
                if let Some(layer_id) = &checkpoint.layer_id {
                    self.repository.remove(&groups_path(layer_id))?;
                }
            }
            PlanningPhase::GroupPlanning => {
                if let Some(group_id) = &checkpoint.group_id {
                    self.repository.remove_tasks(group_id)?;
                    session.reopen_group(group_id);
                }
                if let Some(layer_id) = &checkpoint.layer_id {
                    session.completed_layers.retain(|id| id != layer_id);
                }
                self.checkpoints.save_session(session)?;
            }
            PlanningPhase::NotStarted | PlanningPhase::Completed => {}
        }
        debug!("Reopened {} work after rejecting {}", checkpoint.phase, checkpoint.id);
        Ok(Some(checkpoint))
    }

    // ==================== Listings ====================

    pub fn list_layers(&mut self) -> Result<Vec<LayerInfo>, PlannerError> {
        self.load()?;
        let Some(layers) = self.repository.load_layers()? else {
            return Ok(Vec::new());
        };
        let session = self.session.as_ref();
        Ok(layers
            .sorted_layers()
            .into_iter()
            .map(|layer| LayerInfo {
                id: layer.id.clone(),
                name: layer.name.clone(),
                order: layer.order,
                completed: session.is_some_and(|s| s.is_layer_completed(&layer.id)),
            })
            .collect())
    }

    pub fn list_groups(&mut self, layer_id: &str) -> Result<Vec<GroupInfo>, PlannerError> {
        self.load()?;
        let Some(groups) = self.repository.load_groups(layer_id)? else {
            return Ok(Vec::new());
        };
        let session = self.session.as_ref();
        Ok(groups
            .sorted_groups()
            .into_iter()
            .map(|group| GroupInfo {
                id: group.id.clone(),
                name: group.name.clone(),
                order: group.order,
                estimated_tasks: group.estimated_tasks,
                completed: session.is_some_and(|s| s.is_group_completed(&group.id)),
            })
            .collect())
    }

    pub fn list_tasks(&self, group_id: &str) -> Result<Vec<String>, PlannerError> {
        Ok(self.repository.list_tasks(group_id)?)
    }

    pub fn list_checkpoints(&mut self) -> Result<Vec<Checkpoint>, PlannerError> {
        self.load()?;
        Ok(self
            .session
            .as_ref()
            .map(|s| self.checkpoints.list(s))
            .unwrap_or_default())
    }

    pub fn artifacts_summary(&self) -> ArtifactsSummary {
        self.context.artifacts_summary()
    }
}
