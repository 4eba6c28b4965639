//! Executes planning commands against the orchestrator and prints the result

use super::command::PlanCommand;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::StreamingReporter;
use colored::Colorize;
use planner_application::{NextAction, PlannerError, PlannerOrchestrator};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs [`PlanCommand`]s for both the one-shot CLI and the shell.
pub struct PlanRunner {
    quiet: bool,
}

impl PlanRunner {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub async fn run(
        &self,
        orchestrator: &mut PlannerOrchestrator,
        command: PlanCommand,
    ) -> Result<(), PlannerError> {
        debug!("Running {:?}", command);
        match command {
            PlanCommand::Start { brownfield, target } => {
                let session = orchestrator.start_planning(!brownfield, target)?;
                println!("{}", ConsoleFormatter::session_started(&session));
            }
            PlanCommand::Status => {
                let status = orchestrator.status()?;
                println!("{}", ConsoleFormatter::status(status.as_ref()));
            }
            PlanCommand::Next => {
                let action = orchestrator.get_next_action()?;
                println!("{}", ConsoleFormatter::next_action(&action));
            }
            PlanCommand::Continue => self.continue_planning(orchestrator).await?,
            PlanCommand::Approve { feedback } => {
                match orchestrator.approve_checkpoint(&feedback)? {
                    Some(checkpoint) => {
                        let next = orchestrator.get_next_action()?;
                        println!("{}", ConsoleFormatter::approved(&checkpoint, &next));
                    }
                    None => println!("{}", ConsoleFormatter::no_pending("approve")),
                }
            }
            PlanCommand::Reject { feedback } => {
                match orchestrator.reject_checkpoint(&feedback)? {
                    Some(checkpoint) => println!("{}", ConsoleFormatter::rejected(&checkpoint)),
                    None => println!("{}", ConsoleFormatter::no_pending("reject")),
                }
            }
            PlanCommand::Layers => {
                println!("{}", ConsoleFormatter::layers(&orchestrator.list_layers()?));
            }
            PlanCommand::Groups { layer_id } => {
                let groups = orchestrator.list_groups(&layer_id)?;
                println!("{}", ConsoleFormatter::groups(&layer_id, &groups));
            }
            PlanCommand::Tasks { group_id } => {
                let tasks = orchestrator.list_tasks(&group_id)?;
                println!("{}", ConsoleFormatter::tasks(&group_id, &tasks));
            }
            PlanCommand::Checkpoints => {
                let checkpoints = orchestrator.list_checkpoints()?;
                println!("{}", ConsoleFormatter::checkpoints(&checkpoints));
            }
        }
        Ok(())
    }

    async fn continue_planning(
        &self,
        orchestrator: &mut PlannerOrchestrator,
    ) -> Result<(), PlannerError> {
        let action = orchestrator.get_next_action()?;
        match &action {
            NextAction::Start => {
                println!("{}", "No session. Use /plan start first".yellow());
                return Ok(());
            }
            NextAction::Checkpoint { checkpoint_id, phase } => {
                println!(
                    "{} {} ({})\n{}",
                    "Pending checkpoint:".yellow(),
                    checkpoint_id,
                    phase,
                    "Use /plan approve or /plan reject".dimmed()
                );
                return Ok(());
            }
            NextAction::Completed => {
                println!(
                    "{}\n{}",
                    "Planning is complete!".green(),
                    "All tasks have been created.".dimmed()
                );
                return Ok(());
            }
            NextAction::Architect
            | NextAction::LayerPlanning { .. }
            | NextAction::GroupPlanning { .. } => {}
        }

        if !self.quiet {
            println!("{}", ConsoleFormatter::phase_banner(&action));
        }

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let reporter = StreamingReporter::new(self.quiet);
        let result = orchestrator.continue_planning(&reporter, &cancel).await;
        watcher.abort();

        match result {
            Ok(output) => println!("{}", ConsoleFormatter::phase_output(&output)),
            Err(PlannerError::Cancelled) => println!(
                "\n{}",
                "Phase cancelled. Nothing was saved; use /plan continue to retry".yellow()
            ),
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
