//! Console output formatter for planning results

use colored::Colorize;
use planner_application::{GroupInfo, LayerInfo, NextAction, PhaseOutput, PlanningStatus};
use planner_domain::{
    Checkpoint, CheckpointStatus, CodebaseAnalysis, PlanningSession, ProjectType,
};

/// Formats planning state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn session_started(session: &PlanningSession) -> String {
        let mut output = format!(
            "\n{} {}\nProject type: {}\n",
            "Planning session started:".green().bold(),
            session.id,
            session.project_type
        );
        if let Some(target) = &session.target_repo {
            output.push_str(&format!("Target repo: {}\n", target.display()));
        }
        output.push_str(&format!(
            "\n{}\n",
            "Use /plan continue to start the architect phase".dimmed()
        ));
        output
    }

    pub fn status(status: Option<&PlanningStatus>) -> String {
        let Some(status) = status else {
            return format!(
                "\n{}\n{}\n",
                "No planning session".dimmed(),
                "Use /plan start to begin".dimmed()
            );
        };

        let mut output = String::from("\n");
        output.push_str(&Self::field("Planning Session", &status.session_id));
        output.push_str(&Self::field("Project Type", status.project_type.as_str()));
        output.push_str(&Self::field("Current Phase", status.current_phase.as_str()));
        if let Some(layer) = &status.current_layer {
            output.push_str(&Self::field("Current Layer", layer));
        }
        if let Some(group) = &status.current_group {
            output.push_str(&Self::field("Current Group", group));
        }
        if !status.completed_layers.is_empty() {
            output.push_str(&Self::field(
                "Completed Layers",
                &status.completed_layers.join(", "),
            ));
        }
        if !status.completed_groups.is_empty() {
            output.push_str(&Self::field(
                "Completed Groups",
                &status.completed_groups.join(", "),
            ));
        }

        let cp = &status.checkpoints;
        output.push_str(&format!(
            "\n{} {} approved, {} rejected, {} pending\n",
            "Checkpoints:".bold(),
            cp.approved,
            cp.rejected,
            cp.pending
        ));
        if cp.pending > 0 {
            output.push_str(&format!(
                "{}\n",
                "There is a pending checkpoint. Use /plan approve or /plan reject".yellow()
            ));
        } else if status.can_continue {
            output.push_str(&format!(
                "{}\n",
                "Ready to continue. Use /plan continue".green()
            ));
        }
        output
    }

    pub fn next_action(action: &NextAction) -> String {
        let mut output = format!(
            "\n{} {}\n{}\n",
            "Next Action:".bold(),
            action.as_str(),
            action.message()
        );
        let detail = match action {
            NextAction::LayerPlanning { layer_id } => format!("Layer: {}", layer_id),
            NextAction::GroupPlanning { layer_id, group_id } => {
                format!("Layer: {}\nGroup: {}", layer_id, group_id)
            }
            NextAction::Checkpoint { checkpoint_id, .. } => {
                format!("Checkpoint: {}", checkpoint_id)
            }
            NextAction::Start | NextAction::Architect | NextAction::Completed => String::new(),
        };
        if !detail.is_empty() {
            output.push_str(&format!("{}\n", detail.dimmed()));
        }
        output
    }

    /// Banner printed before a phase runs.
    pub fn phase_banner(action: &NextAction) -> String {
        format!("\n{} {}\n", "Running:".bold(), action.message())
    }

    pub fn phase_output(output: &PhaseOutput) -> String {
        let mut text = String::from("\n");
        if output.success() {
            text.push_str(&format!(
                "{} {}\n",
                "Phase complete:".green().bold(),
                output.message()
            ));
            for artifact in output.artifacts() {
                text.push_str(&format!("  {} {}\n", "+".green(), artifact));
            }
            for warning in Self::warnings(output) {
                text.push_str(&format!("  {} {}\n", "!".yellow(), warning));
            }
            text.push_str(&format!(
                "\n{} Review the output above.\n{}\n",
                "Checkpoint created.".bold(),
                "Use /plan approve to continue, or /plan reject <feedback> to revise".dimmed()
            ));
        } else {
            text.push_str(&format!(
                "{} {}\n",
                "Phase failed:".red().bold(),
                output.message()
            ));
            text.push_str(&format!(
                "{}\n",
                "Nothing was saved. Use /plan continue to retry".dimmed()
            ));
        }
        text
    }

    fn warnings(output: &PhaseOutput) -> &[String] {
        match output {
            PhaseOutput::Architect(r) => &r.warnings,
            PhaseOutput::Layer(r) => &r.warnings,
            PhaseOutput::Group(r) => &r.warnings,
        }
    }

    pub fn approved(checkpoint: &Checkpoint, next: &NextAction) -> String {
        let mut output = format!(
            "\n{} {}\n",
            "Approved checkpoint:".green(),
            checkpoint.id
        );
        if !checkpoint.feedback.is_empty() {
            output.push_str(&format!(
                "{}\n",
                format!("Feedback: {}", checkpoint.feedback).dimmed()
            ));
        }
        output.push_str(&format!(
            "\n{}\n",
            format!("Next: {}", next.message()).dimmed()
        ));
        output
    }

    pub fn rejected(checkpoint: &Checkpoint) -> String {
        format!(
            "\n{} {}\n{}\n\n{}\n",
            "Rejected checkpoint:".yellow(),
            checkpoint.id,
            format!("Feedback: {}", checkpoint.feedback).dimmed(),
            "The phase will need to be re-run with /plan continue".dimmed()
        )
    }

    pub fn no_pending(verb: &str) -> String {
        format!("{}", format!("No pending checkpoint to {}", verb).yellow())
    }

    pub fn layers(layers: &[LayerInfo]) -> String {
        if layers.is_empty() {
            return format!(
                "{}",
                "No layers defined yet. Run architect phase first.".dimmed()
            );
        }

        let mut output = format!(
            "\n{}\n{:<12} {:<28} {:>5}  {}\n",
            "Architecture Layers".cyan().bold(),
            "ID",
            "Name",
            "Order",
            "Status"
        );
        for layer in layers {
            output.push_str(&format!(
                "{:<12} {:<28} {:>5}  {}\n",
                layer.id.bold(),
                layer.name,
                layer.order,
                Self::completion(layer.completed)
            ));
        }
        output
    }

    pub fn groups(layer_id: &str, groups: &[GroupInfo]) -> String {
        if groups.is_empty() {
            return format!(
                "{}",
                format!("No groups defined for layer {}", layer_id).dimmed()
            );
        }

        let mut output = format!(
            "\n{}\n{:<12} {:<28} {:>5} {:>10}  {}\n",
            format!("Groups in {}", layer_id).cyan().bold(),
            "ID",
            "Name",
            "Order",
            "Est. Tasks",
            "Status"
        );
        for group in groups {
            output.push_str(&format!(
                "{:<12} {:<28} {:>5} {:>10}  {}\n",
                group.id.bold(),
                group.name,
                group.order,
                group.estimated_tasks,
                Self::completion(group.completed)
            ));
        }
        output
    }

    pub fn tasks(group_id: &str, tasks: &[String]) -> String {
        if tasks.is_empty() {
            return format!(
                "{}",
                format!("No tasks written for group {}", group_id).dimmed()
            );
        }

        let mut output = format!("\n{}\n", format!("Tasks in {}", group_id).cyan().bold());
        for task in tasks {
            output.push_str(&format!("  - {}\n", task));
        }
        output
    }

    pub fn checkpoints(checkpoints: &[Checkpoint]) -> String {
        if checkpoints.is_empty() {
            return format!("{}", "No checkpoints yet".dimmed());
        }

        let mut output = format!("\n{}\n", "Checkpoints".cyan().bold());
        for checkpoint in checkpoints {
            let status = match checkpoint.status {
                CheckpointStatus::Pending => checkpoint.status.as_str().yellow(),
                CheckpointStatus::Approved => checkpoint.status.as_str().green(),
                CheckpointStatus::Rejected => checkpoint.status.as_str().red(),
            };
            let target = checkpoint
                .group_id
                .as_deref()
                .or(checkpoint.layer_id.as_deref())
                .unwrap_or("-");
            output.push_str(&format!(
                "{:<8} {:<16} {:<12} {:<9} {}\n",
                checkpoint.id,
                checkpoint.phase.as_str(),
                target,
                status,
                checkpoint.description
            ));
        }
        output
    }

    /// Full detail for one checkpoint.
    pub fn checkpoint_detail(checkpoint: &Checkpoint) -> String {
        Self::indent(&checkpoint.format_for_display(), "  ")
    }

    pub fn analysis(analysis: &CodebaseAnalysis) -> String {
        let mut output = format!("\n{}\n", "Codebase Analysis".cyan().bold());
        output.push_str(&Self::field("Language", &analysis.detected_language));
        output.push_str(&Self::field("Framework", &analysis.detected_framework));
        output.push_str(&Self::field("Package Manager", &analysis.package_manager));
        output.push_str(&Self::field(
            "Dependencies",
            &analysis.existing_dependencies.len().to_string(),
        ));

        if !analysis.directory_structure.is_empty() {
            let dirs: Vec<&str> = analysis
                .directory_structure
                .keys()
                .map(String::as_str)
                .collect();
            output.push_str(&Self::field("Directories", &dirs.join(", ")));
        }

        if !analysis.patterns.is_empty() {
            output.push_str(&format!("\n{}\n", "Patterns:".bold()));
            for pattern in &analysis.patterns {
                output.push_str(&format!("  * {}: {}\n", pattern.name, pattern.description));
            }
        }

        if !analysis.constraints.is_empty() {
            output.push_str(&format!("\n{}\n", "Constraints:".bold()));
            for constraint in &analysis.constraints {
                output.push_str(&format!("  * {}\n", constraint));
            }
        }
        output
    }

    pub fn docs_list(names: &[String]) -> String {
        if names.is_empty() {
            return format!("{}", "No cached documentation".dimmed());
        }
        let mut output = format!("\n{}\n", "Cached documentation".cyan().bold());
        for name in names {
            output.push_str(&format!("  - {}\n", name));
        }
        output
    }

    pub fn project_type(project_type: ProjectType) -> String {
        match project_type {
            ProjectType::Greenfield => "greenfield (new project)".to_string(),
            ProjectType::Brownfield => "brownfield (existing codebase)".to_string(),
        }
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn completion(completed: bool) -> colored::ColoredString {
        if completed {
            "Complete".green()
        } else {
            "Pending".dimmed()
        }
    }

    fn field(label: &str, value: &str) -> String {
        format!("{} {}\n", format!("{}:", label).bold(), value)
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use planner_domain::{CheckpointSummary, PlanningPhase};

    fn status() -> PlanningStatus {
        PlanningStatus {
            session_id: "plan-1a2b3c4d".to_string(),
            project_type: ProjectType::Greenfield,
            current_phase: PlanningPhase::LayerPlanning,
            current_layer: Some("layer-01".to_string()),
            current_group: None,
            completed_layers: vec![],
            completed_groups: vec![],
            checkpoints: CheckpointSummary {
                total: 2,
                approved: 1,
                rejected: 0,
                pending: 1,
                current_phase: PlanningPhase::LayerPlanning,
                can_proceed: false,
            },
            can_continue: false,
        }
    }

    #[test]
    fn test_status_without_session() {
        let text = ConsoleFormatter::status(None);
        assert!(text.contains("No planning session"));
        assert!(text.contains("/plan start"));
    }

    #[test]
    fn test_status_with_pending_checkpoint() {
        let text = ConsoleFormatter::status(Some(&status()));
        assert!(text.contains("plan-1a2b3c4d"));
        assert!(text.contains("layer_planning"));
        assert!(text.contains("layer-01"));
        assert!(text.contains("1 approved, 0 rejected, 1 pending"));
        assert!(text.contains("pending checkpoint"));
        assert!(!text.contains("Completed Layers"));
    }

    #[test]
    fn test_next_action_details() {
        let text = ConsoleFormatter::next_action(&NextAction::GroupPlanning {
            layer_id: "layer-02".to_string(),
            group_id: "grp-auth".to_string(),
        });
        assert!(text.contains("group_planning"));
        assert!(text.contains("Plan tasks for group grp-auth"));
        assert!(text.contains("Layer: layer-02"));
    }

    #[test]
    fn test_layers_table() {
        let layers = vec![
            LayerInfo {
                id: "layer-01".to_string(),
                name: "Foundation".to_string(),
                order: 1,
                completed: true,
            },
            LayerInfo {
                id: "layer-02".to_string(),
                name: "Core API".to_string(),
                order: 2,
                completed: false,
            },
        ];
        let text = ConsoleFormatter::layers(&layers);
        assert!(text.contains("Foundation"));
        assert!(text.contains("Core API"));
        assert!(text.contains("Complete"));
        assert!(text.contains("Pending"));

        assert!(ConsoleFormatter::layers(&[]).contains("Run architect phase first"));
    }

    #[test]
    fn test_checkpoint_rows() {
        let mut session = PlanningSession::new(
            "plan-1a2b3c4d".to_string(),
            ProjectType::Greenfield,
            None,
            Utc::now(),
        );
        session.current_phase = PlanningPhase::Architect;
        session
            .add_checkpoint(
                PlanningPhase::Architect,
                "Tech stack and 3 layers",
                vec!["planning/layers.yaml".to_string()],
                Utc::now(),
            )
            .unwrap();

        let text = ConsoleFormatter::checkpoints(&session.checkpoints);
        assert!(text.contains("cp-001"));
        assert!(text.contains("architect"));
        assert!(text.contains("Tech stack and 3 layers"));

        let detail = ConsoleFormatter::checkpoint_detail(&session.checkpoints[0]);
        assert!(detail.starts_with("  Checkpoint: cp-001"));
        assert!(detail.contains("  - planning/layers.yaml"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
