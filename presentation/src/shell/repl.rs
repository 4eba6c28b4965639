//! Interactive `/plan` shell

use super::command::ShellCommand;
use super::runner::PlanRunner;
use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use planner_application::PlannerOrchestrator;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tracing::warn;

const HISTORY_SIZE: usize = 1000;

/// Readline-driven shell over one orchestrator.
pub struct PlanShell {
    orchestrator: PlannerOrchestrator,
    runner: PlanRunner,
    model: String,
}

impl PlanShell {
    pub fn new(orchestrator: PlannerOrchestrator, quiet: bool) -> Self {
        let model = orchestrator.config().model.clone();
        Self {
            orchestrator,
            runner: PlanRunner::new(quiet),
            model,
        }
    }

    /// History file in the platform data dir
    pub fn history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("layered-planner").join("history.txt"))
    }

    fn editor() -> Reedline {
        let editor = Reedline::create();
        let Some(path) = Self::history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Shell history disabled: {}", e);
                editor
            }
        }
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self) {
        let mut editor = Self::editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("plan".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let line = match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => line,
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Ok(_) => {
                    println!("^C");
                    continue;
                }
                Err(e) => {
                    eprintln!("{}", ConsoleFormatter::error(&e.to_string()));
                    break;
                }
            };

            match ShellCommand::parse(&line) {
                ShellCommand::Empty => {}
                ShellCommand::Quit => {
                    println!("Bye!");
                    break;
                }
                ShellCommand::Help => Self::print_help(),
                ShellCommand::Invalid(message) => {
                    println!("{}", message.red());
                    println!("{}", "Type /help for available commands".dimmed());
                }
                ShellCommand::Plan(command) => {
                    if let Err(e) = self.runner.run(&mut self.orchestrator, command).await {
                        eprintln!("{}", ConsoleFormatter::error(&e.to_string()));
                    }
                }
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          layered-planner - Shell            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model);
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("{} commands:", "/plan".bold());
        println!();
        println!("  {}                    Start new planning session (greenfield)", "start".bold());
        println!("  {}       Start with existing codebase analysis", "start --brownfield".bold());
        println!("  {}     Specify target repo for brownfield", "start --target /path".bold());
        println!();
        println!("  {}                   Show current planning status", "status".bold());
        println!("  {}                     Show next action to take", "next".bold());
        println!("  {}                 Run the next phase", "continue".bold());
        println!("  {} [feedback]       Approve current checkpoint", "approve".bold());
        println!("  {} <feedback>        Reject and request revision", "reject".bold());
        println!();
        println!("  {}                   List defined layers", "layers".bold());
        println!("  {} <layer-id>        List groups in a layer", "groups".bold());
        println!("  {} <group-id>         List tasks in a group", "tasks".bold());
        println!("  {}              List all checkpoints", "checkpoints".bold());
        println!();
        println!("  /help, /h, /?             Show this help");
        println!("  /quit, /exit, /q          Exit the shell");
        println!();
    }
}
