//! Presentation layer for layered-planner
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive planning shell.

pub mod cli;
pub mod output;
pub mod progress;
pub mod shell;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, DocsCommand, RegistryArg};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::StreamingReporter;
pub use shell::{PlanCommand, PlanRunner, PlanShell, ShellCommand};
