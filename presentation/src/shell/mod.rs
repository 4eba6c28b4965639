//! Interactive planning shell
//!
//! Provides a reedline-based `/plan` prompt. Input is parsed into a
//! [`ShellCommand`]; workflow commands run through the same [`PlanRunner`]
//! as the one-shot CLI.

mod command;
mod repl;
mod runner;

pub use command::{PlanCommand, ShellCommand};
pub use repl::PlanShell;
pub use runner::PlanRunner;
