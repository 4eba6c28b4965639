//! CLI command definitions

use crate::shell::PlanCommand;
use clap::{Parser, Subcommand, ValueEnum};
use planner_application::Registry;
use std::path::PathBuf;

/// Package registry to fetch documentation from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegistryArg {
    Npm,
    Pypi,
}

impl From<RegistryArg> for Registry {
    fn from(arg: RegistryArg) -> Self {
        match arg {
            RegistryArg::Npm => Registry::Npm,
            RegistryArg::Pypi => Registry::Pypi,
        }
    }
}

/// CLI arguments for layered-planner
#[derive(Parser, Debug)]
#[command(name = "layered-planner")]
#[command(author, version, about = "Checkpoint-gated, layer-by-layer project planning with an LLM")]
#[command(long_about = r#"
layered-planner turns a PRD, features and requirements into a layered
architecture and then into task files, one reviewed phase at a time.

The workflow has three phases:
1. Architect: tech stack and architecture layers
2. Layer planning: each layer split into functional groups
3. Group planning: each group split into task documents

Every phase ends in a checkpoint you approve or reject before moving on.

Configuration files are loaded from (in priority order):
1. --config <path>        Explicit config file
2. ./planner.toml         Project-level config
3. ~/.config/layered-planner/config.toml   Global config

Example:
  layered-planner start
  layered-planner continue
  layered-planner approve
  layered-planner reject "Use PostgreSQL instead of SQLite"
  layered-planner --model sonnet shell
"#)]
pub struct Cli {
    /// Project root holding PRD.md, features/ and planning/
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub project: PathBuf,

    /// Model key or raw model id for every phase
    #[arg(short, long, value_name = "KEY", global = true)]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators and streamed text
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a new planning session (replaces any existing one)
    Start {
        /// Plan against an existing codebase
        #[arg(long)]
        brownfield: bool,
        /// Repository to analyze for a brownfield session
        #[arg(long, value_name = "DIR")]
        target: Option<PathBuf>,
    },
    /// Show the current planning status
    Status,
    /// Show the next action to take
    Next,
    /// Run the next planning phase
    Continue,
    /// Approve the pending checkpoint
    Approve {
        /// Optional reviewer note
        feedback: Vec<String>,
    },
    /// Reject the pending checkpoint and reopen its work
    Reject {
        /// Why the output should be revised
        #[arg(required = true)]
        feedback: Vec<String>,
    },
    /// List architecture layers
    Layers,
    /// List the groups of a layer
    Groups {
        #[arg(value_name = "LAYER_ID")]
        layer: String,
    },
    /// List the task files of a group
    Tasks {
        #[arg(value_name = "GROUP_ID")]
        group: String,
    },
    /// List all checkpoints
    Checkpoints,
    /// Analyze an existing codebase without starting a session
    Analyze {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Manage the technology documentation cache
    Docs {
        #[command(subcommand)]
        action: DocsCommand,
    },
    /// Interactive /plan shell
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DocsCommand {
    /// List cached technologies
    List,
    /// Fetch and cache docs for a package
    Fetch {
        name: String,
        #[arg(long, value_enum, default_value = "npm")]
        registry: RegistryArg,
    },
    /// Remove one cached technology, or all of them
    Clear { name: Option<String> },
}

impl Command {
    /// The workflow command this maps to, if it is one.
    pub fn plan_command(&self) -> Option<PlanCommand> {
        let command = match self {
            Command::Start { brownfield, target } => PlanCommand::Start {
                brownfield: *brownfield,
                target: target.clone(),
            },
            Command::Status => PlanCommand::Status,
            Command::Next => PlanCommand::Next,
            Command::Continue => PlanCommand::Continue,
            Command::Approve { feedback } => PlanCommand::Approve {
                feedback: feedback.join(" "),
            },
            Command::Reject { feedback } => PlanCommand::Reject {
                feedback: feedback.join(" "),
            },
            Command::Layers => PlanCommand::Layers,
            Command::Groups { layer } => PlanCommand::Groups {
                layer_id: layer.clone(),
            },
            Command::Tasks { group } => PlanCommand::Tasks {
                group_id: group.clone(),
            },
            Command::Checkpoints => PlanCommand::Checkpoints,
            Command::Analyze { .. } | Command::Docs { .. } | Command::Shell => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "layered-planner",
            "continue",
            "--project",
            "/work/app",
            "-vv",
            "--model",
            "sonnet",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Command::Continue));
        assert_eq!(cli.project, PathBuf::from("/work/app"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("sonnet"));
    }

    #[test]
    fn test_reject_requires_feedback() {
        assert!(Cli::try_parse_from(["layered-planner", "reject"]).is_err());

        let cli =
            Cli::try_parse_from(["layered-planner", "reject", "use", "postgres"]).unwrap();
        assert_eq!(
            cli.command.unwrap().plan_command(),
            Some(PlanCommand::Reject {
                feedback: "use postgres".to_string()
            })
        );
    }

    #[test]
    fn test_brownfield_start() {
        let cli = Cli::try_parse_from([
            "layered-planner",
            "start",
            "--brownfield",
            "--target",
            "../legacy",
        ])
        .unwrap();
        assert_eq!(
            cli.command.unwrap().plan_command(),
            Some(PlanCommand::Start {
                brownfield: true,
                target: Some(PathBuf::from("../legacy")),
            })
        );
    }

    #[test]
    fn test_docs_subcommands() {
        let cli = Cli::try_parse_from([
            "layered-planner",
            "docs",
            "fetch",
            "fastapi",
            "--registry",
            "pypi",
        ])
        .unwrap();
        let command = cli.command.unwrap();
        assert!(command.plan_command().is_none());
        assert_eq!(
            command,
            Command::Docs {
                action: DocsCommand::Fetch {
                    name: "fastapi".to_string(),
                    registry: RegistryArg::Pypi,
                }
            }
        );
        assert_eq!(Registry::from(RegistryArg::Pypi), Registry::Pypi);
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["layered-planner", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
