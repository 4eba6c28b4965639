//! Shell input parsing

use std::path::PathBuf;

/// A planning workflow command, shared by the CLI and the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanCommand {
    Start {
        brownfield: bool,
        target: Option<PathBuf>,
    },
    Status,
    Next,
    Continue,
    Approve {
        feedback: String,
    },
    Reject {
        feedback: String,
    },
    Layers,
    Groups {
        layer_id: String,
    },
    Tasks {
        group_id: String,
    },
    Checkpoints,
}

/// One line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Plan(PlanCommand),
    Help,
    Quit,
    Empty,
    /// Input that could not be understood, with a message for the user
    Invalid(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return ShellCommand::Empty;
        };
        let args: Vec<&str> = words.collect();

        match head {
            "/quit" | "/exit" | "/q" => ShellCommand::Quit,
            "/help" | "/h" | "/?" => ShellCommand::Help,
            "/plan" => Self::parse_plan(&args),
            other if other.starts_with('/') => {
                ShellCommand::Invalid(format!("Unknown command: {}", other))
            }
            _ => ShellCommand::Invalid("Commands start with /. Type /help".to_string()),
        }
    }

    fn parse_plan(args: &[&str]) -> Self {
        let Some((sub, rest)) = args.split_first() else {
            return ShellCommand::Plan(PlanCommand::Status);
        };

        let command = match sub.to_lowercase().as_str() {
            "start" => {
                let mut brownfield = false;
                let mut target = None;
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    match *arg {
                        "--brownfield" => brownfield = true,
                        "--target" => match iter.next() {
                            Some(dir) => target = Some(PathBuf::from(dir)),
                            None => {
                                return ShellCommand::Invalid(
                                    "Usage: /plan start [--brownfield] [--target DIR]".to_string(),
                                );
                            }
                        },
                        other => {
                            return ShellCommand::Invalid(format!(
                                "Unknown start option: {}",
                                other
                            ));
                        }
                    }
                }
                PlanCommand::Start { brownfield, target }
            }
            "status" => PlanCommand::Status,
            "next" => PlanCommand::Next,
            "continue" => PlanCommand::Continue,
            "approve" => PlanCommand::Approve {
                feedback: rest.join(" "),
            },
            "reject" if rest.is_empty() => {
                return ShellCommand::Invalid("Usage: /plan reject <feedback>".to_string());
            }
            "reject" => PlanCommand::Reject {
                feedback: rest.join(" "),
            },
            "layers" => PlanCommand::Layers,
            "groups" => match rest.first() {
                Some(layer_id) => PlanCommand::Groups {
                    layer_id: layer_id.to_string(),
                },
                None => return ShellCommand::Invalid("Usage: /plan groups <layer-id>".to_string()),
            },
            "tasks" => match rest.first() {
                Some(group_id) => PlanCommand::Tasks {
                    group_id: group_id.to_string(),
                },
                None => return ShellCommand::Invalid("Usage: /plan tasks <group-id>".to_string()),
            },
            "checkpoints" => PlanCommand::Checkpoints,
            other => return ShellCommand::Invalid(format!("Unknown plan command: {}", other)),
        };
        ShellCommand::Plan(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_subcommands() {
        assert_eq!(
            ShellCommand::parse("/plan"),
            ShellCommand::Plan(PlanCommand::Status)
        );
        assert_eq!(
            ShellCommand::parse("  /plan CONTINUE "),
            ShellCommand::Plan(PlanCommand::Continue)
        );
        assert_eq!(
            ShellCommand::parse("/plan groups layer-02"),
            ShellCommand::Plan(PlanCommand::Groups {
                layer_id: "layer-02".to_string()
            })
        );
        assert_eq!(
            ShellCommand::parse("/plan approve"),
            ShellCommand::Plan(PlanCommand::Approve {
                feedback: String::new()
            })
        );
    }

    #[test]
    fn test_start_options() {
        assert_eq!(
            ShellCommand::parse("/plan start --brownfield --target ../api"),
            ShellCommand::Plan(PlanCommand::Start {
                brownfield: true,
                target: Some(PathBuf::from("../api")),
            })
        );
        assert!(matches!(
            ShellCommand::parse("/plan start --target"),
            ShellCommand::Invalid(_)
        ));
        assert!(matches!(
            ShellCommand::parse("/plan start --greenfield"),
            ShellCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_reject_needs_feedback() {
        assert_eq!(
            ShellCommand::parse("/plan reject"),
            ShellCommand::Invalid("Usage: /plan reject <feedback>".to_string())
        );
        assert_eq!(
            ShellCommand::parse("/plan reject split the auth layer"),
            ShellCommand::Plan(PlanCommand::Reject {
                feedback: "split the auth layer".to_string()
            })
        );
    }

    #[test]
    fn test_other_input() {
        assert_eq!(ShellCommand::parse("   "), ShellCommand::Empty);
        assert_eq!(ShellCommand::parse("/q"), ShellCommand::Quit);
        assert_eq!(ShellCommand::parse("/?"), ShellCommand::Help);
        assert!(matches!(ShellCommand::parse("/artifact"), ShellCommand::Invalid(_)));
        assert!(matches!(ShellCommand::parse("hello"), ShellCommand::Invalid(_)));
        assert!(matches!(ShellCommand::parse("/plan deploy"), ShellCommand::Invalid(_)));
    }
}
