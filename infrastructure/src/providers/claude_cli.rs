//! `claude` command-line client
//!
//! Runs `claude -p <prompt> --output-format stream-json --verbose` once per
//! request and turns its JSON lines into stream events. The CLI has no
//! message list, so earlier turns are folded into the prompt text.

use super::catalog::{ModelSettings, ProviderSettings};
use super::{ProviderClient, STREAM_BUFFER};
use async_trait::async_trait;
use planner_application::ports::llm_gateway::{ChatRequest, GatewayError, StreamHandle};
use planner_domain::{Message, Role, StreamEvent};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_PROGRAM: &str = "claude";

/// One stdout line of `--output-format stream-json`
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Delta(String),
    Assistant(String),
    Result { text: String, is_error: bool },
    Ignore,
}

fn parse_line(line: &str) -> Line {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Line::Ignore;
    };

    match value["type"].as_str() {
        Some("content_block_delta") => match value["delta"]["text"].as_str() {
            Some(text) => Line::Delta(text.to_string()),
            None => Line::Ignore,
        },
        Some("assistant") => {
            let text: String = value["message"]["content"]
                .as_array()
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter(|b| b["type"] == "text")
                        .filter_map(|b| b["text"].as_str())
                        .collect()
                })
                .unwrap_or_default();
            if text.is_empty() {
                Line::Ignore
            } else {
                Line::Assistant(text)
            }
        }
        Some("result") => Line::Result {
            text: value["result"].as_str().unwrap_or_default().to_string(),
            is_error: value["is_error"].as_bool().unwrap_or(false),
        },
        _ => Line::Ignore,
    }
}

/// Fold a message list into one prompt.
fn fold_prompt(messages: &[Message]) -> String {
    let Some((current, history)) = messages.split_last() else {
        return String::new();
    };
    if history.is_empty() {
        return current.content.clone();
    }

    let mut prompt = String::from("Previous conversation:\n");
    for message in history {
        let speaker = match message.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        prompt.push_str(&format!("{}: {}\n", speaker, message.content));
    }
    prompt.push_str("\nCurrent message:\n");
    prompt.push_str(&current.content);
    prompt
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

pub struct ClaudeCliClient {
    program: String,
    config_dir: Option<PathBuf>,
}

impl ClaudeCliClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            config_dir: settings.config_dir.as_deref().map(expand_home),
        }
    }

    /// Use a different executable than `claude`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, request: &ChatRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(fold_prompt(&request.messages))
            .args(["--output-format", "stream-json", "--verbose"])
            .arg("--system-prompt")
            .arg(&request.system_prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config_dir {
            cmd.env("CLAUDE_CONFIG_DIR", dir);
        }
        cmd
    }
}

#[async_trait]
impl ProviderClient for ClaudeCliClient {
    async fn stream(
        &self,
        _model: &ModelSettings,
        request: ChatRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let mut child = self.command(&request).spawn().map_err(|e| {
            GatewayError::ConnectionError(format!("failed to run {}: {}", self.program, e))
        })?;
        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(GatewayError::ConnectionError(
                "child process has no output pipes".to_string(),
            ));
        };
        debug!("Spawned {} (pid {:?})", self.program, child.id());

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut full_text = String::new();
            let mut saw_delta = false;
            let mut result = None;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Reading CLI output failed: {}", e);
                        break;
                    }
                };
                let fragment = match parse_line(&line) {
                    Line::Delta(text) => {
                        saw_delta = true;
                        text
                    }
                    Line::Assistant(text) if !saw_delta => text,
                    Line::Result { text, is_error } => {
                        result = Some((text, is_error));
                        break;
                    }
                    Line::Assistant(_) | Line::Ignore => continue,
                };
                full_text.push_str(&fragment);
                if tx.send(StreamEvent::Delta(fragment)).await.is_err() {
                    debug!("Stream receiver dropped; stopping CLI");
                    return;
                }
            }

            let status = child.wait().await;
            let stderr = stderr_task.await.unwrap_or_default();
            let event = match (result, status) {
                (Some((text, true)), _) => StreamEvent::Error(text),
                (_, Ok(status)) if !status.success() => {
                    let detail = stderr.trim();
                    StreamEvent::Error(if detail.is_empty() {
                        format!("claude exited with {}", status)
                    } else {
                        detail.to_string()
                    })
                }
                (_, Err(e)) => StreamEvent::Error(e.to_string()),
                (Some((text, false)), Ok(_)) if !text.is_empty() => StreamEvent::Completed(text),
                _ => StreamEvent::Completed(full_text),
            };
            let _ = tx.send(event).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_message_prompt() {
        assert_eq!(fold_prompt(&[Message::user("Plan layer-01")]), "Plan layer-01");
        assert_eq!(fold_prompt(&[]), "");
    }

    #[test]
    fn test_history_folded() {
        let messages = vec![
            Message::user("Design the stack"),
            Message::assistant("```yaml\nproject_type: greenfield\n```"),
            Message::user("Use Postgres instead"),
        ];
        assert_eq!(
            fold_prompt(&messages),
            "Previous conversation:\nUser: Design the stack\nAssistant: ```yaml\nproject_type: greenfield\n```\n\nCurrent message:\nUse Postgres instead"
        );
    }

    #[test]
    fn test_stream_json_lines() {
        assert_eq!(
            parse_line(r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"layers:"}}"#),
            Line::Delta("layers:".to_string())
        );
        assert_eq!(
            parse_line(
                r#"{"type":"assistant","message":{"content":[{"type":"text","text":"a"},{"type":"tool_use"},{"type":"text","text":"b"}]}}"#
            ),
            Line::Assistant("ab".to_string())
        );
        assert_eq!(
            parse_line(r#"{"type":"result","subtype":"success","is_error":false,"result":"ab"}"#),
            Line::Result {
                text: "ab".to_string(),
                is_error: false
            }
        );
        assert_eq!(parse_line(r#"{"type":"system","subtype":"init"}"#), Line::Ignore);
        assert_eq!(parse_line("Warning: not json"), Line::Ignore);
    }

    #[test]
    fn test_config_dir_expanded() {
        let client = ClaudeCliClient::new(&ProviderSettings {
            config_dir: Some("~/.glm".to_string()),
            ..Default::default()
        });
        let dir = client.config_dir.unwrap();
        assert!(dir.ends_with(".glm"));
        if dirs::home_dir().is_some() {
            assert!(!dir.starts_with("~"));
        }
    }

    #[tokio::test]
    async fn test_failed_process_is_stream_error() {
        let client = ClaudeCliClient::new(&ProviderSettings::default()).with_program("false");
        let model = ModelSettings {
            id: "claude".to_string(),
            provider: "claude-cli".to_string(),
            max_tokens: 16384,
        };
        let request = ChatRequest {
            model: "claude".to_string(),
            system_prompt: String::new(),
            messages: vec![Message::user("hi")],
        };

        let handle = client.stream(&model, request).await.unwrap();
        assert!(handle.collect_text().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_program_is_connection_error() {
        let client = ClaudeCliClient::new(&ProviderSettings::default())
            .with_program("layered-planner-no-such-binary");
        let model = ModelSettings {
            id: "claude".to_string(),
            provider: "claude-cli".to_string(),
            max_tokens: 16384,
        };
        let request = ChatRequest {
            model: "claude".to_string(),
            system_prompt: String::new(),
            messages: vec![Message::user("hi")],
        };

        let err = client.stream(&model, request).await.err().unwrap();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }
}
