//! JSONL file writer for the planning transcript.
//!
//! Each [`ConversationEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`. One file per planning session; later runs
//! of the same session append to it.

use planner_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Transcript directory, relative to the project root
pub const LOGS_DIR: &str = "planning/logs";

/// JSONL conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path` for appending.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Transcript for a session: `<project>/planning/logs/<session-id>.jsonl`.
    pub fn for_session(project_root: &Path, session_id: &str) -> Option<Self> {
        Self::new(
            project_root
                .join(LOGS_DIR)
                .join(format!("{}.jsonl", session_id)),
        )
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = match event.payload {
            serde_json::Value::Object(mut map) => {
                map.insert("type".to_string(), event.event_type.into());
                map.insert("timestamp".to_string(), timestamp.into());
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": other,
            }),
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_carry_type_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlConversationLogger::for_session(dir.path(), "plan-1a2b3c4d").unwrap();
        assert_eq!(
            logger.path(),
            dir.path().join("planning/logs/plan-1a2b3c4d.jsonl")
        );

        logger.log(ConversationEvent::new(
            "phase_request",
            json!({"phase": "architect", "target": null, "model": "claude"}),
        ));
        logger.log(ConversationEvent::new(
            "phase_parse_failed",
            json!({"phase": "layer_planning", "target": "layer-01", "block": "groups"}),
        ));
        let path = logger.path().to_path_buf();
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "phase_request");
        assert_eq!(records[0]["model"], "claude");
        assert!(records[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(records[1]["block"], "groups");
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        for target in ["layer-01", "layer-02"] {
            let logger =
                JsonlConversationLogger::for_session(dir.path(), "plan-00000000").unwrap();
            logger.log(ConversationEvent::new(
                "phase_cancelled",
                json!({"phase": "layer_planning", "target": target}),
            ));
        }

        let records = read_lines(&dir.path().join("planning/logs/plan-00000000.jsonl"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["target"], "layer-02");
    }

    #[test]
    fn test_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();
        logger.log(ConversationEvent::new("phase_response", json!("raw text")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "phase_response");
        assert_eq!(records[0]["data"], "raw text");
    }
}
