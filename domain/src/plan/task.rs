//! Task documents extracted from group planner output

use serde::Serialize;
use std::collections::BTreeMap;

/// An atomic unit of implementation work.
///
/// The markdown body is kept verbatim; it is what gets written to
/// `planning/tasks/<group_id>/<id>.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDocument {
    /// `T-NNN`
    pub id: String,
    pub title: String,
    /// Front-matter fields other than `id` and `title`, as raw strings
    pub fields: BTreeMap<String, String>,
    /// Full document including the front matter
    pub markdown: String,
}

impl TaskDocument {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// File name used when the task is stored.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.id)
    }
}

/// Whether `s` looks like a task id: `T-` followed by one or more digits.
pub fn is_task_id(s: &str) -> bool {
    s.strip_prefix("T-")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
