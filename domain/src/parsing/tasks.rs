//! Group planner reply parser: task documents.
//!
//! Tasks are read in one of two shapes:
//!
//! 1. fenced: a ```` ```markdown ```` block whose body starts with a
//!    `---` front matter holding `id: T-NNN`
//! 2. unfenced (fallback when no fenced task exists): the same front matter
//!    written directly in the reply, running through its `## Done When`
//!    checklist

use super::ParseThresholds;
use super::blocks::fenced_blocks;
use super::failure::{BlockKind, ParseFailure};
use crate::plan::task::{TaskDocument, is_task_id};
use std::collections::{BTreeMap, HashSet};

/// Extract every task document from a group planner reply, in order.
pub fn parse_tasks(
    reply: &str,
    thresholds: &ParseThresholds,
) -> Result<Vec<TaskDocument>, ParseFailure> {
    let mut tasks: Vec<TaskDocument> = fenced_blocks(reply)
        .iter()
        .filter(|b| b.is_markdown())
        .filter_map(|b| task_from_markdown(&b.body))
        .collect();

    if tasks.is_empty() {
        tasks = unfenced_tasks(reply);
    }

    if tasks.is_empty() {
        return Err(ParseFailure::missing(BlockKind::Tasks));
    }
    if tasks.len() < thresholds.min_tasks {
        return Err(ParseFailure::below_minimum(
            BlockKind::Tasks,
            tasks.len(),
            thresholds.min_tasks,
        ));
    }

    let mut seen = HashSet::new();
    for task in &tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(ParseFailure::malformed(
                BlockKind::Tasks,
                format!("duplicate task id '{}'", task.id),
            ));
        }
    }

    Ok(tasks)
}

/// `id: T-NNN` front-matter line → the id.
fn task_id_line(line: &str) -> Option<&str> {
    let (key, value) = line.trim().split_once(':')?;
    if key.trim() != "id" {
        return None;
    }
    let value = unquote(value.trim());
    is_task_id(value).then_some(value)
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Build a task from a markdown document that opens with its front matter.
fn task_from_markdown(text: &str) -> Option<TaskDocument> {
    let mut lines = text.lines().skip_while(|l| l.trim().is_empty());
    if lines.next()?.trim() != "---" {
        return None;
    }

    let mut fields = BTreeMap::new();
    for line in lines.by_ref() {
        if line.trim() == "---" {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() && !key.starts_with('#') {
                fields.insert(key.to_string(), unquote(value.trim()).to_string());
            }
        }
    }

    let id = fields.remove("id").filter(|id| is_task_id(id))?;
    let title = fields
        .remove("title")
        .filter(|t| !t.is_empty())
        .or_else(|| heading_title(lines, &id))
        .unwrap_or_default();

    let mut markdown = text.trim().to_string();
    markdown.push('\n');

    Some(TaskDocument {
        id,
        title,
        fields,
        markdown,
    })
}

/// Title from a `# T-NNN: Title` heading.
fn heading_title<'a>(mut lines: impl Iterator<Item = &'a str>, id: &str) -> Option<String> {
    lines.find_map(|line| {
        let rest = line.trim().strip_prefix("# ")?.strip_prefix(id)?;
        let title = rest.trim_start_matches(':').trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

fn is_checklist_item(line: &str) -> bool {
    let line = line.trim_start();
    ["- [ ]", "- [x]", "- [X]"]
        .iter()
        .any(|marker| line.starts_with(marker))
}

fn starts_task(lines: &[&str], at: usize) -> bool {
    lines[at].trim() == "---" && lines.get(at + 1).is_some_and(|l| task_id_line(l).is_some())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Seeking,
    Body { start: usize },
    DoneHeading { start: usize },
    Checklist { start: usize },
}

/// Front-matter tasks written without an outer fence.
fn unfenced_tasks(reply: &str) -> Vec<TaskDocument> {
    let lines: Vec<&str> = reply.lines().collect();
    let mut tasks = Vec::new();
    let mut state = Scan::Seeking;
    let mut i = 0;

    let emit = |start: usize, end: usize, tasks: &mut Vec<TaskDocument>| {
        let text = lines[start..end].join("\n");
        if let Some(task) = task_from_markdown(&text) {
            tasks.push(task);
        }
    };

    while i < lines.len() {
        let line = lines[i];
        state = match state {
            Scan::Seeking if starts_task(&lines, i) => Scan::Body { start: i },
            Scan::Seeking => Scan::Seeking,
            // a new task before the checklist abandons the current one
            Scan::Body { .. } | Scan::DoneHeading { .. } if starts_task(&lines, i) => {
                Scan::Body { start: i }
            }
            Scan::Body { start } if line.trim_start().starts_with("## Done When") => {
                Scan::DoneHeading { start }
            }
            Scan::Body { start } => Scan::Body { start },
            Scan::DoneHeading { start } if is_checklist_item(line) => Scan::Checklist { start },
            Scan::DoneHeading { start } => Scan::DoneHeading { start },
            Scan::Checklist { start } if is_checklist_item(line) => Scan::Checklist { start },
            Scan::Checklist { start } => {
                emit(start, i, &mut tasks);
                // re-examine this line as a possible task start
                state = Scan::Seeking;
                continue;
            }
        };
        i += 1;
    }

    if let Scan::Checklist { start } = state {
        emit(start, lines.len(), &mut tasks);
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::failure::FailureKind;

    fn task_body(n: u32, title: &str) -> String {
        format!(
            "---\nid: T-{n:03}\ntitle: {title}\nstatus: pending\nlayer: 1\ntrack: backend\ndepends_on: []\nestimated_complexity: simple\n---\n\n# T-{n:03}: {title}\n\n## Contract\n\n```typescript\nexport interface Thing{n} {{ id: string }}\n```\n\n## Output Files\n\n```\nWRITE: src/thing{n}.ts (~40 lines)\n```\n\n## Verification (Deterministic)\n\n```bash\nnpx vitest run\n```\n\n## Done When\n\n- [ ] Types compile\n- [ ] Tests pass\n"
        )
    }

    fn fenced(n: u32, title: &str) -> String {
        format!("```markdown\n{}```\n", task_body(n, title))
    }

    fn defaults() -> ParseThresholds {
        ParseThresholds::default()
    }

    #[test]
    fn test_fenced_tasks_in_order() {
        let reply = format!(
            "Here are the tasks.\n\n{}\n{}\n{}\nDone.",
            fenced(1, "User type"),
            fenced(2, "User repository"),
            fenced(3, "User service")
        );
        let tasks = parse_tasks(&reply, &defaults()).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T-001", "T-002", "T-003"]);
        assert_eq!(tasks[1].title, "User repository");
        assert_eq!(tasks[0].field("track"), Some("backend"));
        assert!(tasks[0].markdown.contains("WRITE: src/thing1.ts"));
        assert!(tasks[0].markdown.ends_with("- [ ] Tests pass\n"));
    }

    #[test]
    fn test_unfenced_fallback() {
        let reply = format!(
            "Tasks follow.\n\n{}\n{}\nThat is all.",
            task_body(4, "Parser"),
            task_body(5, "Printer")
        );
        let tasks = parse_tasks(&reply, &defaults()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "T-004");
        assert!(tasks[0].markdown.ends_with("- [ ] Tests pass\n"));
        assert!(!tasks[0].markdown.contains("T-005"));
        assert_eq!(tasks[1].title, "Printer");
    }

    #[test]
    fn test_unfenced_task_at_end_of_reply() {
        let tasks = parse_tasks(&task_body(9, "Last"), &defaults()).unwrap();
        assert_eq!(tasks[0].id, "T-009");
    }

    #[test]
    fn test_unfenced_task_without_checklist_is_dropped() {
        let truncated = "---\nid: T-001\ntitle: Cut off\n---\n\n## Contract\n";
        let reply = format!("{}\n{}", truncated, task_body(2, "Whole"));
        let tasks = parse_tasks(&reply, &defaults()).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T-002"]);
    }

    #[test]
    fn test_zero_tasks_is_missing() {
        let failure = parse_tasks("I need more information first.", &defaults()).unwrap_err();
        assert_eq!(failure, ParseFailure::missing(BlockKind::Tasks));
    }

    #[test]
    fn test_markdown_block_without_task_id_ignored() {
        let reply = "```markdown\n---\nid: TASK-1\n---\n## Done When\n- [ ] x\n```";
        let failure = parse_tasks(reply, &defaults()).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Missing);
    }

    #[test]
    fn test_below_configured_minimum() {
        let thresholds = ParseThresholds {
            min_groups: 1,
            min_tasks: 2,
        };
        let failure = parse_tasks(&fenced(1, "Only"), &thresholds).unwrap_err();
        assert_eq!(failure, ParseFailure::below_minimum(BlockKind::Tasks, 1, 2));
    }

    #[test]
    fn test_duplicate_ids_malformed() {
        let reply = format!("{}{}", fenced(1, "A"), fenced(1, "B"));
        let failure = parse_tasks(&reply, &defaults()).unwrap_err();
        assert_eq!(
            failure,
            ParseFailure::malformed(BlockKind::Tasks, "duplicate task id 'T-001'")
        );
    }

    #[test]
    fn test_quoted_id_and_heading_title() {
        let reply = "```markdown\n---\nid: \"T-010\"\nstatus: pending\n---\n\n# T-010: From heading\n\n## Done When\n- [x] done\n```";
        let tasks = parse_tasks(reply, &defaults()).unwrap();
        assert_eq!(tasks[0].id, "T-010");
        assert_eq!(tasks[0].title, "From heading");
    }
}
