//! Layer planner reply parser: one groups block

use super::{ParseThresholds, is_path_segment};
use super::architect::find_block;
use super::blocks::fenced_blocks;
use super::failure::{BlockKind, ParseFailure};
use crate::plan::groups::GroupDefinition;
use std::collections::HashSet;

/// Typed layer planner output
#[derive(Debug, Clone, PartialEq)]
pub struct GroupsDraft {
    pub groups: GroupDefinition,
    pub warnings: Vec<String>,
}

/// Parse a layer planner reply for `layer_id`.
///
/// The stored document always carries `layer_id`; a different id in the
/// reply is overwritten and reported as a warning.
pub fn parse_groups(
    reply: &str,
    layer_id: &str,
    thresholds: &ParseThresholds,
) -> Result<GroupsDraft, ParseFailure> {
    let blocks = fenced_blocks(reply);
    let block = find_block(&blocks, BlockKind::Groups)
        .ok_or_else(|| ParseFailure::missing(BlockKind::Groups))?;

    let mut groups: GroupDefinition = serde_yaml::from_str(&block.body)
        .map_err(|e| ParseFailure::malformed(BlockKind::Groups, e.to_string()))?;

    if groups.groups.len() < thresholds.min_groups {
        return Err(ParseFailure::below_minimum(
            BlockKind::Groups,
            groups.groups.len(),
            thresholds.min_groups,
        ));
    }

    let mut seen = HashSet::new();
    for group in &groups.groups {
        if group.id.trim().is_empty() {
            return Err(ParseFailure::malformed(BlockKind::Groups, "group with empty id"));
        }
        if !is_path_segment(&group.id) {
            return Err(ParseFailure::malformed(
                BlockKind::Groups,
                format!("group id '{}' is not a plain name", group.id),
            ));
        }
        if !seen.insert(group.id.as_str()) {
            return Err(ParseFailure::malformed(
                BlockKind::Groups,
                format!("duplicate group id '{}'", group.id),
            ));
        }
    }

    let report = groups.dependency_report();
    if let Some(cycle) = &report.cycle {
        return Err(ParseFailure::malformed(
            BlockKind::Groups,
            format!("dependency cycle: {}", cycle.join(" -> ")),
        ));
    }

    let mut warnings = report.warnings();
    for id in groups.unknown_execution_ids() {
        warnings.push(format!("execution_order names unknown group '{}'", id));
    }
    if groups.layer_id != layer_id {
        if !groups.layer_id.is_empty() {
            warnings.push(format!(
                "reply names layer '{}', stored under '{}'",
                groups.layer_id, layer_id
            ));
        }
        groups.layer_id = layer_id.to_string();
    }

    Ok(GroupsDraft { groups, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::failure::FailureKind;

    const REPLY: &str = r#"Breaking down the domain layer.

```yaml
version: "1.0"
layer_id: "layer-02"
layer_name: "Domain"
groups:
  - id: "grp-02-01"
    name: "Entities"
    order: 1
    contracts:
      exports:
        - name: "User"
          type: "interface"
          file: "src/domain/user.ts"
    depends_on_groups: []
    estimated_tasks: 3
  - id: "grp-02-02"
    name: "Services"
    order: 2
    depends_on_groups: ["grp-02-01"]
    estimated_tasks: 2
execution_order:
  - ["grp-02-01"]
  - ["grp-02-02"]
```
"#;

    fn defaults() -> ParseThresholds {
        ParseThresholds::default()
    }

    #[test]
    fn test_parse_groups() {
        let draft = parse_groups(REPLY, "layer-02", &defaults()).unwrap();
        assert_eq!(draft.groups.groups.len(), 2);
        assert_eq!(draft.groups.execution_order.len(), 2);
        assert!(draft.warnings.is_empty());
    }

    #[test]
    fn test_missing_block() {
        let failure = parse_groups("No YAML here.", "layer-02", &defaults()).unwrap_err();
        assert_eq!(failure, ParseFailure::missing(BlockKind::Groups));
    }

    #[test]
    fn test_tech_stack_block_is_not_groups() {
        let reply = "```yaml\nproject_type: api\n```";
        let failure = parse_groups(reply, "layer-02", &defaults()).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Missing);
    }

    #[test]
    fn test_zero_groups_below_minimum() {
        let reply = "```yaml\nlayer_id: layer-02\ngroups: []\n```";
        let failure = parse_groups(reply, "layer-02", &defaults()).unwrap_err();
        assert_eq!(failure, ParseFailure::below_minimum(BlockKind::Groups, 0, 1));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let thresholds = ParseThresholds {
            min_groups: 3,
            min_tasks: 1,
        };
        let failure = parse_groups(REPLY, "layer-02", &thresholds).unwrap_err();
        assert_eq!(failure, ParseFailure::below_minimum(BlockKind::Groups, 2, 3));
    }

    #[test]
    fn test_groups_not_a_list_is_malformed() {
        let reply = "```yaml\nlayer_id: layer-02\ngroups: lots\n```";
        let failure = parse_groups(reply, "layer-02", &defaults()).unwrap_err();
        assert!(matches!(failure.kind, FailureKind::Malformed(_)));
    }

    #[test]
    fn test_group_cycle_rejected() {
        let reply = "```yaml\nlayer_id: l\ngroups:\n  - id: g1\n    depends_on_groups: [g2]\n  - id: g2\n    depends_on_groups: [g1]\n```";
        let failure = parse_groups(reply, "l", &defaults()).unwrap_err();
        assert_eq!(
            failure,
            ParseFailure::malformed(BlockKind::Groups, "dependency cycle: g1 -> g2 -> g1")
        );
    }

    #[test]
    fn test_layer_id_mismatch_is_overwritten() {
        let draft = parse_groups(REPLY, "layer-03", &defaults()).unwrap();
        assert_eq!(draft.groups.layer_id, "layer-03");
        assert_eq!(
            draft.warnings,
            vec!["reply names layer 'layer-02', stored under 'layer-03'"]
        );
    }

    #[test]
    fn test_unknown_ids_are_warnings() {
        let reply = "```yaml\nlayer_id: l\ngroups:\n  - id: g1\n    depends_on_groups: [g0]\nexecution_order:\n  - [g1, g7]\n```";
        let draft = parse_groups(reply, "l", &defaults()).unwrap();
        assert_eq!(
            draft.warnings,
            vec![
                "g1 depends on unknown id 'g0'".to_string(),
                "execution_order names unknown group 'g7'".to_string(),
            ]
        );
    }

    #[test]
    fn test_group_id_must_be_plain_name() {
        for id in ["\".\"", "auth/users"] {
            let reply = format!(
                "```yaml\nlayer_id: layer-01\ngroups:\n  - id: {}\n    order: 1\n```",
                id
            );
            let failure = parse_groups(&reply, "layer-01", &defaults()).unwrap_err();
            assert_eq!(failure.block, BlockKind::Groups);
            assert!(matches!(failure.kind, FailureKind::Malformed(_)), "{}", id);
        }
    }
}
