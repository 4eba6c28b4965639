//! Product artifacts consumed by the architect phase.
//!
//! Features and requirements are markdown files with a YAML front matter.
//! Fields may live in the front matter or in `## ` sections of the body.

use serde::{Deserialize, Serialize};

/// MoSCoW priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Must,
    #[default]
    Should,
    Could,
    Wont,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Must => "must",
            Priority::Should => "should",
            Priority::Could => "could",
            Priority::Wont => "wont",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Draft,
    Approved,
    Implemented,
    Verified,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Draft => "draft",
            ArtifactStatus::Approved => "approved",
            ArtifactStatus::Implemented => "implemented",
            ArtifactStatus::Verified => "verified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ArtifactStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

impl Feature {
    pub fn from_markdown(text: &str) -> Result<Self, ProductParseError> {
        let (front, body) = split_front_matter(text).ok_or(ProductParseError::NoFrontMatter)?;
        let mut feature: Feature = serde_yaml::from_str(front)?;
        if feature.description.is_empty() {
            feature.description = extract_section(body, "Description");
        }
        if feature.acceptance_criteria.is_empty() {
            feature.acceptance_criteria = extract_checklist(body, "Acceptance Criteria");
        }
        Ok(feature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub status: ArtifactStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Owning feature id
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Set from the file location, not the front matter
    #[serde(skip)]
    pub functional: bool,
}

impl Requirement {
    pub fn from_markdown(text: &str, functional: bool) -> Result<Self, ProductParseError> {
        let (front, body) = split_front_matter(text).ok_or(ProductParseError::NoFrontMatter)?;
        let mut requirement: Requirement = serde_yaml::from_str(front)?;
        requirement.functional = functional;
        if requirement.description.is_empty() {
            requirement.description = extract_section(body, "Description");
        }
        if requirement.rationale.is_empty() {
            requirement.rationale = extract_section(body, "Rationale");
        }
        if requirement.acceptance_criteria.is_empty() {
            requirement.acceptance_criteria = extract_checklist(body, "Acceptance Criteria");
        }
        Ok(requirement)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductParseError {
    #[error("missing YAML front matter")]
    NoFrontMatter,
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// Split `---\n<yaml>\n---\n<body>` into its two parts.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text.trim_start_matches('\u{feff}');
    let rest = rest
        .strip_prefix("---\n")
        .or_else(|| rest.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Text under a `## <name>` heading, up to the next `## ` heading.
pub fn extract_section(content: &str, name: &str) -> String {
    let mut in_section = false;
    let mut lines = Vec::new();

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if in_section {
                break;
            }
            in_section = heading.trim() == name;
        } else if in_section {
            lines.push(line);
        }
    }

    lines.join("\n").trim().to_string()
}

/// Checklist items (`- [ ] ...`, `- [x] ...`) of a section.
pub fn extract_checklist(content: &str, name: &str) -> Vec<String> {
    extract_section(content, name)
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix("- [ ] ")
                .or_else(|| line.strip_prefix("- [x] "))
                .map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE: &str = "---\nid: F-001\ntitle: Sign in\npriority: must\nstatus: approved\n---\n\n# Sign in\n\n## Description\n\nUsers sign in with email.\n\n## Acceptance Criteria\n\n- [ ] Wrong password shows an error\n- [x] Session lasts 7 days\n";

    #[test]
    fn test_feature_from_markdown_sections() {
        let feature = Feature::from_markdown(FEATURE).unwrap();
        assert_eq!(feature.id, "F-001");
        assert_eq!(feature.priority, Priority::Must);
        assert_eq!(feature.status, ArtifactStatus::Approved);
        assert_eq!(feature.description, "Users sign in with email.");
        assert_eq!(
            feature.acceptance_criteria,
            vec!["Wrong password shows an error", "Session lasts 7 days"]
        );
    }

    #[test]
    fn test_front_matter_description_wins() {
        let text = "---\nid: FR-001\ntitle: Hash passwords\ndescription: Use argon2id\nfeature: F-001\n---\n## Description\nignored\n";
        let req = Requirement::from_markdown(text, true).unwrap();
        assert_eq!(req.description, "Use argon2id");
        assert_eq!(req.feature.as_deref(), Some("F-001"));
        assert!(req.functional);
        assert_eq!(req.priority, Priority::Should);
    }

    #[test]
    fn test_missing_front_matter() {
        assert!(matches!(
            Feature::from_markdown("# Just a heading"),
            Err(ProductParseError::NoFrontMatter)
        ));
    }

    #[test]
    fn test_invalid_front_matter() {
        let text = "---\ntitle: no id\n---\nbody";
        assert!(matches!(
            Feature::from_markdown(text),
            Err(ProductParseError::FrontMatter(_))
        ));
    }

    #[test]
    fn test_split_front_matter() {
        let (front, body) = split_front_matter("---\na: 1\n---\nbody\n").unwrap();
        assert_eq!(front, "a: 1\n");
        assert_eq!(body, "body\n");
        assert!(split_front_matter("---\na: 1\n").is_none());
    }
}
