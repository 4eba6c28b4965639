//! Personas: behavioural profiles that shape a phase's system prompt.
//!
//! Each planning phase runs under one built-in persona. A project may
//! replace any of them with its own `design/personas/<file>.yaml`, matched
//! by `id`.

use serde::{Deserialize, Serialize};

/// Broad role a persona plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    ProductManager,
    Engineer,
    Designer,
    Marketer,
    UserResearcher,
    QaEngineer,
    Architect,
    #[default]
    Custom,
}

impl Specialization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::ProductManager => "product_manager",
            Specialization::Engineer => "engineer",
            Specialization::Designer => "designer",
            Specialization::Marketer => "marketer",
            Specialization::UserResearcher => "user_researcher",
            Specialization::QaEngineer => "qa_engineer",
            Specialization::Architect => "architect",
            Specialization::Custom => "custom",
        }
    }

    /// Role phrase with its article, as used in a sentence.
    pub fn with_article(&self) -> &'static str {
        match self {
            Specialization::ProductManager => "a product manager",
            Specialization::Engineer => "an engineer",
            Specialization::Designer => "a designer",
            Specialization::Marketer => "a marketer",
            Specialization::UserResearcher => "a user researcher",
            Specialization::QaEngineer => "a QA engineer",
            Specialization::Architect => "an architect",
            Specialization::Custom => "a specialist",
        }
    }
}

/// A named behavioural profile: identity, expertise, tone, focus areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: Specialization,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    /// How this persona views problems
    #[serde(default)]
    pub perspective: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
    /// Appended verbatim to the persona prompt
    #[serde(default)]
    pub custom_instructions: String,
}

impl Persona {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Render the persona section of a system prompt.
    pub fn to_system_prompt(&self) -> String {
        let mut lines = vec![format!(
            "You are acting as {}, {}.",
            self.name,
            self.specialization.with_article()
        )];

        if !self.description.is_empty() {
            lines.push(format!("\n{}", self.description));
        }
        if !self.perspective.is_empty() {
            lines.push(format!("\nYour perspective: {}", self.perspective));
        }
        if !self.expertise.is_empty() {
            lines.push(format!(
                "\nYour areas of expertise: {}",
                self.expertise.join(", ")
            ));
        }
        if !self.focus_areas.is_empty() {
            lines.push(format!("\nYou focus on: {}", self.focus_areas.join(", ")));
        }
        if !self.tone.is_empty() {
            lines.push(format!("\nCommunication style: {}", self.tone));
        }
        if !self.questions_to_ask.is_empty() {
            lines.push("\nTypical questions you ask:".to_string());
            for question in &self.questions_to_ask {
                lines.push(format!("  - {}", question));
            }
        }
        if !self.custom_instructions.is_empty() {
            lines.push(format!("\n{}", self.custom_instructions));
        }

        lines.join("\n")
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub const ARCHITECT_PERSONA_ID: &str = "planning-architect";
pub const LAYER_PERSONA_ID: &str = "planning-layer";
pub const GROUP_PERSONA_ID: &str = "planning-group";

/// Persona of the architect phase
pub fn architect_persona() -> Persona {
    Persona {
        id: ARCHITECT_PERSONA_ID.to_string(),
        name: "Technical Architect".to_string(),
        specialization: Specialization::Architect,
        description: "Systematic architect who designs scalable systems around clean layer boundaries."
            .to_string(),
        expertise: strings(&[
            "System architecture",
            "Technology selection",
            "API design",
            "Layer decomposition",
            "Dependency management",
        ]),
        perspective: "Sees the system as a whole and plans for scale and long-term maintenance."
            .to_string(),
        tone: "Systematic and security-conscious. Records every decision explicitly.".to_string(),
        focus_areas: strings(&[
            "Technology selection",
            "Architecture layers",
            "API boundaries",
            "Data modeling",
            "Security considerations",
        ]),
        questions_to_ask: Vec::new(),
        custom_instructions: String::new(),
    }
}

/// Persona of the layer planner phase
pub fn layer_persona() -> Persona {
    Persona {
        id: LAYER_PERSONA_ID.to_string(),
        name: "Layer Planner".to_string(),
        specialization: Specialization::Architect,
        description: "Splits an architecture layer into functional groups small enough to build independently."
            .to_string(),
        expertise: strings(&[
            "Module decomposition",
            "Contract design",
            "Dependency analysis",
            "Interface definition",
        ]),
        perspective: "Turns a large layer into cohesive groups that can each be tested alone."
            .to_string(),
        tone: "Analytical and methodical, with attention on boundaries and contracts.".to_string(),
        focus_areas: strings(&[
            "Group boundaries",
            "Contract interfaces",
            "Execution order",
            "Task estimation",
        ]),
        questions_to_ask: Vec::new(),
        custom_instructions: String::new(),
    }
}

/// Persona of the group planner phase
pub fn group_persona() -> Persona {
    Persona {
        id: GROUP_PERSONA_ID.to_string(),
        name: "Task Planner".to_string(),
        specialization: Specialization::Engineer,
        description: "Writes detailed task specifications that an implementer can execute without guessing."
            .to_string(),
        expertise: strings(&[
            "Task decomposition",
            "Contract-driven development",
            "Test specification",
            "Implementation planning",
        ]),
        perspective: "Splits a group into precise tasks, each with its own tests.".to_string(),
        tone: "Precise and test-focused. Every task has to be verifiable.".to_string(),
        focus_areas: strings(&[
            "Task contracts",
            "Test specifications",
            "Verification criteria",
            "Output files",
        ]),
        questions_to_ask: Vec::new(),
        custom_instructions: String::new(),
    }
}

/// Base prompt shared by every planning phase
pub const PLANNING_BASE_PROMPT: &str = "You are a planning assistant that turns product requirements into an executable implementation plan.

You help with:
- Choosing a technology stack and architecture
- Splitting the architecture into layers and functional groups
- Writing small, verifiable implementation tasks with explicit contracts

Be concise but thorough. Ask clarifying questions when requirements are ambiguous.
Always answer in the exact output format requested so the plan can be processed automatically.";

/// Full system prompt for a phase: base prompt, then the persona section.
pub fn system_prompt(persona: &Persona) -> String {
    format!(
        "{}\n\n--- CURRENT PERSPECTIVE ---\n{}",
        PLANNING_BASE_PROMPT,
        persona.to_system_prompt()
    )
}

/// Pick `overrides` entry with the built-in's id, else the built-in.
pub fn resolve(builtin: Persona, overrides: &[Persona]) -> Persona {
    overrides
        .iter()
        .find(|p| p.id == builtin.id)
        .cloned()
        .unwrap_or(builtin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_layout() {
        let prompt = system_prompt(&architect_persona());
        assert!(prompt.starts_with(PLANNING_BASE_PROMPT));
        assert!(prompt.contains(
            "--- CURRENT PERSPECTIVE ---\nYou are acting as Technical Architect, an architect."
        ));
        assert!(prompt.contains("Your areas of expertise: System architecture, Technology selection"));
    }

    #[test]
    fn test_specialization_words() {
        let mut persona = group_persona();
        persona.specialization = Specialization::QaEngineer;
        assert!(persona.to_system_prompt().starts_with("You are acting as Task Planner, a QA engineer."));

        persona.specialization = Specialization::Engineer;
        assert!(persona.to_system_prompt().starts_with("You are acting as Task Planner, an engineer."));
        persona.specialization = Specialization::UserResearcher;
        assert!(persona.to_system_prompt().starts_with("You are acting as Task Planner, a user researcher."));
    }

    #[test]
    fn test_questions_and_custom_instructions() {
        let mut persona = layer_persona();
        persona.questions_to_ask = vec!["Which groups can run in parallel?".into()];
        persona.custom_instructions = "Prefer at most four groups.".into();
        let prompt = persona.to_system_prompt();
        assert!(prompt.contains("Typical questions you ask:\n  - Which groups can run in parallel?"));
        assert!(prompt.ends_with("\nPrefer at most four groups."));
    }

    #[test]
    fn test_override_by_id() {
        let custom = Persona::from_yaml(
            "id: planning-layer\nname: Strict Layer Planner\ntone: Terse.\n",
        )
        .unwrap();
        assert_eq!(custom.specialization, Specialization::Custom);

        let resolved = resolve(layer_persona(), std::slice::from_ref(&custom));
        assert_eq!(resolved.name, "Strict Layer Planner");

        let untouched = resolve(group_persona(), &[custom]);
        assert_eq!(untouched.id, GROUP_PERSONA_ID);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(Persona::from_yaml("name: [no id").is_err());
        assert!(Persona::from_yaml("name: missing id").is_err());
    }
}
