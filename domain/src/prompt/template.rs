//! Task prompt templates for the planning phases

use crate::session::phase::PlanningPhase;

/// Built-in task prompts, used when the project has no template file
pub struct PhasePrompt;

impl PhasePrompt {
    /// File name of the project-level template overriding a phase's prompt.
    pub fn file_name(phase: PlanningPhase) -> Option<&'static str> {
        match phase {
            PlanningPhase::Architect => Some("architect-phase.md"),
            PlanningPhase::LayerPlanning => Some("layer-planner.md"),
            PlanningPhase::GroupPlanning => Some("group-planner.md"),
            PlanningPhase::NotStarted | PlanningPhase::Completed => None,
        }
    }

    /// Built-in task prompt of a phase.
    pub fn default_for(phase: PlanningPhase) -> Option<&'static str> {
        match phase {
            PlanningPhase::Architect => Some(Self::architect()),
            PlanningPhase::LayerPlanning => Some(Self::layer_planner()),
            PlanningPhase::GroupPlanning => Some(Self::group_planner()),
            PlanningPhase::NotStarted | PlanningPhase::Completed => None,
        }
    }

    /// Use the project template when it has content, else the built-in.
    pub fn select(phase: PlanningPhase, project_template: Option<&str>) -> String {
        match project_template.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => Self::default_for(phase).unwrap_or_default().to_string(),
        }
    }

    /// One request: built context, a rule, then the task prompt.
    pub fn compose_request(context: &str, task_prompt: &str) -> String {
        format!("{}\n\n---\n\n{}", context, task_prompt)
    }

    pub fn architect() -> &'static str {
        r#"# Technical Architect Phase

Design the system architecture from the PRD, features and requirements above.

## Your Tasks

1. **Select Tech Stack**
   - Choose the language, frameworks, database and tooling
   - Prefer the latest stable versions without known CVEs
   - Respect the project requirements and constraints

2. **Define Architecture Layers**
   - Identify 3-5 layers (for example Infrastructure, Domain, Application, UI)
   - Give each layer its responsibilities and output directories
   - Declare which layers each layer depends on

3. **Plan API Contracts**
   - Identify the key boundaries between layers
   - Describe the contract interfaces at each boundary

## Output Format

Answer with the following two YAML blocks.

### Tech Stack (tech-stack.yaml)
```yaml
version: "1.0"
project_type: "web_application"  # or "cli_tool", "api_service", ...

runtime:
  language: "<language>"
  version: "<version>"
  runtime: "<runtime>"
  runtime_version: "<version>"

frameworks:
  backend:
    name: "<framework>"
    version: "<version>"
    docs_url: "<url>"
  frontend:  # if applicable
    name: "<framework>"
    version: "<version>"

database:  # if applicable
  type: "<type>"
  version: "<version>"
  orm: "<orm>"
  orm_version: "<version>"

testing:
  unit: "<framework>"
  e2e: "<framework>"

dependencies:
  - name: "<package>"
    version: "<version>"
    purpose: "<why it is needed>"

security_notes:
  - "<note about version choices>"
```

### Architecture Layers (layers.yaml)
```yaml
version: "1.0"
architect_summary: |
  <short summary of the architecture decisions>

layers:
  - id: "layer-01"
    name: "<Layer Name>"
    order: 1
    description: |
      <what this layer does>
    responsibilities:
      - "<responsibility>"
    outputs:
      - "<directory path>"
    depends_on: []

  - id: "layer-02"
    name: "<Layer Name>"
    order: 2
    description: |
      <what this layer does>
    outputs:
      - "<directory path>"
    depends_on: ["layer-01"]
```

Layer dependencies must not form a cycle. Ask clarifying questions if the requirements are ambiguous."#
    }

    pub fn layer_planner() -> &'static str {
        r#"# Layer Planner Phase

Split the layer described above into functional groups that can be implemented independently.

## Your Tasks

1. **Identify Groups**
   - Split the layer into 2-6 cohesive groups
   - Give every group a clear boundary

2. **Define Contracts**
   - State what each group exports
   - Define the interfaces other groups will use
   - Declare dependencies between groups

3. **Plan Execution Order**
   - Decide which groups can be built in parallel
   - List the batches in order

## Output Format

Answer with one YAML block:

```yaml
version: "1.0"
layer_id: "<layer-id>"
layer_name: "<layer name>"

groups:
  - id: "grp-<layer>-01"
    name: "<Group Name>"
    order: 1
    description: "<what this group implements>"
    contracts:
      exports:
        - name: "<exportName>"
          type: "<TypeName>"
          file: "<output file path>"
      interfaces:
        - name: "<InterfaceName>"
          methods:
            - "<method signature>"
    depends_on_groups: []
    estimated_tasks: <number>

  - id: "grp-<layer>-02"
    name: "<Group Name>"
    order: 2
    contracts:
      exports:
        - name: "<exportName>"
          type: "<TypeName>"
          file: "<output file path>"
    depends_on_groups: ["grp-<layer>-01"]
    estimated_tasks: <number>

execution_order:
  - ["grp-<layer>-01"]
  - ["grp-<layer>-02", "grp-<layer>-03"]
```

Group dependencies must not form a cycle. Ask clarifying questions if needed."#
    }

    pub fn group_planner() -> &'static str {
        r#"# Group Planner Phase

Write the task files that implement the group described above.

## Your Tasks

1. **Break Into Tasks**
   - Create 2-8 tasks for this group
   - Every task must be executable on its own
   - Every task needs a clear contract and verification

2. **Define Contracts**
   - State exactly what each task exports
   - Reference the interface contracts of dependencies
   - Give complete type signatures

3. **Write Test Specs**
   - Provide complete, runnable test code
   - Test the contract, including edge cases

4. **Define Verification**
   - Deterministic commands that prove the task is done
   - Cover type checking, tests and lint

## Output Format

Give each task its own markdown block:

```markdown
---
id: T-<NNN>
title: <Task Title>
status: pending
layer: <layer number>
track: <backend|frontend|shared>
depends_on: [<task IDs>]
estimated_complexity: <trivial|simple|medium|complex>
---

# T-<NNN>: <Task Title>

## Contract

```typescript
// exact exports of this task
export interface <Name> { ... }
export function <name>(...): ... { }
```

## Dependencies (Interfaces Only)

```typescript
// interface contracts of dependencies, never their implementation
import { <Interface> } from '<path>';
```

## Test Specification

```typescript
import { describe, it, expect } from 'vitest';
import { <exports> } from './<module>';

describe('<module>', () => {
  it('should <behavior>', () => {
    // Arrange
    // Act
    // Assert
  });
});
```

## Output Files

```
WRITE: <path/to/file.ts> (~<N> lines)
WRITE: <path/to/test.ts> (~<N> lines)
```

## Verification (Deterministic)

```bash
npx tsc --noEmit
npx vitest run <test file>
```

## Done When

- [ ] <Criterion 1>
- [ ] <Criterion 2>
```

Generate every task for this group."#
    }
}
