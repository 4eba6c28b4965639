//! In-memory adapters shared by the use case tests

use crate::ports::artifact_store::{ArtifactStore, StoreError};
use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle};
use crate::ports::product_source::ProductSource;
use crate::ports::progress::PlanningProgress;
use async_trait::async_trait;
use planner_domain::{Feature, PlanningPhase, Requirement, StreamEvent};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct MemoryArtifactStore {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn read(&self, path: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(path))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.insert(path, content);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<bool, StoreError> {
        let prefix = format!("{}/", path);
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|key, _| key != path && !key.starts_with(&prefix));
        Ok(files.len() != before)
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{}/", dir);
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn exists(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|key| key == path || key.starts_with(&prefix))
    }
}

/// One scripted gateway reaction
pub enum Scripted {
    /// Stream these fragments, then `Completed` with their concatenation
    Reply(Vec<String>),
    /// Stream these fragments, then a stream error
    StreamError(Vec<String>, String),
    /// Fail before streaming starts
    Fail(GatewayError),
    /// Stream these fragments and never finish
    Hang(Vec<String>),
    /// Stream these fragments, then close without a terminal event
    Truncated(Vec<String>),
}

impl Scripted {
    pub fn reply(text: &str) -> Self {
        Scripted::Reply(vec![text.to_string()])
    }
}

#[derive(Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
    held: Mutex<Vec<mpsc::Sender<StreamEvent>>>,
}

impl MockGateway {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::Other("No more responses".to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        match next {
            Scripted::Reply(fragments) => {
                let full = fragments.concat();
                for fragment in fragments {
                    tx.send(StreamEvent::Delta(fragment)).await.unwrap();
                }
                tx.send(StreamEvent::Completed(full)).await.unwrap();
            }
            Scripted::StreamError(fragments, error) => {
                for fragment in fragments {
                    tx.send(StreamEvent::Delta(fragment)).await.unwrap();
                }
                tx.send(StreamEvent::Error(error)).await.unwrap();
            }
            Scripted::Fail(error) => return Err(error),
            Scripted::Hang(fragments) => {
                for fragment in fragments {
                    tx.send(StreamEvent::Delta(fragment)).await.unwrap();
                }
                self.held.lock().unwrap().push(tx);
            }
            Scripted::Truncated(fragments) => {
                for fragment in fragments {
                    tx.send(StreamEvent::Delta(fragment)).await.unwrap();
                }
            }
        }
        Ok(StreamHandle::new(rx))
    }
}

#[derive(Default)]
pub struct StaticProductSource {
    pub prd: Option<String>,
    pub features: Vec<Feature>,
    pub requirements: Vec<Requirement>,
}

impl ProductSource for StaticProductSource {
    fn load_prd(&self) -> Result<Option<String>, StoreError> {
        Ok(self.prd.clone())
    }

    fn load_features(&self) -> Result<Vec<Feature>, StoreError> {
        Ok(self.features.clone())
    }

    fn load_requirements(&self) -> Result<Vec<Requirement>, StoreError> {
        Ok(self.requirements.clone())
    }
}

/// Records every progress callback
#[derive(Default)]
pub struct RecordingProgress {
    pub fragments: Mutex<Vec<String>>,
    pub phases: Mutex<Vec<(PlanningPhase, Option<String>, Option<bool>)>>,
}

impl RecordingProgress {
    pub fn text(&self) -> String {
        self.fragments.lock().unwrap().concat()
    }
}

impl PlanningProgress for RecordingProgress {
    fn on_phase_start(&self, phase: PlanningPhase, target: Option<&str>) {
        self.phases
            .lock()
            .unwrap()
            .push((phase, target.map(str::to_string), None));
    }

    fn on_fragment(&self, fragment: &str) {
        self.fragments.lock().unwrap().push(fragment.to_string());
    }

    fn on_phase_complete(&self, phase: PlanningPhase, success: bool) {
        self.phases
            .lock()
            .unwrap()
            .push((phase, None, Some(success)));
    }
}

/// Architect reply with a two-layer architecture
pub const ARCHITECT_REPLY: &str = r#"Here is the architecture.

```yaml
version: "1.0"
project_type: "web_application"
runtime:
  language: "typescript"
  version: "5.4"
frameworks:
  backend:
    name: "hono"
    version: "4.0"
database:
  type: "postgresql"
  version: "16"
  orm: "drizzle"
testing:
  unit: "vitest"
dependencies:
  - name: "zod"
    version: "3.23"
    purpose: "validation"
```

```yaml
version: 1.0
architect_summary: |
  Domain first, then the API.
layers:
  - id: "layer-01"
    name: "Domain"
    order: 1
    description: "Entities"
    responsibilities:
      - "Business rules"
    outputs:
      - "src/domain"
    depends_on: []
  - id: "layer-02"
    name: "API"
    order: 2
    description: "HTTP handlers"
    depends_on: ["layer-01"]
```
"#;

/// Layer planner reply for `layer-01` with two groups, `g2` after `g1`
pub const LAYER_REPLY: &str = r#"```yaml
version: "1.0"
layer_id: "layer-01"
layer_name: "Domain"
groups:
  - id: "g1"
    name: "Users"
    order: 1
    description: "User entity"
    contracts:
      exports:
        - name: "User"
          type: "interface"
          file: "src/domain/user.ts"
      interfaces:
        - name: "UserRepository"
          methods:
            - "findById(id: string): Promise<User | null>"
    depends_on_groups: []
    estimated_tasks: 2
  - id: "g2"
    name: "Sessions"
    order: 2
    description: "Session entity"
    depends_on_groups: ["g1"]
    estimated_tasks: 1
execution_order:
  - ["g1"]
  - ["g2"]
```"#;

/// Group planner reply with two tasks
pub const GROUP_REPLY: &str = r#"```markdown
---
id: T-001
title: User entity
status: pending
---

# T-001: User entity

## Done When

- [ ] User compiles
```

```markdown
---
id: T-002
title: User repository
status: pending
---

# T-002: User repository

## Done When

- [ ] Repository tests pass
```
"#;
