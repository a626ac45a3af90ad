use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

use crate::config::TreeConfig;
use crate::error::Result;
use crate::node::TreeSnapshot;

/// Options handed to the rendering collaborator on initialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub multiple_selection: bool,
    /// Storage key for persisted expanded-node state.
    pub persist_state_key: String,
    pub enable_search: bool,
    pub case_sensitive_search: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            multiple_selection: false,
            persist_state_key: crate::config::DEFAULT_STATE_KEY.to_string(),
            enable_search: true,
            case_sensitive_search: false,
        }
    }
}

impl RenderOptions {
    pub fn for_config(config: &TreeConfig) -> Self {
        Self {
            persist_state_key: config.state_key.clone(),
            ..Self::default()
        }
    }
}

/// Who triggered a collaborator event. The collaborator echoes programmatic state
/// syncs back through the same event stream; the origin marker is what keeps those
/// echoes from looping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventOrigin {
    User,
    Programmatic,
}

/// Events emitted by the rendering collaborator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TreeEvent {
    NodeSelected { id: String, origin: EventOrigin },
    NodeDeselected { id: String, origin: EventOrigin },
    StateChanged { origin: EventOrigin },
}

/// Hierarchical display widget living outside this crate. Loaded asynchronously
/// by the host, so readiness must be polled before the first handoff.
#[async_trait]
pub trait TreeRenderer {
    /// Whether the widget library has finished loading.
    fn is_ready(&self) -> bool;

    /// Hand the snapshot over for display. Safe to call again with the same
    /// snapshot; collaborators treat a repeat initialize as a redraw.
    async fn initialize(&mut self, snapshot: &TreeSnapshot, options: &RenderOptions) -> Result<()>;

    /// Reflect a selection change the core accepted (`None` clears the selection).
    async fn apply_selection(&mut self, selected: Option<&str>) -> Result<()>;
}

#[derive(Debug, Default)]
struct RecordingRendererInner {
    ready_after: u32,
    polls: u32,
    snapshots: Vec<TreeSnapshot>,
    options: Vec<RenderOptions>,
    selections: Vec<Option<String>>,
}

/// In-memory rendering collaborator for prototyping and tests. Clones share state
/// so a test can keep a handle while the control owns the renderer.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<RecordingRendererInner>>,
}

impl RecordingRenderer {
    /// Ready from the first check.
    pub fn ready() -> Self {
        Self::ready_after(0)
    }

    /// Reports not-ready for the first `polls` readiness checks.
    pub fn ready_after(polls: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecordingRendererInner {
                ready_after: polls,
                ..RecordingRendererInner::default()
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingRendererInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn polls(&self) -> u32 {
        self.lock().polls
    }

    pub fn initialize_count(&self) -> usize {
        self.lock().snapshots.len()
    }

    pub fn last_snapshot(&self) -> Option<TreeSnapshot> {
        self.lock().snapshots.last().cloned()
    }

    pub fn last_options(&self) -> Option<RenderOptions> {
        self.lock().options.last().cloned()
    }

    pub fn applied_selections(&self) -> Vec<Option<String>> {
        self.lock().selections.clone()
    }
}

#[async_trait]
impl TreeRenderer for RecordingRenderer {
    fn is_ready(&self) -> bool {
        let mut inner = self.lock();
        let ready = inner.polls >= inner.ready_after;
        inner.polls += 1;
        ready
    }

    async fn initialize(&mut self, snapshot: &TreeSnapshot, options: &RenderOptions) -> Result<()> {
        let mut inner = self.lock();
        inner.snapshots.push(snapshot.clone());
        inner.options.push(options.clone());
        Ok(())
    }

    async fn apply_selection(&mut self, selected: Option<&str>) -> Result<()> {
        self.lock().selections.push(selected.map(str::to_string));
        Ok(())
    }
}
