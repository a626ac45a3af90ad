use std::time::Duration;

use crate::error::{Error, Result};

/// Hard upper bound on descendants fetched per tree build. Collections larger than
/// this are silently truncated; there is no pagination continuation.
pub const DEFAULT_PAGE_CAP: usize = 5000;

/// How often the orchestrator re-checks an asynchronously loaded rendering collaborator.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How many ready checks are attempted before giving up on the collaborator.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 20;

/// Settle time before a burst of widget change events produces one navigation request.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

/// Storage key under which the collaborator persists expanded-node state.
pub const DEFAULT_STATE_KEY: &str = "treekey";

/// Raw host-provided settings, as handed over at control construction.
/// Everything except the entity name and label attribute is optional.
#[derive(Clone, Debug, Default)]
pub struct ControlSettings {
    pub entity_name: Option<String>,
    pub label_attribute: Option<String>,
    /// Defaults to `"<entity_name>id"` when absent.
    pub id_attribute: Option<String>,
    pub parent_attribute: Option<String>,
    pub root_attribute: Option<String>,
    pub page_cap: Option<usize>,
    pub poll_interval: Option<Duration>,
    pub poll_attempts: Option<u32>,
    pub debounce_delay: Option<Duration>,
    pub state_key: Option<String>,
}

/// Immutable configuration resolved once per control. Absent optional mappings
/// disable the dependent feature instead of failing: no root attribute means every
/// record is its own root, no parent attribute parents every descendant to the root.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub entity_name: String,
    pub label_attribute: String,
    pub id_attribute: String,
    pub parent_attribute: Option<String>,
    pub root_attribute: Option<String>,
    pub page_cap: usize,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    pub debounce_delay: Duration,
    pub state_key: String,
}

impl TreeConfig {
    pub fn resolve(settings: &ControlSettings) -> Result<Self> {
        let entity_name = required(&settings.entity_name, "entity logical name")?;
        let label_attribute = required(&settings.label_attribute, "display-label attribute")?;
        let id_attribute = settings
            .id_attribute
            .clone()
            .unwrap_or_else(|| format!("{entity_name}id"));

        Ok(Self {
            entity_name,
            label_attribute,
            id_attribute,
            parent_attribute: settings.parent_attribute.clone(),
            root_attribute: settings.root_attribute.clone(),
            page_cap: settings.page_cap.unwrap_or(DEFAULT_PAGE_CAP),
            poll_interval: settings.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_attempts: settings.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
            debounce_delay: settings.debounce_delay.unwrap_or(DEFAULT_DEBOUNCE_DELAY),
            state_key: settings
                .state_key
                .clone()
                .unwrap_or_else(|| DEFAULT_STATE_KEY.to_string()),
        })
    }
}

fn required(value: &Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::Configuration(format!("{what} is required"))),
    }
}
