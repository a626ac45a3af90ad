use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;
use crate::record::RecordRef;

/// Host navigation callback used to open the record behind a selected node.
/// Outcomes are logged by the caller; this crate never retries navigation.
#[async_trait]
pub trait Navigator {
    async fn open_record(&self, entity: &str, id: &str) -> Result<()>;
}

/// In-memory navigator for prototyping and tests. Clones share the log.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    opened: Arc<Mutex<Vec<RecordRef>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<RecordRef> {
        match self.opened.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn open_record(&self, entity: &str, id: &str) -> Result<()> {
        let mut opened = match self.opened.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        opened.push(RecordRef::new(entity, id));
        Ok(())
    }
}
