#![forbid(unsafe_code)]
//! Rebuilds a parent-linked tree from flat records fetched out of a remote store
//! and keeps it synchronized with a single selected record. The record store,
//! the hierarchical display widget, and the navigation callback all stay behind
//! traits so the core can sit inside any host control.

pub mod assembler;
pub mod config;
pub mod control;
pub mod error;
pub mod navigate;
pub mod node;
pub mod record;
pub mod render;
pub mod resolver;
pub mod selection;
pub mod store;

pub use assembler::assemble;
pub use config::{
    ControlSettings, TreeConfig, DEFAULT_DEBOUNCE_DELAY, DEFAULT_PAGE_CAP, DEFAULT_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, DEFAULT_STATE_KEY,
};
pub use control::TreeGridControl;
pub use error::{Error, Result};
pub use navigate::{Navigator, RecordingNavigator};
pub use node::{NodeUiState, TreeNode, TreeSnapshot, ROOT_PARENT};
pub use record::{Record, RecordRef};
pub use render::{EventOrigin, RecordingRenderer, RenderOptions, TreeEvent, TreeRenderer};
pub use resolver::resolve_root;
pub use selection::{ControllerState, Debouncer, SelectionChange, SelectionController};
pub use store::{ascending_order, equals_filter, MemoryRecordStore, RecordStore};
