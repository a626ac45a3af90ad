use tracing::warn;

use crate::config::TreeConfig;
use crate::error::{Error, Result};
use crate::node::{TreeNode, TreeSnapshot, ROOT_PARENT};
use crate::record::Record;

/// Build the ordered snapshot handed to the rendering collaborator.
///
/// Emits the root first, then one node per descendant in fetch order. Parent
/// pointers are copied verbatim: a descendant may reference any ancestor in the
/// batch, and it is the caller's filter/order query that guarantees referential
/// completeness. Dangling parent ids pass through untouched and surface as a
/// collaborator concern, not a core error.
pub fn assemble(root: &Record, descendants: &[Record], config: &TreeConfig) -> Result<TreeSnapshot> {
    let root_id = root
        .text(&config.id_attribute)
        .ok_or_else(|| Error::MissingAttribute(config.id_attribute.clone()))?;
    let root_label = label_of(root, root_id, config);

    let mut snapshot = TreeSnapshot::default();
    snapshot.push(TreeNode::new(root_id, root_label, ROOT_PARENT));

    for record in descendants {
        let Some(id) = record.text(&config.id_attribute) else {
            warn!(attribute = %config.id_attribute, "skipping descendant without an id attribute");
            continue;
        };
        if id == root_id {
            // Self-rooted trees can return the root row from the descendant filter.
            continue;
        }
        let parent = config
            .parent_attribute
            .as_deref()
            .and_then(|attr| record.text(attr))
            .unwrap_or(root_id);
        snapshot.push(TreeNode::new(id, label_of(record, id, config), parent));
    }

    Ok(snapshot)
}

fn label_of(record: &Record, id: &str, config: &TreeConfig) -> String {
    match record.text(&config.label_attribute) {
        Some(label) => label.to_string(),
        None => {
            warn!(%id, attribute = %config.label_attribute, "record has no label, falling back to id");
            id.to_string()
        }
    }
}
