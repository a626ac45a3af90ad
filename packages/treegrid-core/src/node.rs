use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};

/// Parent marker carried by the single root node of a snapshot.
pub const ROOT_PARENT: &str = "#";

/// Visual state travelling with each node into the rendering collaborator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct NodeUiState {
    pub opened: bool,
    pub disabled: bool,
    pub selected: bool,
}

/// One tree entry, serialized in the shape hierarchical widgets consume
/// (`label` goes over the wire as `text`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    #[serde(rename = "text")]
    pub label: String,
    pub parent: String,
    pub state: NodeUiState,
}

impl TreeNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent: parent.into(),
            state: NodeUiState::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent == ROOT_PARENT
    }
}

/// Ordered tree built once per control activation: root first, then descendants
/// in fetch order. Discarded wholesale on deactivation, never patched in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    nodes: Vec<TreeNode>,
}

impl TreeSnapshot {
    /// Build a snapshot from pre-assembled nodes. The assembler is the usual
    /// producer; this exists for adapters and tests.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.is_root())
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn push(&mut self, node: TreeNode) {
        self.nodes.push(node);
    }

    /// Whether the node's parent chain reaches the root marker. Dangling parent
    /// references and cycles both report `false`.
    pub fn is_traceable(&self, id: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = id;
        loop {
            if !visited.insert(current) {
                return false;
            }
            match self.get(current) {
                Some(node) if node.is_root() => return true,
                Some(node) => current = node.parent.as_str(),
                None => return false,
            }
        }
    }

    /// Validate invariants: exactly one root-marker node, unique ids. Intended for
    /// tests and debugging; the assembler itself does not re-validate batches.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate node id in snapshot: {}",
                    node.id
                )));
            }
        }
        let roots = self.nodes.iter().filter(|n| n.is_root()).count();
        if roots != 1 {
            return Err(Error::Configuration(format!(
                "snapshot has {roots} root nodes, expected exactly one"
            )));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TreeSnapshot {
    type Item = &'a TreeNode;
    type IntoIter = std::slice::Iter<'a, TreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> TreeSnapshot {
        let mut snap = TreeSnapshot::default();
        for (id, parent) in entries {
            snap.push(TreeNode::new(*id, *id, *parent));
        }
        snap
    }

    #[test]
    fn traceability_follows_multi_level_chains() {
        let snap = snapshot(&[("r", ROOT_PARENT), ("a", "r"), ("b", "a")]);
        assert!(snap.is_traceable("b"));
        assert!(snap.is_traceable("r"));
        snap.validate().unwrap();
    }

    #[test]
    fn dangling_parent_is_not_traceable() {
        let snap = snapshot(&[("r", ROOT_PARENT), ("a", "ghost")]);
        assert!(!snap.is_traceable("a"));
        // Still a valid snapshot: dangling parents are a collaborator concern.
        snap.validate().unwrap();
    }

    #[test]
    fn cycles_do_not_hang_traceability() {
        let snap = snapshot(&[("r", ROOT_PARENT), ("a", "b"), ("b", "a")]);
        assert!(!snap.is_traceable("a"));
    }

    #[test]
    fn validate_rejects_duplicate_ids_and_extra_roots() {
        let dup = snapshot(&[("r", ROOT_PARENT), ("a", "r"), ("a", "r")]);
        assert!(dup.validate().is_err());

        let two_roots = snapshot(&[("r", ROOT_PARENT), ("s", ROOT_PARENT)]);
        assert!(two_roots.validate().is_err());
    }

    #[test]
    fn node_serializes_label_as_text() {
        let node = TreeNode::new("n1", "Node One", ROOT_PARENT);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["text"], "Node One");
        assert_eq!(json["parent"], "#");
        assert_eq!(json["state"]["selected"], false);
    }
}
