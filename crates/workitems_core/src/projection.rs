//! Tree projection of store state for display.
//!
//! # Responsibility
//! - Resolve root ids and child ids into display nodes on demand.
//! - Derive one status badge per node.
//!
//! # Invariants
//! - Ids missing from the store (already deleted) are skipped, never surfaced.
//! - Node order follows `root_ids` / `child_ids` order.

use crate::model::item::{ItemId, ItemType, WorkItem};
use crate::service::command_service::item_label;
use crate::store::WorkItemStore;
use std::collections::HashSet;

/// Status badge rendered next to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    None,
    Loading,
    /// `is_error` is set.
    Incomplete,
    Complete,
}

impl StatusBadge {
    /// Short description text, empty for `None`.
    pub fn description(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Loading => "Loading...",
            Self::Incomplete => "Incomplete",
            Self::Complete => "Complete",
        }
    }

    /// Priority: loading, then error, then complete.
    pub fn for_item(item: &WorkItem) -> Self {
        if item.status.is_loading {
            Self::Loading
        } else if item.status.is_error {
            Self::Incomplete
        } else if item.status.is_complete {
            Self::Complete
        } else {
            Self::None
        }
    }
}

/// Display node for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: ItemId,
    pub kind: ItemType,
    /// Non-blank title, else the type name.
    pub label: String,
    /// Whether the node has children to expand.
    pub collapsible: bool,
    pub badge: StatusBadge,
}

impl TreeNode {
    fn from_item(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind.clone(),
            label: item_label(item).to_string(),
            collapsible: !item.child_ids.is_empty(),
            badge: StatusBadge::for_item(item),
        }
    }
}

/// Read-only projection over a borrowed store.
pub struct TreeProjection<'store> {
    store: &'store WorkItemStore,
}

impl<'store> TreeProjection<'store> {
    pub fn new(store: &'store WorkItemStore) -> Self {
        Self { store }
    }

    /// Roots when `parent` is `None`, else the children of `parent`.
    ///
    /// An unknown `parent` yields no children.
    pub fn children(&self, parent: Option<&ItemId>) -> Vec<TreeNode> {
        let ids = match parent {
            None => self.store.root_ids(),
            Some(parent) => self.store.children_of(parent),
        };
        ids.iter()
            .filter_map(|id| self.store.get_item(id))
            .map(TreeNode::from_item)
            .collect()
    }

    /// Node for one id, if it is still in the store.
    pub fn node(&self, id: &ItemId) -> Option<TreeNode> {
        self.store.get_item(id).map(TreeNode::from_item)
    }

    /// Depth-first `(depth, node)` listing of the whole tree, roots at depth 0.
    pub fn flatten(&self) -> Vec<(usize, TreeNode)> {
        let mut rows = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<(usize, ItemId)> = self
            .store
            .root_ids()
            .iter()
            .rev()
            .map(|id| (0, *id))
            .collect();

        while let Some((depth, id)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(item) = self.store.get_item(&id) else {
                continue;
            };
            rows.push((depth, TreeNode::from_item(item)));
            stack.extend(item.child_ids.iter().rev().map(|child| (depth + 1, *child)));
        }
        rows
    }
}
