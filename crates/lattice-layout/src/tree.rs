#![forbid(unsafe_code)]

//! Arena holding every content item of a layout.
//!
//! Nodes reference each other by [`ItemId`]. The arena enforces the
//! structural rules (which kinds may hold which, no cycles, one parent per
//! item) and nothing else; sizing, tabs and host side effects live in the
//! layout.

use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::item::{ItemId, Node, NodeKind};

#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: BTreeMap<ItemId, Node>,
    next_id: ItemId,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: ItemId::MIN,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a detached node and return its id.
    pub fn insert(&mut self, kind: NodeKind) -> ItemId {
        let id = self.next_id;
        self.next_id = id.next();
        self.nodes.insert(id, Node::new(id, kind));
        id
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Node lookup that reports unknown ids as errors.
    pub fn node(&self, id: ItemId) -> Result<&Node, LayoutError> {
        self.nodes.get(&id).ok_or(LayoutError::UnknownItem(id))
    }

    pub(crate) fn node_mut(&mut self, id: ItemId) -> Result<&mut Node, LayoutError> {
        self.nodes.get_mut(&id).ok_or(LayoutError::UnknownItem(id))
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Position of `child` among `parent`'s children.
    #[must_use]
    pub fn index_of(&self, parent: ItemId, child: ItemId) -> Option<usize> {
        self.get(parent)?.children.iter().position(|&c| c == child)
    }

    /// Parent chain starting at `id` itself.
    pub fn ancestors(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), move |&current| {
            self.get(current).and_then(Node::parent)
        })
    }

    /// True when `ancestor` is `id` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Topmost node reachable through parent links.
    #[must_use]
    pub fn top_of(&self, id: ItemId) -> ItemId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Pre-order walk of the subtree at `id`.
    #[must_use]
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Check that `child` may be attached under `parent` at `index`.
    pub fn check_attach(
        &self,
        parent: ItemId,
        child: ItemId,
        index: usize,
    ) -> Result<(), LayoutError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if let Some(existing) = child_node.parent {
            return Err(LayoutError::AlreadyAttached {
                item: child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::CycleDetected { item: child });
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { parent, index, len });
        }
        let invalid = || LayoutError::InvalidChildType {
            parent: parent_node.item_type(),
            child: child_node.item_type(),
        };
        match (&parent_node.kind, &child_node.kind) {
            (_, NodeKind::Ground) | (NodeKind::Component(_), _) => Err(invalid()),
            (NodeKind::Ground, NodeKind::Component(_)) => Err(invalid()),
            (NodeKind::Ground, _) if len > 0 => Err(LayoutError::GroundOccupied),
            (NodeKind::Ground, _) => Ok(()),
            (NodeKind::RowOrColumn(_), NodeKind::Component(_)) => {
                Err(LayoutError::ComponentUnderRowOrColumn { parent, child })
            }
            (NodeKind::RowOrColumn(_), _) => Ok(()),
            (NodeKind::Stack(_), NodeKind::Component(_)) => Ok(()),
            (NodeKind::Stack(_), _) => Err(invalid()),
        }
    }

    /// Attach a detached node under `parent` at `index`.
    pub fn attach(
        &mut self,
        parent: ItemId,
        child: ItemId,
        index: usize,
    ) -> Result<(), LayoutError> {
        self.check_attach(parent, child, index)?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`, returning its former index.
    pub fn detach(&mut self, parent: ItemId, child: ItemId) -> Result<usize, LayoutError> {
        let index = self
            .index_of(parent, child)
            .ok_or(LayoutError::NotAChild { parent, child })?;
        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(index)
    }

    /// Put `new` where `old` sits under `parent`. `old` becomes detached.
    pub fn swap_child(
        &mut self,
        parent: ItemId,
        old: ItemId,
        new: ItemId,
    ) -> Result<usize, LayoutError> {
        let index = self
            .index_of(parent, old)
            .ok_or(LayoutError::NotAChild { parent, child: old })?;
        self.detach(parent, old)?;
        if let Err(e) = self.attach(parent, new, index) {
            self.attach(parent, old, index)?;
            return Err(e);
        }
        Ok(index)
    }

    /// Remove a detached subtree from the arena, children first.
    pub fn remove_subtree(&mut self, id: ItemId) -> Vec<Node> {
        let mut order = self.descendants(id);
        order.reverse();
        if let Some(parent) = self.get(id).and_then(Node::parent)
            && let Some(node) = self.get_mut(parent)
        {
            node.children.retain(|&c| c != id);
        }
        order
            .into_iter()
            .filter_map(|item| self.nodes.remove(&item))
            .collect()
    }

    /// Verify parent/child links agree and every kind rule holds.
    pub fn validate(&self) -> Result<(), String> {
        for node in self.nodes.values() {
            for &child in &node.children {
                let Some(child_node) = self.get(child) else {
                    return Err(format!("item {} lists missing child {}", node.id.get(), child.get()));
                };
                if child_node.parent != Some(node.id) {
                    return Err(format!(
                        "child {} of {} has parent {:?}",
                        child.get(),
                        node.id.get(),
                        child_node.parent.map(ItemId::get)
                    ));
                }
                let ok = match (&node.kind, &child_node.kind) {
                    (_, NodeKind::Ground) | (NodeKind::Component(_), _) => false,
                    (NodeKind::Ground, NodeKind::Component(_)) => false,
                    (NodeKind::RowOrColumn(_), NodeKind::Component(_)) => false,
                    (NodeKind::Stack(_), child) => matches!(child, NodeKind::Component(_)),
                    _ => true,
                };
                if !ok {
                    return Err(format!(
                        "{:?} {} cannot hold {:?} {}",
                        node.item_type(),
                        node.id.get(),
                        child_node.item_type(),
                        child.get()
                    ));
                }
            }
            if node.is_ground() && node.children.len() > 1 {
                return Err(format!("ground {} holds {} items", node.id.get(), node.children.len()));
            }
            if let Some(parent) = node.parent {
                let listed = self
                    .get(parent)
                    .is_some_and(|p| p.children.contains(&node.id));
                if !listed {
                    return Err(format!(
                        "item {} claims parent {} which does not list it",
                        node.id.get(),
                        parent.get()
                    ));
                }
            }
            if let NodeKind::Stack(stack) = &node.kind {
                if let Some(active) = stack.active_index
                    && active >= node.children.len()
                {
                    return Err(format!(
                        "stack {} active index {active} out of range",
                        node.id.get()
                    ));
                }
                if !stack.tabs.is_empty() && stack.tabs.len() != node.children.len() {
                    return Err(format!(
                        "stack {} has {} tabs for {} children",
                        node.id.get(),
                        stack.tabs.len(),
                        node.children.len()
                    ));
                }
            }
        }
        Ok(())
    }
}
