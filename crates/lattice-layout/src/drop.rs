#![forbid(unsafe_code)]

//! Tree surgery performed when a dragged item is dropped.

use tracing::debug;

use crate::areas::{DropSegment, DropTarget, Side};
use crate::error::LayoutError;
use crate::item::{Axis, ItemId, Node, NodeKind, RowOrColumn, Stack};
use crate::layout::Layout;

impl Layout {
    /// Insert a detached `item` at `target`.
    pub(crate) fn on_drop(&mut self, item: ItemId, target: DropTarget) -> Result<(), LayoutError> {
        debug!(target: "lattice.drag", item = item.get(), ?target, "drop");
        match target {
            DropTarget::Ground { side } => self.drop_on_ground(item, side),
            DropTarget::Stack { stack, segment } => self.drop_on_stack(item, stack, segment),
        }
    }

    /// Detached stack holding `item`, or `item` itself if it is already a
    /// stack. A dragged row or column gives its components to the new stack.
    fn wrap_in_stack(&mut self, item: ItemId) -> Result<ItemId, LayoutError> {
        let node = self.tree.node(item)?;
        if node.is_stack() {
            return Ok(item);
        }
        let is_component = node.is_component();
        let stack = self.tree.insert(NodeKind::Stack(Stack::default()));
        if is_component {
            self.insert_child(stack, item, Some(0), true)?;
        } else {
            self.absorb_leaves(item, stack, Some(0), true)?;
        }
        Ok(stack)
    }

    /// Move every component under the detached `item` into `stack` from
    /// `index` on, in tree order, then free what remains of `item`.
    ///
    /// The stack's active tab becomes `item`'s active tab when `item` is a
    /// stack, or its first component otherwise.
    fn absorb_leaves(
        &mut self,
        item: ItemId,
        stack: ItemId,
        index: Option<usize>,
        suspend_resize: bool,
    ) -> Result<(), LayoutError> {
        let leaves: Vec<ItemId> = self
            .tree
            .descendants(item)
            .into_iter()
            .filter(|&id| self.tree.get(id).is_some_and(Node::is_component))
            .collect();
        let active = self
            .tree
            .node(item)?
            .active_child()
            .or_else(|| leaves.first().copied());
        let mut at = index.unwrap_or_else(|| self.children_of(stack).len());
        for leaf in leaves {
            let Some(holder) = self.parent_of(leaf) else {
                continue;
            };
            self.tree.detach(holder, leaf)?;
            if let Some(s) = self.tree.get_mut(holder).and_then(Node::as_stack_mut)
                && let Some(pos) = s.tabs.iter().position(|t| t.item == leaf)
            {
                let tab = s.tabs.remove(pos);
                self.header.destroy_tab(tab.handle);
            }
            self.insert_child(stack, leaf, Some(at), suspend_resize)?;
            at += 1;
        }
        debug!(target: "lattice.drag", item = item.get(), stack = stack.get(), "dropped item flattened into stack");
        self.destroy_detached(item);
        if let Some(active) = active {
            if self.is_live(stack) {
                self.set_active_content_item(stack, active)?;
            } else if let Some(i) = self.tree.index_of(stack, active)
                && let Some(s) = self.tree.get_mut(stack).and_then(Node::as_stack_mut)
            {
                s.active_index = Some(i);
            }
        }
        Ok(())
    }

    fn new_row_or_column(&mut self, axis: Axis) -> ItemId {
        self.tree.insert(NodeKind::RowOrColumn(RowOrColumn {
            axis,
            splitters: Vec::new(),
        }))
    }

    fn set_size(&mut self, item: ItemId, axis: Axis, size: f64) {
        if let Some(node) = self.tree.get_mut(item) {
            node.set_size_along(axis, size);
        }
    }

    fn size_or_share(&self, item: ItemId, axis: Axis) -> f64 {
        let siblings = self
            .parent_of(item)
            .map_or(1, |p| self.children_of(p).len().max(1));
        self.tree
            .get(item)
            .and_then(|n| n.size_along(axis))
            .unwrap_or(100.0 / siblings as f64)
    }

    fn drop_on_ground(&mut self, item: ItemId, side: Option<Side>) -> Result<(), LayoutError> {
        let item = self.wrap_in_stack(item)?;
        let Some(root) = self.root_item() else {
            self.insert_child(self.ground, item, Some(0), false)?;
            return Ok(());
        };
        let side = side.unwrap_or(Side::Right);
        let axis = if side.is_vertical() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        };
        let before = side.inserts_before();

        if self.tree.node(root)?.axis() == Some(axis) {
            let len = self.children_of(root).len();
            let sibling = if before {
                self.children_of(root).first().copied()
            } else {
                self.children_of(root).last().copied()
            };
            self.insert_child(root, item, Some(if before { 0 } else { len }), true)?;
            if let Some(sibling) = sibling {
                let half = self.size_or_share(sibling, axis) * 0.5;
                self.set_size(sibling, axis, half);
                self.set_size(item, axis, half);
            } else {
                self.set_size(item, axis, 100.0);
            }
        } else {
            let row_or_column = self.new_row_or_column(axis);
            self.replace_child(self.ground, root, row_or_column, false)?;
            let (first, second) = if before { (item, root) } else { (root, item) };
            self.insert_child(row_or_column, first, Some(0), true)?;
            self.insert_child(row_or_column, second, Some(1), true)?;
            self.set_size(root, axis, 50.0);
            self.set_size(item, axis, 50.0);
        }
        self.arrange();
        Ok(())
    }

    fn drop_on_stack(
        &mut self,
        item: ItemId,
        stack: ItemId,
        segment: DropSegment,
    ) -> Result<(), LayoutError> {
        match segment {
            DropSegment::Header { index } => self.drop_into_stack(item, stack, Some(index)),
            DropSegment::Body => self.drop_into_stack(item, stack, None),
            DropSegment::Left | DropSegment::Top | DropSegment::Right | DropSegment::Bottom => {
                self.drop_beside_stack(item, stack, segment)
            }
        }
    }

    /// Header and body drops add the item as a tab. A dropped stack, row or
    /// column gives up its components instead of nesting.
    fn drop_into_stack(
        &mut self,
        item: ItemId,
        stack: ItemId,
        index: Option<usize>,
    ) -> Result<(), LayoutError> {
        let len = self.children_of(stack).len();
        let index = index.map(|i| i.min(len));
        if self.tree.node(item)?.is_component() {
            self.insert_child(stack, item, index, false)?;
            return Ok(());
        }
        self.absorb_leaves(item, stack, index, false)
    }

    /// Side drops split the stack: into its parent row/column when the
    /// direction matches, otherwise into a new row/column that takes the
    /// stack's place.
    fn drop_beside_stack(
        &mut self,
        item: ItemId,
        stack: ItemId,
        segment: DropSegment,
    ) -> Result<(), LayoutError> {
        let item = self.wrap_in_stack(item)?;
        let axis = match segment {
            DropSegment::Top | DropSegment::Bottom => Axis::Vertical,
            _ => Axis::Horizontal,
        };
        let before = matches!(segment, DropSegment::Left | DropSegment::Top);
        let parent = self
            .parent_of(stack)
            .ok_or(LayoutError::UnknownItem(stack))?;

        if self.tree.node(parent)?.axis() == Some(axis) {
            let index = self
                .tree
                .index_of(parent, stack)
                .ok_or(LayoutError::NotAChild {
                    parent,
                    child: stack,
                })?;
            let at = if before { index } else { index + 1 };
            let half = self.size_or_share(stack, axis) * 0.5;
            self.insert_child(parent, item, Some(at), true)?;
            self.set_size(stack, axis, half);
            self.set_size(item, axis, half);
        } else {
            let row_or_column = self.new_row_or_column(axis);
            self.replace_child(parent, stack, row_or_column, false)?;
            let (first, second) = if before { (item, stack) } else { (stack, item) };
            self.insert_child(row_or_column, first, Some(0), true)?;
            self.insert_child(row_or_column, second, Some(1), true)?;
            self.set_size(stack, axis, 50.0);
            self.set_size(item, axis, 50.0);
        }
        self.arrange();
        Ok(())
    }
}
