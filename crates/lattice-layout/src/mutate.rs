#![forbid(unsafe_code)]

//! Structural edits on a live layout.
//!
//! Every edit keeps tabs, active items, relative sizes and host panels in
//! step with the arena, and emits the matching bubbling events.

use tracing::{debug, warn};

use crate::config::ItemConfig;
use crate::error::LayoutError;
use crate::event::LayoutEvent;
use crate::host::ComponentRequest;
use crate::item::{ItemId, ItemType, Node, NodeKind, Tab};
use crate::layout::Layout;

impl Layout {
    /// Create panels and tabs for an uninitialised subtree, children first.
    pub(crate) fn init_subtree(&mut self, id: ItemId) -> Result<(), LayoutError> {
        let node = self.tree.node(id)?;
        if node.initialised {
            return Ok(());
        }
        let children = node.children().to_vec();
        for &child in &children {
            self.init_subtree(child)?;
        }

        let node = self.tree.node(id)?;
        let is_stack = node.is_stack();
        let pending_panel = node
            .as_component()
            .filter(|c| c.panel.is_none())
            .map(|c| (c.component_type.clone(), c.state.clone(), node.title().to_owned()));
        if let Some((component_type, state, title)) = pending_panel {
            let panel = self.host.create(ComponentRequest {
                item: id,
                component_type: &component_type,
                state: &state,
                title: &title,
            })?;
            if let Some(c) = self.tree.get_mut(id).and_then(Node::as_component_mut) {
                c.panel = Some(panel);
            }
        }
        if is_stack {
            for (index, &child) in children.iter().enumerate() {
                self.create_tab(id, child, index)?;
            }
            let active = self.tree.node(id)?.active_child();
            if let Some(active) = active {
                self.sync_active_tab(id, active);
            }
        }

        let item_type = {
            let node = self.tree.node_mut(id)?;
            node.initialised = true;
            node.item_type()
        };
        self.emit(id, LayoutEvent::ItemCreated(id));
        let typed = match item_type {
            ItemType::Stack => Some(LayoutEvent::StackCreated(id)),
            ItemType::Row => Some(LayoutEvent::RowCreated(id)),
            ItemType::Column => Some(LayoutEvent::ColumnCreated(id)),
            ItemType::Component => Some(LayoutEvent::ComponentCreated(id)),
            ItemType::Ground => None,
        };
        if let Some(event) = typed {
            self.emit(id, event);
        }
        Ok(())
    }

    /// Undo [`Layout::init_subtree`] without emitting events. Used to roll
    /// back a failed insertion so the item can be retried.
    pub(crate) fn release_subtree(&mut self, id: ItemId) {
        for item in self.tree.descendants(id) {
            let Some(node) = self.tree.get_mut(item) else {
                continue;
            };
            node.initialised = false;
            node.element = Default::default();
            match &mut node.kind {
                NodeKind::Component(c) => {
                    if let Some(panel) = c.panel.take() {
                        self.host.destroy(panel);
                    }
                }
                NodeKind::Stack(stack) => {
                    for tab in stack.tabs.drain(..) {
                        self.header.destroy_tab(tab.handle);
                    }
                }
                _ => {}
            }
        }
    }

    fn create_tab(&mut self, stack: ItemId, item: ItemId, index: usize) -> Result<(), LayoutError> {
        let title = self.tree.node(item)?.title().to_owned();
        let handle = self.header.create_tab(stack, item, &title, index);
        let node = self.tree.node_mut(stack)?;
        if let Some(s) = node.as_stack_mut() {
            let index = index.min(s.tabs.len());
            s.tabs.insert(
                index,
                Tab {
                    item,
                    handle,
                    rect: Default::default(),
                },
            );
        }
        self.events.queue(LayoutEvent::TabCreated { stack, item });
        Ok(())
    }

    fn sync_active_tab(&mut self, stack: ItemId, item: ItemId) {
        let handle = self
            .tree
            .get(stack)
            .and_then(Node::as_stack)
            .and_then(|s| s.tabs.iter().find(|t| t.item == item))
            .map(|t| t.handle);
        if let Some(handle) = handle {
            self.header.set_active_tab(stack, handle);
        }
    }

    /// Tear down an item and its subtree while it is still attached, so
    /// events bubble through its ancestors. The caller detaches and frees
    /// the nodes afterwards.
    pub(crate) fn destroy_item(&mut self, id: ItemId) {
        self.emit(id, LayoutEvent::BeforeItemDestroyed(id));
        let children = self.children_of(id).to_vec();
        for child in children {
            self.destroy_item(child);
        }
        if let Some(node) = self.tree.get_mut(id) {
            match &mut node.kind {
                NodeKind::Component(c) => {
                    if let Some(panel) = c.panel.take() {
                        self.host.destroy(panel);
                    }
                }
                NodeKind::Stack(stack) => {
                    for tab in stack.tabs.drain(..) {
                        self.header.destroy_tab(tab.handle);
                    }
                }
                _ => {}
            }
        }
        self.emit(id, LayoutEvent::ItemDestroyed(id));
        if self.selected == Some(id) {
            self.selected = None;
            self.events.queue(LayoutEvent::SelectionChanged(None));
        }
        if self.maximised == Some(id) {
            self.maximised = None;
        }
        self.events.forget_item(id);
    }

    /// Destroy a detached subtree and free its nodes.
    pub(crate) fn destroy_detached(&mut self, id: ItemId) {
        self.destroy_item(id);
        self.tree.remove_subtree(id);
    }

    // ── Insertion ──────────────────────────────────────────────────────

    /// Attach a detached item under `parent`.
    ///
    /// Appends when `index` is `None`. In a row or column the new child
    /// gets an equal share and existing shares shrink proportionally. In a
    /// stack the new child becomes active.
    pub fn add_child(
        &mut self,
        parent: ItemId,
        item: ItemId,
        index: Option<usize>,
    ) -> Result<usize, LayoutError> {
        self.ensure_alive()?;
        self.insert_child(parent, item, index, false)
    }

    /// Build an item from config and attach it. Components headed for a
    /// row, column or the ground arrive wrapped in a stack.
    pub fn add_child_config(
        &mut self,
        parent: ItemId,
        config: &ItemConfig,
        index: Option<usize>,
    ) -> Result<ItemId, LayoutError> {
        self.ensure_alive()?;
        let parent_type = self.tree.node(parent)?.item_type();
        let item = self.build_item(config, Some(parent_type))?;
        match self.insert_child(parent, item, index, false) {
            Ok(_) => Ok(item),
            Err(e) => {
                self.tree.remove_subtree(item);
                Err(e)
            }
        }
    }

    /// Insertion without re-layout when `suspend_resize` is set; the caller
    /// fixes relative sizes and lays out afterwards.
    pub(crate) fn insert_child(
        &mut self,
        parent: ItemId,
        item: ItemId,
        index: Option<usize>,
        suspend_resize: bool,
    ) -> Result<usize, LayoutError> {
        let len = self.tree.node(parent)?.children().len();
        let index = index.unwrap_or(len);
        self.tree.attach(parent, item, index)?;

        if self.is_live(parent)
            && !self.tree.node(item)?.initialised
            && let Err(e) = self.init_subtree(item)
        {
            self.release_subtree(item);
            self.tree.detach(parent, item)?;
            return Err(e);
        }

        let parent_kind_is = {
            let node = self.tree.node(parent)?;
            (node.is_stack(), node.axis())
        };
        match parent_kind_is {
            (true, _) => {
                if self.is_live(parent) {
                    self.create_tab(parent, item, index)?;
                }
                if let Some(stack) = self.tree.get_mut(parent).and_then(Node::as_stack_mut) {
                    stack.active_index = Some(index);
                }
                self.sync_active_tab(parent, item);
                self.emit(
                    parent,
                    LayoutEvent::ActiveContentItemChanged {
                        stack: parent,
                        item,
                    },
                );
            }
            (false, Some(axis)) if !suspend_resize => {
                let count = self.tree.node(parent)?.children().len();
                let share = 100.0 / count as f64;
                let siblings = self.tree.node(parent)?.children().to_vec();
                for sibling in siblings {
                    if let Some(node) = self.tree.get_mut(sibling) {
                        if sibling == item {
                            node.set_size_along(axis, share);
                        } else if let Some(size) = node.size_along(axis) {
                            node.set_size_along(axis, size * (100.0 - share) / 100.0);
                        }
                    }
                }
            }
            _ => {}
        }

        debug!(
            target: "lattice.tree",
            parent = parent.get(),
            item = item.get(),
            index,
            "child added"
        );
        self.emit(parent, LayoutEvent::StateChanged(parent));
        if !suspend_resize {
            self.arrange();
        }
        Ok(index)
    }

    // ── Removal ────────────────────────────────────────────────────────

    /// Remove `child` from `parent`, destroying it unless `keep_alive`.
    ///
    /// An emptied closable container removes itself from its own parent,
    /// and a closable row or column left with one child is replaced by
    /// that child. Destroying the dragged item, or anything holding it,
    /// waits for the drop.
    pub fn remove_child(
        &mut self,
        parent: ItemId,
        child: ItemId,
        keep_alive: bool,
    ) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        if self.tree.index_of(parent, child).is_none() {
            return Err(LayoutError::NotAChild { parent, child });
        }
        if !keep_alive && self.holds_dragged_item(child) {
            self.defer_destroy(child);
            return Ok(());
        }
        self.detach_child(parent, child, keep_alive)?;
        self.refresh_drag_areas();
        Ok(())
    }

    /// Remove an item from its parent and destroy it.
    ///
    /// The item being dragged has no parent until it lands; removing it
    /// destroys it once the drop resolves.
    pub fn remove_item(&mut self, item: ItemId) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        match self.tree.node(item)?.parent() {
            Some(parent) => self.remove_child(parent, item, false),
            None if self.holds_dragged_item(item) => {
                self.defer_destroy(item);
                Ok(())
            }
            None => Err(LayoutError::UnknownItem(item)),
        }
    }

    fn holds_dragged_item(&self, item: ItemId) -> bool {
        self.drag
            .as_ref()
            .is_some_and(|d| self.tree.is_ancestor_or_self(item, d.item))
    }

    fn defer_destroy(&mut self, item: ItemId) {
        debug!(target: "lattice.tree", item = item.get(), "destroy deferred until drop");
        if !self.deferred_destroy.contains(&item) {
            self.deferred_destroy.push(item);
        }
    }

    pub(crate) fn detach_child(
        &mut self,
        parent: ItemId,
        child: ItemId,
        keep_alive: bool,
    ) -> Result<(), LayoutError> {
        let index = self
            .tree
            .index_of(parent, child)
            .ok_or(LayoutError::NotAChild { parent, child })?;

        if let Some(axis) = self.tree.node(parent)?.axis() {
            let removed = self.tree.node(child)?.size_along(axis).unwrap_or(0.0);
            let siblings: Vec<ItemId> = self
                .children_of(parent)
                .iter()
                .copied()
                .filter(|&c| c != child)
                .collect();
            if !siblings.is_empty() {
                let bonus = removed / siblings.len() as f64;
                for sibling in siblings {
                    if let Some(node) = self.tree.get_mut(sibling)
                        && let Some(size) = node.size_along(axis)
                    {
                        node.set_size_along(axis, size + bonus);
                    }
                }
            }
        }

        if !keep_alive {
            self.destroy_item(child);
        }
        self.tree.detach(parent, child)?;
        if !keep_alive {
            self.tree.remove_subtree(child);
        }
        debug!(
            target: "lattice.tree",
            parent = parent.get(),
            item = child.get(),
            keep_alive,
            "child removed"
        );

        if self.tree.node(parent)?.is_stack() {
            self.stack_child_removed(parent, index);
        }

        let (remaining, closable, grandparent, is_row_or_column, is_ground) = {
            let node = self.tree.node(parent)?;
            (
                node.children().len(),
                node.is_closable,
                node.parent(),
                node.is_row_or_column(),
                node.is_ground(),
            )
        };

        if remaining == 0 && !is_ground && closable {
            if let Some(grandparent) = grandparent {
                return self.detach_child(grandparent, parent, false);
            }
        } else if remaining == 1
            && is_row_or_column
            && closable
            && let Some(grandparent) = grandparent
            && self.collapse_allowed(grandparent, self.children_of(parent)[0])
        {
            let only = self.children_of(parent)[0];
            self.tree.detach(parent, only)?;
            return self.replace_child(grandparent, parent, only, true);
        }

        self.emit(parent, LayoutEvent::StateChanged(parent));
        self.arrange();
        Ok(())
    }

    /// A lone child can take its container's place unless that would put
    /// a stack directly inside a stack.
    fn collapse_allowed(&self, grandparent: ItemId, only: ItemId) -> bool {
        let grandparent_is_stack = self.tree.get(grandparent).is_some_and(Node::is_stack);
        let only_is_stack = self.tree.get(only).is_some_and(Node::is_stack);
        !(grandparent_is_stack && only_is_stack)
    }

    fn stack_child_removed(&mut self, stack: ItemId, index: usize) {
        let Some(node) = self.tree.get_mut(stack) else {
            return;
        };
        let children = node.children.clone();
        let Some(s) = node.as_stack_mut() else {
            return;
        };
        let destroyed_tab = (index < s.tabs.len()).then(|| s.tabs.remove(index).handle);
        let mut new_active = None;
        s.active_index = match s.active_index {
            _ if children.is_empty() => None,
            Some(active) if active == index => {
                let next = index.saturating_sub(1).min(children.len() - 1);
                new_active = children.get(next).copied();
                Some(next)
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        if let Some(handle) = destroyed_tab {
            self.header.destroy_tab(handle);
        }
        if let Some(item) = new_active {
            self.sync_active_tab(stack, item);
            self.emit(stack, LayoutEvent::ActiveContentItemChanged { stack, item });
        }
    }

    // ── Replacement ────────────────────────────────────────────────────

    /// Put detached `new` where `old` sits. `new` inherits `old`'s relative
    /// size. `old` is destroyed when `destroy_old`, otherwise left detached.
    pub fn replace_child(
        &mut self,
        parent: ItemId,
        old: ItemId,
        new: ItemId,
        destroy_old: bool,
    ) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        let (old_width, old_height) = {
            let node = self.tree.node(old)?;
            (node.width, node.height)
        };
        let (new_width, new_height) = {
            let node = self.tree.node(new)?;
            (node.width, node.height)
        };
        let index = self.tree.swap_child(parent, old, new)?;
        if let Some(node) = self.tree.get_mut(new) {
            node.width = old_width.or(new_width);
            node.height = old_height.or(new_height);
        }

        if self.is_live(parent)
            && !self.tree.node(new)?.initialised
            && let Err(e) = self.init_subtree(new)
        {
            self.release_subtree(new);
            self.tree.swap_child(parent, new, old)?;
            if let Some(node) = self.tree.get_mut(new) {
                node.width = new_width;
                node.height = new_height;
            }
            return Err(e);
        }

        if let Some(stack) = self.tree.get_mut(parent).and_then(Node::as_stack_mut) {
            let old_tab = (index < stack.tabs.len()).then(|| stack.tabs.remove(index).handle);
            if let Some(handle) = old_tab {
                self.header.destroy_tab(handle);
            }
            if self.is_live(parent) {
                self.create_tab(parent, new, index)?;
            }
            if let Some(stack) = self.tree.get_mut(parent).and_then(Node::as_stack_mut) {
                stack.active_index = Some(index);
            }
            self.sync_active_tab(parent, new);
        }

        if destroy_old {
            self.destroy_detached(old);
        }
        debug!(
            target: "lattice.tree",
            parent = parent.get(),
            old = old.get(),
            new = new.get(),
            "child replaced"
        );
        self.emit(parent, LayoutEvent::StateChanged(parent));
        self.arrange();
        Ok(())
    }

    // ── Stack state ────────────────────────────────────────────────────

    /// Make `item` the visible child of `stack`.
    pub fn set_active_content_item(
        &mut self,
        stack: ItemId,
        item: ItemId,
    ) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        let index = self
            .tree
            .index_of(stack, item)
            .ok_or(LayoutError::NotAChild {
                parent: stack,
                child: item,
            })?;
        let node = self.tree.node_mut(stack)?;
        let item_type = node.item_type();
        let Some(s) = node.as_stack_mut() else {
            return Err(LayoutError::InvalidChildType {
                parent: item_type,
                child: ItemType::Component,
            });
        };
        if s.active_index == Some(index) {
            return Ok(());
        }
        s.active_index = Some(index);
        self.sync_active_tab(stack, item);
        self.emit(stack, LayoutEvent::ActiveContentItemChanged { stack, item });
        self.emit(stack, LayoutEvent::StateChanged(stack));
        self.arrange();
        Ok(())
    }

    /// A stack can be closed only if it and every child are closable.
    #[must_use]
    pub fn is_effectively_closable(&self, item: ItemId) -> bool {
        let Some(node) = self.tree.get(item) else {
            return false;
        };
        node.is_closable
            && (!node.is_stack()
                || node
                    .children()
                    .iter()
                    .all(|&c| self.tree.get(c).is_some_and(Node::is_closable)))
    }

    /// A tab may be dragged out unless it is the last tab of a stack that
    /// cannot be closed.
    #[must_use]
    pub fn can_drag_out(&self, component: ItemId) -> bool {
        let Some(stack) = self.parent_of(component) else {
            return false;
        };
        self.is_effectively_closable(stack) || self.children_of(stack).len() > 1
    }

    /// Close button on a tab. Returns whether the component was removed.
    pub fn tab_close_requested(&mut self, component: ItemId) -> Result<bool, LayoutError> {
        let node = self.tree.node(component)?;
        if !node.is_closable {
            return Ok(false);
        }
        self.remove_item(component)?;
        Ok(true)
    }

    // ── Selection and maximise ─────────────────────────────────────────

    /// Select an item, or clear the selection with `None`.
    pub fn select_item(&mut self, item: Option<ItemId>) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        if !self.settings.selection_enabled {
            return Err(LayoutError::SelectionDisabled);
        }
        if let Some(item) = item {
            self.tree.node(item)?;
        }
        if self.selected != item {
            self.selected = item;
            self.events.queue(LayoutEvent::SelectionChanged(item));
        }
        Ok(())
    }

    /// Fill the container with `item`, or restore it if already maximised.
    pub fn toggle_maximise(&mut self, item: ItemId) -> Result<(), LayoutError> {
        self.ensure_initialised()?;
        if !self.is_attached(item) || item == self.ground {
            return Err(LayoutError::UnknownItem(item));
        }
        if let Some(current) = self.maximised.take() {
            self.emit(current, LayoutEvent::ItemMinimised(current));
            if current == item {
                self.emit(item, LayoutEvent::StateChanged(item));
                self.arrange();
                return Ok(());
            }
        }
        self.maximised = Some(item);
        self.emit(item, LayoutEvent::ItemMaximised(item));
        self.emit(item, LayoutEvent::StateChanged(item));
        self.arrange();
        Ok(())
    }

    /// Run destructions that were requested while a drag was active.
    pub(crate) fn process_deferred(&mut self) {
        for item in std::mem::take(&mut self.deferred_destroy) {
            if !self.tree.contains(item) {
                continue;
            }
            let result = match self.parent_of(item) {
                Some(parent) => self.detach_child(parent, item, false),
                None => {
                    self.destroy_detached(item);
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!(target: "lattice.tree", item = item.get(), error = %e, "deferred destroy failed");
            }
        }
        if self.destroy_pending {
            self.destroy_pending = false;
            if let Err(e) = self.destroy() {
                warn!(target: "lattice.tree", error = %e, "deferred layout destroy failed");
            }
        }
    }
}
