#![forbid(unsafe_code)]

//! Moving subtrees into separate windows and back.

use tracing::{debug, warn};

use crate::areas::{DropTarget, Side};
use crate::config::ItemConfig;
use crate::error::LayoutError;
use crate::event::LayoutEvent;
use crate::host::{PopoutBlocked, PopoutHandle, PopoutRequest};
use crate::item::{ItemId, ItemType, Node};
use crate::layout::Layout;

/// Bookkeeping for one open popout window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPopout {
    pub handle: PopoutHandle,
    /// Config id of the item the content came from.
    pub parent_id: String,
    pub index_in_parent: usize,
}

impl Layout {
    #[must_use]
    pub fn open_popouts(&self) -> &[OpenPopout] {
        &self.open_popouts
    }

    /// Move `item` into a new window.
    ///
    /// Returns `Ok(None)` when the window was blocked and
    /// `blockedPopoutsThrowError` is off.
    pub fn create_popout(&mut self, item: ItemId) -> Result<Option<PopoutHandle>, LayoutError> {
        self.ensure_initialised()?;
        let node = self.tree.node(item)?;
        let item = match node.parent() {
            Some(stack)
                if self.settings.popout_whole_stack
                    && node.is_component()
                    && self.tree.get(stack).is_some_and(Node::is_stack) =>
            {
                stack
            }
            _ => item,
        };
        let parent = self
            .parent_of(item)
            .filter(|_| self.is_attached(item))
            .ok_or(LayoutError::UnknownItem(item))?;
        let index_in_parent = self.tree.index_of(parent, item).unwrap_or(0);
        let parent_id = self.ensure_config_id(parent)?;
        let content = self.item_to_config(item).into_iter().collect();
        let rect = self.tree.node(item)?.element().rect;

        let request = PopoutRequest {
            content,
            rect,
            parent_id: parent_id.clone(),
            index_in_parent,
        };
        match self.popouts.open(request) {
            Ok(handle) => {
                debug!(
                    target: "lattice.popout",
                    item = item.get(),
                    parent_id = %parent_id,
                    index_in_parent,
                    "popout opened"
                );
                self.open_popouts.push(OpenPopout {
                    handle,
                    parent_id,
                    index_in_parent,
                });
                self.remove_child(parent, item, false)?;
                Ok(Some(handle))
            }
            Err(PopoutBlocked) if self.settings.blocked_popouts_throw_error => {
                Err(LayoutError::PopoutBlocked)
            }
            Err(PopoutBlocked) => {
                warn!(target: "lattice.popout", item = item.get(), "popout blocked");
                Ok(None)
            }
        }
    }

    /// Config id of `item`, generating one when it has none.
    fn ensure_config_id(&mut self, item: ItemId) -> Result<String, LayoutError> {
        if let Some(id) = self.tree.node(item)?.config_id() {
            return Ok(id.to_owned());
        }
        self.next_popout_parent += 1;
        let id = format!("lattice-popout-parent-{}", self.next_popout_parent);
        self.tree.node_mut(item)?.config_id = Some(id.clone());
        Ok(id)
    }

    /// The popout window finished loading.
    pub fn popout_ready(&mut self, handle: PopoutHandle) {
        if self.open_popouts.iter().any(|p| p.handle == handle) {
            self.events.queue(LayoutEvent::WindowOpened(handle));
        }
    }

    /// The popout window closed and hands its content back.
    ///
    /// Content goes to the recorded parent at the recorded index, or to
    /// the root item when that parent no longer exists.
    pub fn popout_returned(
        &mut self,
        handle: PopoutHandle,
        content: &[ItemConfig],
    ) -> Result<(), LayoutError> {
        self.ensure_initialised()?;
        let Some(position) = self.open_popouts.iter().position(|p| p.handle == handle) else {
            return Ok(());
        };
        let popout = self.open_popouts.remove(position);
        let recorded = self.items_by_id(&popout.parent_id).first().copied();
        let (parent, mut index) = match recorded {
            Some(parent) => (parent, Some(popout.index_in_parent)),
            None => (self.root_item().unwrap_or(self.ground), None),
        };
        // Only components can land inside a stack; anything else goes
        // beside it in the stack's parent.
        if self.tree.get(parent).is_some_and(Node::is_stack)
            && content.iter().any(|c| c.item_type != ItemType::Component)
            && let Some(grandparent) = self.parent_of(parent)
        {
            index = self.tree.index_of(grandparent, parent).map(|i| i + 1);
            return self.popout_insert(grandparent, index, content, handle);
        }
        self.popout_insert(parent, index, content, handle)
    }

    fn popout_insert(
        &mut self,
        parent: ItemId,
        mut index: Option<usize>,
        content: &[ItemConfig],
        handle: PopoutHandle,
    ) -> Result<(), LayoutError> {
        for config in content {
            if parent == self.ground && self.root_item().is_some() {
                let item = self.build_item(config, Some(ItemType::Ground))?;
                if let Err(e) = self.on_drop(item, DropTarget::Ground { side: Some(Side::Right) }) {
                    if self.parent_of(item).is_none() {
                        self.destroy_detached(item);
                    }
                    return Err(e);
                }
                continue;
            }
            let len = self.children_of(parent).len();
            let at = index.map(|i| i.min(len));
            let item = self.add_child_config(parent, config, at)?;
            debug!(
                target: "lattice.popout",
                item = item.get(),
                parent = parent.get(),
                index = at,
                "popout content returned"
            );
            index = at.map(|i| i + 1);
        }
        self.events.queue(LayoutEvent::WindowClosed(handle));
        Ok(())
    }
}
