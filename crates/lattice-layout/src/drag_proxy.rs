#![forbid(unsafe_code)]

//! The floating stand-in for an item being dragged.
//!
//! Starting a drag detaches the item from its parent (without destroying
//! it) and remembers where it came from. Moves resolve a drop target from
//! the areas computed at drag start; the drop either performs the tree
//! surgery for that target or puts the item back.

use lattice_core::{Point, Rect};
use tracing::{debug, warn};

use crate::areas::{Area, DropIndicator, DropTarget, Side, get_area};
use crate::error::LayoutError;
use crate::event::LayoutEvent;
use crate::item::ItemId;
use crate::layout::Layout;

#[derive(Debug, Clone, PartialEq)]
pub struct DragProxy {
    pub(crate) item: ItemId,
    original_parent: Option<ItemId>,
    original_index: Option<usize>,
    rect: Rect,
    header_height: u32,
    areas: Vec<Area>,
    current: Option<DropIndicator>,
    last_valid: Option<DropIndicator>,
}

impl DragProxy {
    /// Item being dragged.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// Proxy element rectangle; its top-left follows the pointer.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Where the dragged item's body is laid out inside the proxy.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        let header = self.header_height.min(self.rect.height);
        Rect::new(
            self.rect.x,
            self.rect.y.saturating_add(i32::try_from(header).unwrap_or(i32::MAX)),
            self.rect.width,
            self.rect.height - header,
        )
    }

    #[must_use]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Target under the pointer right now.
    #[must_use]
    pub const fn current(&self) -> Option<DropIndicator> {
        self.current
    }

    /// Target a drop outside any area falls back to.
    #[must_use]
    pub const fn last_valid(&self) -> Option<DropIndicator> {
        self.last_valid
    }

    #[must_use]
    pub const fn original_parent(&self) -> Option<ItemId> {
        self.original_parent
    }
}

impl Layout {
    /// Active drag proxy, for rendering.
    #[must_use]
    pub fn drag_proxy(&self) -> Option<&DragProxy> {
        self.drag.as_ref()
    }

    /// Highlight rectangle of the current drop target.
    #[must_use]
    pub fn drop_indicator(&self) -> Option<DropIndicator> {
        self.drag.as_ref().and_then(|d| d.current)
    }

    /// Detach `item` and follow the pointer with it.
    pub(crate) fn start_drag_proxy(&mut self, item: ItemId, origin: Point) -> Result<(), LayoutError> {
        let original_parent = self.parent_of(item);
        let original_index = original_parent.and_then(|p| self.tree.index_of(p, item));
        if let Some(parent) = original_parent {
            self.detach_child(parent, item, true)?;
        }
        let header_height = if self.settings.has_headers {
            self.dimensions.header_height
        } else {
            0
        };
        let areas = self.calculate_item_areas();
        debug!(
            target: "lattice.drag",
            item = item.get(),
            parent = original_parent.map(ItemId::get),
            index = original_index,
            areas = areas.len(),
            "drag proxy started"
        );
        self.drag = Some(DragProxy {
            item,
            original_parent,
            original_index,
            rect: Rect::new(
                origin.x,
                origin.y,
                self.dimensions.drag_proxy_width,
                self.dimensions.drag_proxy_height,
            ),
            header_height,
            areas,
            current: None,
            last_valid: None,
        });
        self.set_drop_position(origin);
        Ok(())
    }

    /// Pointer moved during a drag.
    pub(crate) fn drag_proxy_moved(&mut self, position: Point) {
        if self.settings.constrain_drag_to_container
            && !self.container.bounds().contains(f64::from(position.x), f64::from(position.y))
        {
            return;
        }
        self.set_drop_position(position);
    }

    fn set_drop_position(&mut self, position: Point) {
        let Some(proxy) = self.drag.as_ref() else {
            return;
        };
        let (x, y) = (f64::from(position.x), f64::from(position.y));
        let indicator = get_area(&proxy.areas, x, y)
            .copied()
            .and_then(|area| self.highlight_drop_zone(&area, x, y));
        let item = proxy.item;
        if let Some(proxy) = self.drag.as_mut() {
            proxy.rect.x = position.x;
            proxy.rect.y = position.y;
            proxy.current = indicator;
            if indicator.is_some() {
                proxy.last_valid = indicator;
            }
        }
        let content = self.drag.as_ref().map(DragProxy::content_rect);
        if let Some(content) = content {
            self.arrange_item(item, content, true, None);
        }
    }

    /// Recompute the drop areas after the tree changed under a drag.
    pub(crate) fn refresh_drag_areas(&mut self) {
        if self.drag.is_none() {
            return;
        }
        let areas = self.calculate_item_areas();
        let live_target = |indicator: Option<DropIndicator>, layout: &Self| {
            indicator.filter(|d| match d.target {
                DropTarget::Stack { stack, .. } => layout.is_attached(stack),
                DropTarget::Ground { .. } => true,
            })
        };
        let (current, last_valid) = match self.drag.as_ref() {
            Some(proxy) => (live_target(proxy.current, self), live_target(proxy.last_valid, self)),
            None => return,
        };
        debug!(target: "lattice.drag", areas = areas.len(), "drop areas refreshed");
        if let Some(proxy) = self.drag.as_mut() {
            proxy.areas = areas;
            proxy.current = current;
            proxy.last_valid = last_valid;
        }
    }

    /// Pointer released: drop the item on its target or put it back.
    pub(crate) fn drag_proxy_dropped(&mut self) -> Result<(), LayoutError> {
        let Some(proxy) = self.drag.take() else {
            return Ok(());
        };
        let item = proxy.item;
        let target = proxy.current.or(proxy.last_valid).map(|d| d.target);
        let result = match target {
            Some(target) => self.on_drop(item, target),
            None => self.return_dragged_item(&proxy),
        };
        if let Err(e) = &result {
            warn!(target: "lattice.drag", item = item.get(), error = %e, "drop failed, destroying item");
            if self.tree.contains(item) && self.parent_of(item).is_none() {
                self.destroy_detached(item);
            }
        }
        self.events.queue(LayoutEvent::ItemDropped(item));
        self.process_deferred();
        result
    }

    fn return_dragged_item(&mut self, proxy: &DragProxy) -> Result<(), LayoutError> {
        let item = proxy.item;
        match proxy.original_parent {
            Some(parent) if self.is_attached(parent) => {
                let len = self.children_of(parent).len();
                let index = proxy.original_index.map(|i| i.min(len));
                debug!(target: "lattice.drag", item = item.get(), parent = parent.get(), "drag cancelled, item returned");
                self.insert_child(parent, item, index, false).map(|_| ())
            }
            Some(parent) => {
                warn!(
                    target: "lattice.drag",
                    item = item.get(),
                    parent = parent.get(),
                    "original parent was removed during drag, dropping on ground"
                );
                let side = self.root_item().map(|_| Side::Right);
                self.on_drop(item, DropTarget::Ground { side })
            }
            None => {
                debug!(target: "lattice.drag", item = item.get(), "external drag cancelled");
                self.destroy_detached(item);
                Ok(())
            }
        }
    }
}
