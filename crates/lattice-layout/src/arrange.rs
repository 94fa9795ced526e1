#![forbid(unsafe_code)]

//! The layout pass: assigns every item a rectangle and visibility, and
//! tells the host about panels that appeared, disappeared or resized.

use lattice_core::Rect;
use tracing::trace;

use crate::item::{Axis, ElementBox, ItemId, NodeKind};
use crate::layout::Layout;
use crate::sizing::{
    available_extent, calculate_absolute_sizes, calculate_relative_sizes, respect_min_item_width,
};

fn offset(base: i32, delta: u32) -> i32 {
    base.saturating_add(i32::try_from(delta).unwrap_or(i32::MAX))
}

impl Layout {
    /// Lay out the whole tree, plus the dragged item if a drag is active.
    pub(crate) fn arrange(&mut self) {
        if !self.initialised || self.destroyed {
            return;
        }
        let container = self.container;
        let maximised = self.maximised.filter(|&m| self.is_attached(m));
        self.arrange_item(self.ground, container, true, maximised);
        if let Some(item) = maximised {
            self.arrange_item(item, container, true, None);
        }
        if let Some((item, rect)) = self.drag.as_ref().map(|d| (d.item, d.content_rect())) {
            self.arrange_item(item, rect, true, None);
        }
    }

    /// Lay out one subtree. `skip` is left untouched (the maximised item
    /// gets its own pass); everything else under a maximised layout is
    /// hidden.
    pub(crate) fn arrange_item(
        &mut self,
        id: ItemId,
        rect: Rect,
        visible: bool,
        skip: Option<ItemId>,
    ) {
        if skip == Some(id) {
            return;
        }
        let Some(node) = self.tree.get_mut(id) else {
            return;
        };
        let previous = node.element;
        let current = ElementBox { rect, visible };
        node.element = current;
        let children = node.children.clone();
        let axis = node.axis();
        let is_stack = node.is_stack();
        let is_component = node.is_component();

        if let Some(axis) = axis {
            self.arrange_row_or_column(id, axis, &children, rect, visible, skip);
        } else if is_stack {
            self.arrange_stack(id, &children, rect, visible, skip);
        } else if is_component {
            self.apply_component_box(id, previous, current);
        } else {
            // Ground: hidden under a maximised item.
            let visible = visible && skip.is_none();
            for child in children {
                self.arrange_item(child, rect, visible, skip);
            }
        }
    }

    fn arrange_row_or_column(
        &mut self,
        id: ItemId,
        axis: Axis,
        children: &[ItemId],
        rect: Rect,
        visible: bool,
        skip: Option<ItemId>,
    ) {
        let horizontal = axis.is_horizontal();
        if children.is_empty() {
            if let Some(NodeKind::RowOrColumn(rc)) = self.tree.get_mut(id).map(|n| &mut n.kind) {
                rc.splitters.clear();
            }
            return;
        }

        let mut sizes: Vec<Option<f64>> = children
            .iter()
            .map(|&c| self.tree.get(c).and_then(|n| n.size_along(axis)))
            .collect();
        let mut shares = calculate_relative_sizes(&mut sizes);
        let extent = rect.extent(horizontal);
        let border = self.dimensions.border_width;
        if horizontal {
            let available = available_extent(extent, children.len(), border);
            respect_min_item_width(&mut shares, available, self.dimensions.min_item_width);
        }
        for (&child, &share) in children.iter().zip(&shares) {
            if let Some(node) = self.tree.get_mut(child) {
                node.set_size_along(axis, share);
            }
        }

        let absolute = calculate_absolute_sizes(&shares, extent, border);
        trace!(
            target: "lattice.sizing",
            item = id.get(),
            extent,
            available = absolute.available,
            additional_pixel = absolute.additional_pixel,
            "row/column sized"
        );

        let mut cursor = 0_u32;
        let mut splitters = Vec::with_capacity(children.len().saturating_sub(1));
        for (index, (&child, &size)) in children.iter().zip(&absolute.item_sizes).enumerate() {
            let child_rect = if horizontal {
                Rect::new(offset(rect.x, cursor), rect.y, size, rect.height)
            } else {
                Rect::new(rect.x, offset(rect.y, cursor), rect.width, size)
            };
            self.arrange_item(child, child_rect, visible, skip);
            cursor = cursor.saturating_add(size);
            if index + 1 < children.len() {
                splitters.push(if horizontal {
                    Rect::new(offset(rect.x, cursor), rect.y, border, rect.height)
                } else {
                    Rect::new(rect.x, offset(rect.y, cursor), rect.width, border)
                });
                cursor = cursor.saturating_add(border);
            }
        }
        if let Some(NodeKind::RowOrColumn(rc)) = self.tree.get_mut(id).map(|n| &mut n.kind) {
            rc.splitters = splitters;
        }
    }

    fn arrange_stack(
        &mut self,
        id: ItemId,
        children: &[ItemId],
        rect: Rect,
        visible: bool,
        skip: Option<ItemId>,
    ) {
        let header_height = if self.settings.has_headers {
            self.dimensions.header_height.min(rect.height)
        } else {
            0
        };
        let header = Rect::new(rect.x, rect.y, rect.width, header_height);
        let content = Rect::new(
            rect.x,
            offset(rect.y, header_height),
            rect.width,
            rect.height - header_height,
        );

        let titles: Vec<String> = children
            .iter()
            .map(|&c| self.tree.get(c).map(|n| n.title().to_owned()).unwrap_or_default())
            .collect();
        let extents: Vec<u32> = titles.iter().map(|t| self.header.tab_extent(t)).collect();

        let active = match self.tree.get_mut(id).and_then(|n| n.as_stack_mut()) {
            Some(stack) => {
                stack.header = header;
                stack.content = content;
                let mut x = header.x;
                for (tab, &width) in stack.tabs.iter_mut().zip(&extents) {
                    tab.rect = Rect::new(x, header.y, width, header_height);
                    x = offset(x, width);
                }
                stack.active_index
            }
            None => None,
        };

        for (index, &child) in children.iter().enumerate() {
            self.arrange_item(child, content, visible && active == Some(index), skip);
        }
    }

    fn apply_component_box(&mut self, id: ItemId, previous: ElementBox, current: ElementBox) {
        let Some(panel) = self
            .tree
            .get(id)
            .and_then(|n| n.as_component())
            .and_then(|c| c.panel)
        else {
            return;
        };
        match (previous.visible, current.visible) {
            (false, true) => self.host.show(panel),
            (true, false) => self.host.hide(panel),
            _ => {}
        }
        if current.visible && (!previous.visible || previous.rect != current.rect) {
            self.host.resize(panel, current.rect);
        }
    }
}
