#![forbid(unsafe_code)]

//! Splitter drags between adjacent row/column children.
//!
//! Only the splitter's visual offset moves while dragging. The relative
//! sizes of the two neighbours are rewritten once on release, keeping
//! their combined share constant.

use lattice_core::Rect;
use tracing::debug;

use crate::error::LayoutError;
use crate::event::LayoutEvent;
use crate::item::{Axis, ItemId, NodeKind};
use crate::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterDrag {
    pub row: ItemId,
    /// Splitter between children `index` and `index + 1`.
    pub index: usize,
    pub axis: Axis,
    /// Current offset from the resting position, in pixels.
    pub offset: i32,
    pub min_offset: i32,
    pub max_offset: i32,
    before_size: u32,
    after_size: u32,
}

impl Layout {
    /// Splitter rectangles of a row or column after the last layout.
    #[must_use]
    pub fn splitter_rects(&self, row: ItemId) -> &[Rect] {
        match self.tree.get(row).map(|n| n.kind()) {
            Some(NodeKind::RowOrColumn(rc)) => rc.splitters.as_slice(),
            _ => &[],
        }
    }

    /// Active splitter drag, for rendering the moving splitter.
    #[must_use]
    pub const fn splitter_drag(&self) -> Option<&SplitterDrag> {
        self.splitter_drag.as_ref()
    }

    /// Largest minimum size along `axis` required anywhere in the subtree,
    /// never below the configured floor.
    fn min_extent(&self, item: ItemId, axis: Axis) -> u32 {
        let floor = match axis {
            Axis::Horizontal => self.dimensions.min_item_width,
            Axis::Vertical => self.dimensions.min_item_height,
        };
        self.tree
            .descendants(item)
            .into_iter()
            .filter_map(|id| self.tree.get(id).and_then(|n| n.min_size_along(axis)))
            .fold(floor, u32::max)
    }

    pub(crate) fn splitter_drag_start(&mut self, row: ItemId, index: usize) -> Result<(), LayoutError> {
        let node = self.tree.node(row)?;
        let missing = LayoutError::NoSuchSplitter { row, index };
        let axis = node.axis().ok_or_else(|| missing.clone())?;
        let (Some(&before), Some(&after)) =
            (node.children().get(index), node.children().get(index + 1))
        else {
            return Err(missing);
        };
        let horizontal = axis.is_horizontal();
        let before_size = self.tree.node(before)?.element().rect.extent(horizontal);
        let after_size = self.tree.node(after)?.element().rect.extent(horizontal);
        let before_min = self.min_extent(before, axis);
        let after_min = self.min_extent(after, axis);
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        let min_offset = (to_i32(before_min) - to_i32(before_size)).min(0);
        let max_offset = (to_i32(after_size) - to_i32(after_min)).max(0);
        debug!(
            target: "lattice.splitter",
            row = row.get(),
            index,
            min_offset,
            max_offset,
            "splitter drag started"
        );
        self.splitter_drag = Some(SplitterDrag {
            row,
            index,
            axis,
            offset: 0,
            min_offset,
            max_offset,
            before_size,
            after_size,
        });
        Ok(())
    }

    pub(crate) fn splitter_dragged(&mut self, delta_x: i32, delta_y: i32) {
        if let Some(drag) = self.splitter_drag.as_mut() {
            let delta = if drag.axis.is_horizontal() { delta_x } else { delta_y };
            drag.offset = delta.clamp(drag.min_offset, drag.max_offset);
        }
    }

    pub(crate) fn splitter_drag_stop(&mut self) -> Result<(), LayoutError> {
        let Some(drag) = self.splitter_drag.take() else {
            return Ok(());
        };
        let children = self.children_of(drag.row);
        let (Some(&before), Some(&after)) = (children.get(drag.index), children.get(drag.index + 1))
        else {
            return Ok(());
        };
        let total_px = f64::from(drag.before_size) + f64::from(drag.after_size);
        if total_px <= 0.0 {
            return Ok(());
        }
        let position = (f64::from(drag.offset) + f64::from(drag.before_size)) / total_px;
        let before_rel = self.tree.node(before)?.size_along(drag.axis).unwrap_or(0.0);
        let after_rel = self.tree.node(after)?.size_along(drag.axis).unwrap_or(0.0);
        let total_rel = before_rel + after_rel;
        self.tree
            .node_mut(before)?
            .set_size_along(drag.axis, position * total_rel);
        self.tree
            .node_mut(after)?
            .set_size_along(drag.axis, (1.0 - position) * total_rel);
        debug!(
            target: "lattice.splitter",
            row = drag.row.get(),
            index = drag.index,
            offset = drag.offset,
            position,
            "splitter released"
        );
        self.frame.request();
        self.emit(drag.row, LayoutEvent::StateChanged(drag.row));
        Ok(())
    }
}
