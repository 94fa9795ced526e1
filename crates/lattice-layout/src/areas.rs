#![forbid(unsafe_code)]

//! Drop areas and drop segments.
//!
//! While a drag is in progress the layout is covered by candidate areas:
//! four edge strips of the ground plus, for every visible stack, the whole
//! stack and its header. The smallest area under the pointer wins. Inside
//! a stack the pointer position then picks a segment (header, left, top,
//! right, bottom, or body for empty stacks).

use lattice_core::{Bounds, Rect};

use crate::item::{ItemId, Node};
use crate::layout::Layout;

/// Thickness of the ground edge strips.
pub const GROUND_EDGE: f64 = 50.0;

/// Edge of the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Left,
    Bottom,
    Right,
}

impl Side {
    /// Top and bottom stack items vertically.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Top and left insert before the existing content.
    #[must_use]
    pub const fn inserts_before(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    /// The whole ground of an empty layout.
    Ground,
    GroundSide(Side),
    Stack,
    StackHeader,
}

/// Candidate drop region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub item: ItemId,
    pub kind: AreaKind,
    pub bounds: Bounds,
}

impl Area {
    #[must_use]
    pub fn surface(&self) -> f64 {
        self.bounds.surface()
    }
}

/// Where inside a stack an item lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropSegment {
    /// Into the tab strip at a position.
    Header { index: usize },
    /// Into an empty stack.
    Body,
    Left,
    Top,
    Right,
    Bottom,
}

impl DropSegment {
    /// Side segments split the stack's parent direction.
    #[must_use]
    pub const fn is_side(self) -> bool {
        matches!(self, Self::Left | Self::Top | Self::Right | Self::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Ground { side: Option<Side> },
    Stack { stack: ItemId, segment: DropSegment },
}

/// Resolved target plus the rectangle to highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropIndicator {
    pub target: DropTarget,
    pub highlight: Rect,
}

/// Smallest area strictly containing the point. Ties keep the first.
#[must_use]
pub fn get_area(areas: &[Area], x: f64, y: f64) -> Option<&Area> {
    let mut best: Option<&Area> = None;
    for area in areas {
        if area.bounds.contains(x, y) && best.is_none_or(|b| area.surface() < b.surface()) {
            best = Some(area);
        }
    }
    best
}

/// Insertion index for a header drop: the number of tabs whose midpoint
/// lies at or left of `x`.
#[must_use]
pub fn header_drop_index(tabs: &[Rect], x: f64) -> usize {
    tabs.iter()
        .filter(|tab| f64::from(tab.x) + f64::from(tab.width) / 2.0 <= x)
        .count()
}

struct Segment {
    segment: DropSegment,
    hover: Bounds,
    highlight: Bounds,
}

/// Hover and highlight regions of a stack, in matching order.
fn stack_segments(node: &Node, has_headers: bool) -> Vec<Segment> {
    let Some(stack) = node.as_stack() else {
        return Vec::new();
    };
    let mut segments = Vec::with_capacity(5);
    if has_headers && !stack.header.is_empty() {
        let header = stack.header.bounds();
        segments.push(Segment {
            segment: DropSegment::Header { index: 0 },
            hover: header,
            highlight: header,
        });
    }
    let content = stack.content.bounds();
    if node.children().is_empty() {
        segments.push(Segment {
            segment: DropSegment::Body,
            hover: content,
            highlight: content,
        });
        return segments;
    }
    let (x1, y1, x2, y2) = (content.x1, content.y1, content.x2, content.y2);
    let w = content.width();
    let h = content.height();
    segments.push(Segment {
        segment: DropSegment::Left,
        hover: Bounds::new(x1, y1, x1 + w * 0.25, y2),
        highlight: Bounds::new(x1, y1, x1 + w * 0.5, y2),
    });
    segments.push(Segment {
        segment: DropSegment::Top,
        hover: Bounds::new(x1 + w * 0.25, y1, x1 + w * 0.75, y1 + h * 0.5),
        highlight: Bounds::new(x1, y1, x2, y1 + h * 0.5),
    });
    segments.push(Segment {
        segment: DropSegment::Right,
        hover: Bounds::new(x1 + w * 0.75, y1, x2, y2),
        highlight: Bounds::new(x1 + w * 0.5, y1, x2, y2),
    });
    segments.push(Segment {
        segment: DropSegment::Bottom,
        hover: Bounds::new(x1 + w * 0.25, y1 + h * 0.5, x1 + w * 0.75, y2),
        highlight: Bounds::new(x1, y1 + h * 0.5, x2, y2),
    });
    segments
}

impl Layout {
    /// Candidate areas for the current tree.
    #[must_use]
    pub fn calculate_item_areas(&self) -> Vec<Area> {
        let Some(ground) = self.tree.get(self.ground) else {
            return Vec::new();
        };
        let whole = ground.element().rect.bounds();
        let items = self.all_items();
        if items.is_empty() {
            return vec![Area {
                item: self.ground,
                kind: AreaKind::Ground,
                bounds: whole,
            }];
        }

        let mut areas = vec![
            Area {
                item: self.ground,
                kind: AreaKind::GroundSide(Side::Top),
                bounds: Bounds::new(whole.x1, whole.y1, whole.x2, whole.y1 + GROUND_EDGE),
            },
            Area {
                item: self.ground,
                kind: AreaKind::GroundSide(Side::Left),
                bounds: Bounds::new(whole.x1, whole.y1, whole.x1 + GROUND_EDGE, whole.y2),
            },
            Area {
                item: self.ground,
                kind: AreaKind::GroundSide(Side::Bottom),
                bounds: Bounds::new(whole.x1, whole.y2 - GROUND_EDGE, whole.x2, whole.y2),
            },
            Area {
                item: self.ground,
                kind: AreaKind::GroundSide(Side::Right),
                bounds: Bounds::new(whole.x2 - GROUND_EDGE, whole.y1, whole.x2, whole.y2),
            },
        ];

        for id in items {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let Some(stack) = node.as_stack() else {
                continue;
            };
            if !node.element().visible {
                continue;
            }
            let header = stack.header.bounds();
            areas.push(Area {
                item: id,
                kind: AreaKind::Stack,
                bounds: node.element().rect.bounds(),
            });
            if self.settings.has_headers && !stack.header.is_empty() {
                areas.push(Area {
                    item: id,
                    kind: AreaKind::StackHeader,
                    bounds: header,
                });
            }
        }
        areas
    }

    /// Resolve the drop target inside `area` for a pointer at `(x, y)`.
    #[must_use]
    pub fn highlight_drop_zone(&self, area: &Area, x: f64, y: f64) -> Option<DropIndicator> {
        match area.kind {
            AreaKind::Ground => Some(DropIndicator {
                target: DropTarget::Ground { side: None },
                highlight: area.bounds.to_rect(),
            }),
            AreaKind::GroundSide(side) => Some(DropIndicator {
                target: DropTarget::Ground { side: Some(side) },
                highlight: area.bounds.to_rect(),
            }),
            AreaKind::Stack | AreaKind::StackHeader => {
                let node = self.tree.get(area.item)?;
                let segments = stack_segments(node, self.settings.has_headers);
                let hit = segments.iter().find(|s| s.hover.contains(x, y))?;
                let segment = match hit.segment {
                    DropSegment::Header { .. } => {
                        let tabs: Vec<Rect> = node
                            .as_stack()
                            .map(|s| s.tabs.iter().map(|t| t.rect).collect())
                            .unwrap_or_default();
                        DropSegment::Header {
                            index: header_drop_index(&tabs, x),
                        }
                    }
                    other => other,
                };
                Some(DropIndicator {
                    target: DropTarget::Stack {
                        stack: area.item,
                        segment,
                    },
                    highlight: hit.highlight.to_rect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(item: u64, kind: AreaKind, b: (f64, f64, f64, f64)) -> Area {
        let mut id = ItemId::MIN;
        for _ in 1..item {
            id = id.next();
        }
        Area {
            item: id,
            kind,
            bounds: Bounds::new(b.0, b.1, b.2, b.3),
        }
    }

    #[test]
    fn smallest_area_wins() {
        let areas = [
            area(1, AreaKind::Stack, (0.0, 0.0, 100.0, 100.0)),
            area(1, AreaKind::StackHeader, (0.0, 0.0, 100.0, 20.0)),
        ];
        let hit = get_area(&areas, 50.0, 10.0).expect("hit");
        assert_eq!(hit.kind, AreaKind::StackHeader);
    }

    #[test]
    fn ties_keep_first() {
        let areas = [
            area(1, AreaKind::GroundSide(Side::Top), (0.0, 0.0, 50.0, 50.0)),
            area(1, AreaKind::GroundSide(Side::Left), (0.0, 0.0, 50.0, 50.0)),
        ];
        let hit = get_area(&areas, 25.0, 25.0).expect("hit");
        assert_eq!(hit.kind, AreaKind::GroundSide(Side::Top));
    }

    #[test]
    fn border_points_miss() {
        let areas = [area(1, AreaKind::Stack, (0.0, 0.0, 100.0, 100.0))];
        assert!(get_area(&areas, 0.0, 50.0).is_none());
        assert!(get_area(&areas, 100.0, 50.0).is_none());
        assert!(get_area(&areas, 50.0, 50.0).is_some());
    }

    #[test]
    fn header_index_from_tab_midpoints() {
        let tabs = [
            Rect::new(0, 0, 100, 20),
            Rect::new(100, 0, 100, 20),
            Rect::new(200, 0, 100, 20),
        ];
        assert_eq!(header_drop_index(&tabs, 10.0), 0);
        assert_eq!(header_drop_index(&tabs, 60.0), 1);
        assert_eq!(header_drop_index(&tabs, 149.0), 1);
        assert_eq!(header_drop_index(&tabs, 150.0), 2);
        assert_eq!(header_drop_index(&tabs, 290.0), 3);
        assert_eq!(header_drop_index(&tabs, 900.0), 3);
        assert_eq!(header_drop_index(&[], 5.0), 0);
    }

    #[test]
    fn sides_map_to_direction() {
        assert!(Side::Top.is_vertical());
        assert!(Side::Top.inserts_before());
        assert!(!Side::Right.is_vertical());
        assert!(!Side::Right.inserts_before());
    }
}
