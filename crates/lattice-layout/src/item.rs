#![forbid(unsafe_code)]

//! Content item nodes.

use lattice_core::Rect;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{PanelHandle, TabHandle};

/// Stable identity of a content item within one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    /// Lowest valid ID.
    pub const MIN: Self = Self(1);

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Persisted item type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Ground,
    Row,
    Column,
    Stack,
    Component,
}

/// Layout direction of a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Children side by side (a row).
    Horizontal,
    /// Children stacked top to bottom (a column).
    Vertical,
}

impl Axis {
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }
}

/// Laid-out rectangle and visibility of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementBox {
    pub rect: Rect,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrColumn {
    pub axis: Axis,
    /// Splitter rectangles, `children - 1` of them after layout.
    pub splitters: Vec<Rect>,
}

/// Header tab bound to one stack child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub item: ItemId,
    pub handle: TabHandle,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stack {
    pub active_index: Option<usize>,
    /// One tab per child once the stack is live.
    pub tabs: Vec<Tab>,
    pub header: Rect,
    pub content: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub component_type: String,
    pub state: Value,
    pub panel: Option<PanelHandle>,
}

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Ground,
    RowOrColumn(RowOrColumn),
    Stack(Stack),
    Component(Component),
}

/// One content item in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: ItemId,
    pub(crate) config_id: Option<String>,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
    pub(crate) kind: NodeKind,
    pub(crate) title: Option<String>,
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
    pub(crate) min_width: Option<u32>,
    pub(crate) min_height: Option<u32>,
    pub(crate) is_closable: bool,
    pub(crate) element: ElementBox,
    pub(crate) initialised: bool,
}

impl Node {
    pub(crate) fn new(id: ItemId, kind: NodeKind) -> Self {
        Self {
            id,
            config_id: None,
            parent: None,
            children: Vec::new(),
            kind,
            title: None,
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            is_closable: true,
            element: ElementBox::default(),
            initialised: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// User-assigned config id, if any.
    #[must_use]
    pub fn config_id(&self) -> Option<&str> {
        self.config_id.as_deref()
    }

    #[must_use]
    pub const fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        match &self.kind {
            NodeKind::Ground => ItemType::Ground,
            NodeKind::RowOrColumn(rc) => match rc.axis {
                Axis::Horizontal => ItemType::Row,
                Axis::Vertical => ItemType::Column,
            },
            NodeKind::Stack(_) => ItemType::Stack,
            NodeKind::Component(_) => ItemType::Component,
        }
    }

    /// Tab label. Components fall back to their type name.
    #[must_use]
    pub fn title(&self) -> &str {
        match (&self.title, &self.kind) {
            (Some(title), _) => title,
            (None, NodeKind::Component(c)) => &c.component_type,
            (None, _) => "",
        }
    }

    #[must_use]
    pub const fn width(&self) -> Option<f64> {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> Option<f64> {
        self.height
    }

    /// Relative size along `axis`.
    #[must_use]
    pub const fn size_along(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub(crate) fn set_size_along(&mut self, axis: Axis, size: f64) {
        match axis {
            Axis::Horizontal => self.width = Some(size),
            Axis::Vertical => self.height = Some(size),
        }
    }

    /// Configured minimum pixel size along `axis`.
    #[must_use]
    pub const fn min_size_along(&self, axis: Axis) -> Option<u32> {
        match axis {
            Axis::Horizontal => self.min_width,
            Axis::Vertical => self.min_height,
        }
    }

    #[must_use]
    pub const fn is_closable(&self) -> bool {
        self.is_closable
    }

    #[must_use]
    pub const fn element(&self) -> ElementBox {
        self.element
    }

    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    #[must_use]
    pub const fn is_ground(&self) -> bool {
        matches!(self.kind, NodeKind::Ground)
    }

    #[must_use]
    pub const fn is_stack(&self) -> bool {
        matches!(self.kind, NodeKind::Stack(_))
    }

    #[must_use]
    pub const fn is_component(&self) -> bool {
        matches!(self.kind, NodeKind::Component(_))
    }

    #[must_use]
    pub const fn is_row_or_column(&self) -> bool {
        matches!(self.kind, NodeKind::RowOrColumn(_))
    }

    /// Axis when this is a row or column.
    #[must_use]
    pub const fn axis(&self) -> Option<Axis> {
        match &self.kind {
            NodeKind::RowOrColumn(rc) => Some(rc.axis),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_stack(&self) -> Option<&Stack> {
        match &self.kind {
            NodeKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    pub(crate) fn as_stack_mut(&mut self) -> Option<&mut Stack> {
        match &mut self.kind {
            NodeKind::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_component(&self) -> Option<&Component> {
        match &self.kind {
            NodeKind::Component(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_component_mut(&mut self) -> Option<&mut Component> {
        match &mut self.kind {
            NodeKind::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Active child of a stack.
    #[must_use]
    pub fn active_child(&self) -> Option<ItemId> {
        self.as_stack()
            .and_then(|s| s.active_index)
            .and_then(|i| self.children.get(i).copied())
    }
}
