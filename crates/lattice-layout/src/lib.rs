#![forbid(unsafe_code)]

//! Docking layout manager.
//!
//! A [`Layout`] owns a tree of content items: one ground, rows and columns
//! that split space proportionally, stacks that show one of several tabbed
//! children, and component leaves whose panels the host renders. The
//! layout handles sizing, tab and splitter drags, drop zones and
//! persistence; the host supplies rendering through [`ComponentHost`],
//! [`HeaderRenderer`] and [`PopoutManager`].
//!
//! # Example
//!
//! ```ignore
//! let config = LayoutConfig::from_json_str(json)?;
//! let mut layout = Layout::new(config, my_host).with_header(my_tabs);
//! layout.init(Rect::from_size(1280, 800))?;
//! let commands = layout.pointer(Some(PointerTarget::Tab(id)), &event, Instant::now())?;
//! ```

pub mod areas;
mod arrange;
pub mod config;
mod drag_proxy;
mod drop;
pub mod error;
pub mod event;
pub mod host;
mod input;
pub mod item;
mod layout;
mod mutate;
mod popout;
pub mod sizing;
mod splitter;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_support;

pub use areas::{Area, AreaKind, DropIndicator, DropSegment, DropTarget, Side, get_area};
pub use config::{ConfigError, Dimensions, DragSettings, ItemConfig, LayoutConfig, Settings};
pub use drag_proxy::DragProxy;
pub use error::LayoutError;
pub use event::{BubblingEvent, LayoutEvent, ListenerId};
pub use host::{
    ComponentHost, ComponentHostError, ComponentRequest, HeaderRenderer, NullHeader, NullPopouts,
    PanelHandle, PopoutBlocked, PopoutHandle, PopoutManager, PopoutRequest, TabHandle,
};
pub use input::{DragSourceId, PointerTarget};
pub use item::{Axis, Component, ElementBox, ItemId, ItemType, Node, NodeKind, RowOrColumn, Stack, Tab};
pub use layout::{Layout, RESIZE_DEBOUNCE};
pub use popout::OpenPopout;
pub use splitter::SplitterDrag;
pub use tree::ContentTree;

pub use lattice_core::{
    Bounds, DragListenerConfig, HostCommand, Instant, Point, PointerButton, PointerEvent,
    PointerKind, PointerPhase, Rect,
};
