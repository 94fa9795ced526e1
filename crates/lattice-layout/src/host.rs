#![forbid(unsafe_code)]

//! Contracts for the collaborators a layout drives.
//!
//! The layout never renders anything itself. Component bodies, tab strips
//! and popout windows are owned by the host through these traits, and the
//! layout hands out opaque handles to correlate calls.

use std::fmt;

use lattice_core::Rect;
use serde_json::Value;

use crate::config::ItemConfig;
use crate::item::ItemId;

/// Host-side identity of a component panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelHandle(pub u64);

/// Host-side identity of a rendered tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabHandle(pub u64);

/// Host-side identity of an open popout window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopoutHandle(pub u64);

/// Everything a host needs to build a component panel.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRequest<'a> {
    pub item: ItemId,
    pub component_type: &'a str,
    pub state: &'a Value,
    pub title: &'a str,
}

/// Failure reported by a [`ComponentHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentHostError {
    /// No factory is registered for this component type.
    UnknownComponentType(String),
    /// The factory ran but could not build the panel.
    Failed(String),
}

impl fmt::Display for ComponentHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownComponentType(name) => {
                write!(f, "no component registered for type '{name}'")
            }
            Self::Failed(reason) => write!(f, "component creation failed: {reason}"),
        }
    }
}

impl std::error::Error for ComponentHostError {}

/// Creates and manages component panels.
///
/// Panels start hidden. `show` is called the first time a panel becomes
/// visible and `resize` whenever its visible rectangle changes.
pub trait ComponentHost {
    fn create(&mut self, request: ComponentRequest<'_>) -> Result<PanelHandle, ComponentHostError>;
    fn show(&mut self, panel: PanelHandle);
    fn hide(&mut self, panel: PanelHandle);
    fn resize(&mut self, panel: PanelHandle, rect: Rect);
    fn destroy(&mut self, panel: PanelHandle);
    /// Current persisted state. `None` keeps the state last given to `create`.
    fn state(&self, panel: PanelHandle) -> Option<Value> {
        let _ = panel;
        None
    }
}

/// Renders stack headers.
pub trait HeaderRenderer {
    fn create_tab(&mut self, stack: ItemId, component: ItemId, title: &str, index: usize)
    -> TabHandle;
    fn destroy_tab(&mut self, tab: TabHandle);
    fn set_active_tab(&mut self, stack: ItemId, tab: TabHandle);
    /// Pixel width of a tab showing `title`.
    fn tab_extent(&self, title: &str) -> u32;
}

/// Headers with fixed-width tabs and no rendering.
#[derive(Debug, Clone, Default)]
pub struct NullHeader {
    next: u64,
}

impl NullHeader {
    pub const TAB_WIDTH: u32 = 100;
}

impl HeaderRenderer for NullHeader {
    fn create_tab(&mut self, _stack: ItemId, _component: ItemId, _title: &str, _index: usize) -> TabHandle {
        self.next += 1;
        TabHandle(self.next)
    }

    fn destroy_tab(&mut self, _tab: TabHandle) {}

    fn set_active_tab(&mut self, _stack: ItemId, _tab: TabHandle) {}

    fn tab_extent(&self, _title: &str) -> u32 {
        Self::TAB_WIDTH
    }
}

/// What gets moved into a popout window.
#[derive(Debug, Clone, PartialEq)]
pub struct PopoutRequest {
    pub content: Vec<ItemConfig>,
    /// Where the item sat on screen, used to place the window.
    pub rect: Rect,
    pub parent_id: String,
    pub index_in_parent: usize,
}

/// The host refused to open a window (typically a popup blocker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoutBlocked;

/// Opens and closes popout windows.
pub trait PopoutManager {
    fn open(&mut self, request: PopoutRequest) -> Result<PopoutHandle, PopoutBlocked>;
    fn close(&mut self, popout: PopoutHandle);
}

/// Popout manager for hosts without windows. Every open is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPopouts;

impl PopoutManager for NullPopouts {
    fn open(&mut self, _request: PopoutRequest) -> Result<PopoutHandle, PopoutBlocked> {
        Err(PopoutBlocked)
    }

    fn close(&mut self, _popout: PopoutHandle) {}
}
