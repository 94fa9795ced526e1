#![forbid(unsafe_code)]

//! The layout manager: owns the content tree and every collaborator.

use std::time::Duration;

use lattice_core::{Debounce, FrameRequest, Instant, Rect};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Dimensions, DragSettings, ItemConfig, LayoutConfig, Settings};
use crate::drag_proxy::DragProxy;
use crate::error::LayoutError;
use crate::event::{BubblingEvent, EventHub, LayoutEvent, ListenerId};
use crate::host::{ComponentHost, HeaderRenderer, NullHeader, NullPopouts, PopoutManager};
use crate::input::{ActiveGesture, DragSourceId};
use crate::item::{Axis, Component, ItemId, ItemType, Node, NodeKind, RowOrColumn, Stack};
use crate::popout::OpenPopout;
use crate::splitter::SplitterDrag;
use crate::tree::ContentTree;

/// Delay between a container resize notification and the re-layout.
pub const RESIZE_DEBOUNCE: Duration = lattice_core::DEFAULT_RESIZE_DEBOUNCE;

/// A docking layout.
///
/// Build with [`Layout::new`], then call [`Layout::init`] with the container
/// rectangle. All timing is driven by the host through `now` arguments and
/// [`Layout::poll`].
pub struct Layout {
    pub(crate) settings: Settings,
    pub(crate) dimensions: Dimensions,
    pub(crate) drag_settings: DragSettings,
    pub(crate) tree: ContentTree,
    pub(crate) ground: ItemId,
    pub(crate) host: Box<dyn ComponentHost>,
    pub(crate) header: Box<dyn HeaderRenderer>,
    pub(crate) popouts: Box<dyn PopoutManager>,
    pub(crate) events: EventHub,
    pub(crate) container: Rect,
    pending_content: Vec<ItemConfig>,
    pub(crate) initialised: bool,
    pub(crate) destroyed: bool,
    pub(crate) destroy_pending: bool,
    resize_debounce: Debounce,
    pending_container: Option<Rect>,
    pub(crate) frame: FrameRequest,
    pub(crate) gesture: Option<ActiveGesture>,
    pub(crate) drag: Option<DragProxy>,
    pub(crate) splitter_drag: Option<SplitterDrag>,
    pub(crate) drag_sources: Vec<(DragSourceId, ItemConfig)>,
    pub(crate) next_drag_source: u64,
    pub(crate) open_popouts: Vec<OpenPopout>,
    pub(crate) next_popout_parent: u64,
    pub(crate) selected: Option<ItemId>,
    pub(crate) maximised: Option<ItemId>,
    pub(crate) deferred_destroy: Vec<ItemId>,
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout")
            .field("items", &self.tree.len())
            .field("container", &self.container)
            .field("initialised", &self.initialised)
            .field("destroyed", &self.destroyed)
            .field("dragging", &self.drag.is_some())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Layout {
    /// Create an uninitialised layout.
    pub fn new(config: LayoutConfig, host: impl ComponentHost + 'static) -> Self {
        let mut tree = ContentTree::new();
        let ground = tree.insert(NodeKind::Ground);
        Self {
            settings: config.settings,
            dimensions: config.dimensions,
            drag_settings: config.drag,
            tree,
            ground,
            host: Box::new(host),
            header: Box::new(NullHeader::default()),
            popouts: Box::new(NullPopouts),
            events: EventHub::default(),
            container: Rect::default(),
            pending_content: config.content,
            initialised: false,
            destroyed: false,
            destroy_pending: false,
            resize_debounce: Debounce::new(RESIZE_DEBOUNCE),
            pending_container: None,
            frame: FrameRequest::new(),
            gesture: None,
            drag: None,
            splitter_drag: None,
            drag_sources: Vec::new(),
            next_drag_source: 0,
            open_popouts: Vec::new(),
            next_popout_parent: 0,
            selected: None,
            maximised: None,
            deferred_destroy: Vec::new(),
        }
    }

    /// Use a real header renderer instead of fixed-width tabs.
    #[must_use]
    pub fn with_header(mut self, header: impl HeaderRenderer + 'static) -> Self {
        self.header = Box::new(header);
        self
    }

    /// Use a popout manager that can open windows.
    #[must_use]
    pub fn with_popouts(mut self, popouts: impl PopoutManager + 'static) -> Self {
        self.popouts = Box::new(popouts);
        self
    }

    /// Build the tree from config, create every panel, and lay out.
    pub fn init(&mut self, container: Rect) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        if self.initialised {
            return Err(LayoutError::AlreadyInitialised);
        }
        if self.pending_content.len() > 1 {
            return Err(LayoutError::GroundOccupied);
        }
        let content = std::mem::take(&mut self.pending_content);
        if let Some(config) = content.first() {
            let root = match self.build_item(config, Some(ItemType::Ground)) {
                Ok(root) => root,
                Err(e) => {
                    self.pending_content = content;
                    return Err(e);
                }
            };
            if let Err(e) = self.tree.attach(self.ground, root, 0) {
                self.tree.remove_subtree(root);
                self.pending_content = content;
                return Err(e);
            }
        }

        self.container = container;
        self.initialised = true;
        if let Some(root) = self.root_item()
            && let Err(e) = self.init_subtree(root)
        {
            self.release_subtree(root);
            self.tree.remove_subtree(root);
            self.initialised = false;
            self.pending_content = content;
            return Err(e);
        }
        if let Some(node) = self.tree.get_mut(self.ground) {
            node.initialised = true;
        }
        self.arrange();
        debug!(
            target: "lattice.tree",
            items = self.tree.len(),
            width = container.width,
            height = container.height,
            "layout initialised"
        );
        self.events.queue(LayoutEvent::Initialised);
        Ok(())
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), LayoutError> {
        if self.destroyed {
            return Err(LayoutError::AlreadyDestroyed);
        }
        Ok(())
    }

    pub(crate) fn ensure_initialised(&self) -> Result<(), LayoutError> {
        self.ensure_alive()?;
        if !self.initialised {
            return Err(LayoutError::NotInitialised);
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    #[must_use]
    pub fn drag_settings(&self) -> &DragSettings {
        &self.drag_settings
    }

    #[must_use]
    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    #[must_use]
    pub const fn ground(&self) -> ItemId {
        self.ground
    }

    #[must_use]
    pub const fn container(&self) -> Rect {
        self.container
    }

    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The single child of the ground.
    #[must_use]
    pub fn root_item(&self) -> Option<ItemId> {
        self.tree
            .get(self.ground)
            .and_then(|g| g.children().first().copied())
    }

    #[must_use]
    pub fn node(&self, id: ItemId) -> Option<&Node> {
        self.tree.get(id)
    }

    #[must_use]
    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.tree.get(id).and_then(Node::parent)
    }

    #[must_use]
    pub fn children_of(&self, id: ItemId) -> &[ItemId] {
        self.tree.get(id).map_or(&[], Node::children)
    }

    /// True when `id` hangs off this layout's ground.
    #[must_use]
    pub fn is_attached(&self, id: ItemId) -> bool {
        self.tree.contains(id) && self.tree.top_of(id) == self.ground
    }

    pub(crate) fn is_live(&self, id: ItemId) -> bool {
        self.initialised && self.is_attached(id)
    }

    /// Attached items in pre-order, ground excluded.
    #[must_use]
    pub fn all_items(&self) -> Vec<ItemId> {
        let mut items = self.tree.descendants(self.ground);
        items.retain(|&id| id != self.ground);
        items
    }

    /// Items whose config id equals `id`.
    #[must_use]
    pub fn items_by_id(&self, id: &str) -> Vec<ItemId> {
        self.all_items()
            .into_iter()
            .filter(|&item| self.tree.get(item).and_then(Node::config_id) == Some(id))
            .collect()
    }

    #[must_use]
    pub fn items_by_type(&self, item_type: ItemType) -> Vec<ItemId> {
        self.all_items()
            .into_iter()
            .filter(|&item| self.tree.get(item).map(Node::item_type) == Some(item_type))
            .collect()
    }

    #[must_use]
    pub fn components_by_type(&self, component_type: &str) -> Vec<ItemId> {
        self.all_items()
            .into_iter()
            .filter(|&item| {
                self.tree
                    .get(item)
                    .and_then(Node::as_component)
                    .is_some_and(|c| c.component_type == component_type)
            })
            .collect()
    }

    #[must_use]
    pub const fn selected_item(&self) -> Option<ItemId> {
        self.selected
    }

    #[must_use]
    pub const fn maximised_item(&self) -> Option<ItemId> {
        self.maximised
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Register a handler that sees item events as they bubble through `item`.
    pub fn on_item_event(
        &mut self,
        item: ItemId,
        handler: impl FnMut(&mut BubblingEvent) + 'static,
    ) -> ListenerId {
        self.events.subscribe(item, handler)
    }

    pub fn off_item_event(&mut self, listener: ListenerId) -> bool {
        self.events.unsubscribe(listener)
    }

    /// Events that reached the layout since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LayoutEvent> {
        self.events.drain()
    }

    /// Bubble `event` from `origin` toward the ground.
    pub(crate) fn emit(&mut self, origin: ItemId, event: LayoutEvent) {
        let mut bubbling = BubblingEvent::new(event, origin);
        let mut cursor = Some(origin);
        while let Some(id) = cursor {
            self.events.visit(id, &mut bubbling);
            if bubbling.is_propagation_stopped() {
                return;
            }
            if id == self.ground {
                self.events.queue(event);
                return;
            }
            cursor = self.tree.get(id).and_then(Node::parent);
        }
    }

    // ── Config ─────────────────────────────────────────────────────────

    /// Create a detached item from config.
    pub fn create_item(&mut self, config: &ItemConfig) -> Result<ItemId, LayoutError> {
        self.ensure_alive()?;
        self.build_item(config, None)
    }

    /// Build a detached subtree. Components whose parent will not be a
    /// stack are wrapped in one.
    pub(crate) fn build_item(
        &mut self,
        config: &ItemConfig,
        parent: Option<ItemType>,
    ) -> Result<ItemId, LayoutError> {
        if config.item_type == ItemType::Component
            && parent.is_some_and(|p| p != ItemType::Stack)
        {
            return self.build_item(&config.clone().wrapped_in_stack(), parent);
        }
        if parent == Some(ItemType::Stack)
            && matches!(
                config.item_type,
                ItemType::Stack | ItemType::Row | ItemType::Column
            )
        {
            return Err(LayoutError::InvalidChildType {
                parent: ItemType::Stack,
                child: config.item_type,
            });
        }
        let kind = match config.item_type {
            ItemType::Ground => return Err(LayoutError::ConfigItemType),
            ItemType::Row => NodeKind::RowOrColumn(RowOrColumn {
                axis: Axis::Horizontal,
                splitters: Vec::new(),
            }),
            ItemType::Column => NodeKind::RowOrColumn(RowOrColumn {
                axis: Axis::Vertical,
                splitters: Vec::new(),
            }),
            ItemType::Stack => NodeKind::Stack(Stack::default()),
            ItemType::Component => {
                let component_type = config
                    .component_type
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .ok_or(LayoutError::MissingComponentType)?;
                NodeKind::Component(Component {
                    component_type: component_type.to_owned(),
                    state: config.component_state.clone().unwrap_or(Value::Null),
                    panel: None,
                })
            }
        };

        let id = self.tree.insert(kind);
        if let Some(node) = self.tree.get_mut(id) {
            node.config_id.clone_from(&config.id);
            node.title.clone_from(&config.title);
            node.width = config.width;
            node.height = config.height;
            node.min_width = config.min_width;
            node.min_height = config.min_height;
            node.is_closable = config.is_closable;
        }

        for (index, child_config) in config.content.iter().enumerate() {
            let built = self.build_item(child_config, Some(config.item_type));
            let attached = built.and_then(|child| match self.tree.attach(id, child, index) {
                Ok(()) => Ok(child),
                Err(e) => {
                    self.tree.remove_subtree(child);
                    Err(e)
                }
            });
            if let Err(e) = attached {
                self.tree.remove_subtree(id);
                return Err(e);
            }
        }

        let len = config.content.len();
        if let Some(stack) = self.tree.get_mut(id).and_then(Node::as_stack_mut)
            && len > 0
        {
            stack.active_index = Some(config.active_item_index.unwrap_or(0).min(len - 1));
        }
        Ok(id)
    }

    /// Serialize the live tree, refreshing component state from the host.
    #[must_use]
    pub fn to_config(&self) -> LayoutConfig {
        let content = if self.initialised {
            self.root_item()
                .and_then(|root| self.item_to_config(root))
                .into_iter()
                .collect()
        } else {
            self.pending_content.clone()
        };
        LayoutConfig {
            settings: self.settings,
            dimensions: self.dimensions,
            drag: self.drag_settings,
            content,
        }
    }

    /// Serialize one subtree.
    #[must_use]
    pub fn item_to_config(&self, id: ItemId) -> Option<ItemConfig> {
        let node = self.tree.get(id)?;
        let (component_type, component_state, active_item_index) = match node.kind() {
            NodeKind::Component(c) => {
                let state = c
                    .panel
                    .and_then(|panel| self.host.state(panel))
                    .unwrap_or_else(|| c.state.clone());
                (
                    Some(c.component_type.clone()),
                    (!state.is_null()).then_some(state),
                    None,
                )
            }
            NodeKind::Stack(s) => (None, None, Some(s.active_index.unwrap_or(0))),
            NodeKind::RowOrColumn(_) | NodeKind::Ground => (None, None, None),
        };
        Some(ItemConfig {
            item_type: node.item_type(),
            id: node.config_id.clone(),
            is_closable: node.is_closable,
            title: node.title.clone(),
            width: node.width,
            height: node.height,
            min_width: node.min_width,
            min_height: node.min_height,
            component_type,
            component_state,
            active_item_index,
            content: node
                .children()
                .iter()
                .filter_map(|&child| self.item_to_config(child))
                .collect(),
        })
    }

    // ── Time and size ──────────────────────────────────────────────────

    /// Lay out against a new container immediately.
    pub fn update_size(&mut self, container: Rect) -> Result<(), LayoutError> {
        self.ensure_initialised()?;
        self.container = container;
        self.pending_container = None;
        self.resize_debounce.cancel();
        self.arrange();
        Ok(())
    }

    /// Note a container resize; the re-layout happens once resizes pause.
    pub fn container_resized(&mut self, container: Rect, now: Instant) {
        self.pending_container = Some(container);
        self.resize_debounce.schedule(now);
    }

    /// Earliest instant at which [`Layout::poll`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let gesture = self.gesture.as_ref().and_then(|g| g.listener.deadline());
        match (gesture, self.resize_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run timers that are due: the resize debounce and the pending
    /// gesture's drag delay.
    pub fn poll(&mut self, now: Instant) -> Result<Vec<lattice_core::HostCommand>, LayoutError> {
        self.ensure_alive()?;
        let mut commands = Vec::new();
        if self.resize_debounce.fire_if_due(now)
            && let Some(container) = self.pending_container.take()
            && self.initialised
        {
            self.container = container;
            self.arrange();
        }
        if let Some(gesture) = self.gesture.as_mut() {
            let dispatch = gesture.listener.poll(now);
            commands.extend(self.process_gesture(dispatch)?);
        }
        Ok(commands)
    }

    /// Whether the host should schedule an animation frame.
    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.frame.is_requested()
    }

    /// Apply work queued for the next animation frame.
    pub fn animation_frame(&mut self) {
        if self.frame.take() && self.initialised && !self.destroyed {
            self.arrange();
        }
    }

    // ── Teardown ───────────────────────────────────────────────────────

    /// Destroy every item and release host resources.
    ///
    /// During a drag the teardown waits until the drop completes.
    pub fn destroy(&mut self) -> Result<Vec<lattice_core::HostCommand>, LayoutError> {
        self.ensure_alive()?;
        if self.drag.is_some() {
            self.destroy_pending = true;
            return Ok(Vec::new());
        }
        let mut commands = Vec::new();
        if let Some(mut gesture) = self.gesture.take() {
            commands.extend(gesture.listener.destroy().commands);
        }
        if self.settings.close_popouts_on_unload {
            for popout in std::mem::take(&mut self.open_popouts) {
                self.popouts.close(popout.handle);
            }
        }
        if let Some(root) = self.root_item() {
            self.destroy_item(root);
            if let Err(e) = self.tree.detach(self.ground, root) {
                warn!(target: "lattice.tree", error = %e, "root detach failed during destroy");
            }
            self.tree.remove_subtree(root);
        }
        self.drag_sources.clear();
        self.resize_debounce.cancel();
        self.frame.cancel();
        self.destroyed = true;
        debug!(target: "lattice.tree", "layout destroyed");
        Ok(commands)
    }
}
