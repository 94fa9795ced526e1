#![forbid(unsafe_code)]

//! Pointer routing for tabs, splitters and external drag sources.
//!
//! The host hit-tests its own chrome and reports which handle a pointer
//! went down on. The layout runs one [`DragListener`] for that gesture and
//! feeds every later move/up to it until the gesture ends.

use lattice_core::{
    DragDispatch, DragEvent, DragListener, DragListenerState, HostCommand, Instant, Point,
    PointerEvent, PointerPhase,
};
use tracing::debug;

use crate::config::ItemConfig;
use crate::error::LayoutError;
use crate::item::ItemId;
use crate::layout::Layout;

/// Handle registered with [`Layout::create_drag_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DragSourceId(u64);

impl DragSourceId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Draggable handle a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// Tab of the given component.
    Tab(ItemId),
    /// Splitter between children `index` and `index + 1` of `row`.
    Splitter { row: ItemId, index: usize },
    DragSource(DragSourceId),
}

#[derive(Debug, Clone)]
pub(crate) struct ActiveGesture {
    pub(crate) target: PointerTarget,
    pub(crate) listener: DragListener,
}

impl Layout {
    /// Register config that can be dragged into the layout from outside.
    pub fn create_drag_source(&mut self, config: ItemConfig) -> DragSourceId {
        self.next_drag_source += 1;
        let id = DragSourceId(self.next_drag_source);
        self.drag_sources.push((id, config));
        id
    }

    pub fn remove_drag_source(&mut self, id: DragSourceId) -> bool {
        let before = self.drag_sources.len();
        self.drag_sources.retain(|(source, _)| *source != id);
        self.drag_sources.len() != before
    }

    /// Whether a gesture is being tracked.
    #[must_use]
    pub fn has_active_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Feed a pointer event.
    ///
    /// `target` matters only for pointer-down; later events of the gesture
    /// are routed to the active listener wherever they land. Returns the
    /// side effects the host must perform.
    pub fn pointer(
        &mut self,
        target: Option<PointerTarget>,
        event: &PointerEvent,
        now: Instant,
    ) -> Result<Vec<HostCommand>, LayoutError> {
        self.ensure_initialised()?;
        if event.phase == PointerPhase::Down {
            if self.gesture.is_some() {
                return Ok(Vec::new());
            }
            let Some(target) = target.filter(|_| event.can_start_drag()) else {
                return Ok(Vec::new());
            };
            if !self.gesture_allowed(target)? {
                return Ok(Vec::new());
            }
            let mut listener = DragListener::new(self.drag_settings.listener_config());
            let dispatch = listener.handle(event, now);
            if dispatch.is_empty() {
                return Ok(Vec::new());
            }
            self.gesture = Some(ActiveGesture { target, listener });
            return self.process_gesture(dispatch);
        }

        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(Vec::new());
        };
        let dispatch = gesture.listener.handle(event, now);
        self.process_gesture(dispatch)
    }

    /// Pointer-down side effects, and whether the handle may start a gesture.
    fn gesture_allowed(&mut self, target: PointerTarget) -> Result<bool, LayoutError> {
        match target {
            PointerTarget::Tab(component) => {
                self.tab_activated(component)?;
                Ok(self.settings.reorder_enabled)
            }
            PointerTarget::Splitter { row, index } => {
                let len = self.tree.node(row)?.children().len();
                Ok(index + 1 < len)
            }
            PointerTarget::DragSource(id) => {
                Ok(self.drag_sources.iter().any(|(source, _)| *source == id))
            }
        }
    }

    /// Apply listener output for the active gesture.
    pub(crate) fn process_gesture(
        &mut self,
        dispatch: DragDispatch,
    ) -> Result<Vec<HostCommand>, LayoutError> {
        let Some(target) = self.gesture.as_ref().map(|g| g.target) else {
            return Ok(dispatch.commands);
        };
        let mut result = Ok(());
        for event in &dispatch.events {
            let step = match (*event, target) {
                (DragEvent::DragStart { origin }, PointerTarget::Tab(component)) => {
                    self.tab_drag_started(component, origin)
                }
                (DragEvent::DragStart { origin }, PointerTarget::DragSource(id)) => {
                    self.drag_source_started(id, origin)
                }
                (DragEvent::DragStart { .. }, PointerTarget::Splitter { row, index }) => {
                    self.splitter_drag_start(row, index)
                }
                (DragEvent::Drag { position, .. }, PointerTarget::Tab(_) | PointerTarget::DragSource(_)) => {
                    self.drag_proxy_moved(position);
                    Ok(())
                }
                (DragEvent::Drag { delta_x, delta_y, .. }, PointerTarget::Splitter { .. }) => {
                    self.splitter_dragged(delta_x, delta_y);
                    Ok(())
                }
                (DragEvent::DragStop { position }, PointerTarget::Tab(_) | PointerTarget::DragSource(_)) => {
                    self.drag_proxy_moved(position);
                    self.drag_proxy_dropped()
                }
                (DragEvent::DragStop { .. }, PointerTarget::Splitter { .. }) => {
                    self.splitter_drag_stop()
                }
            };
            if step.is_err() && result.is_ok() {
                result = step;
            }
        }
        let finished = self
            .gesture
            .as_ref()
            .is_some_and(|g| g.listener.state() == DragListenerState::Idle);
        if finished {
            self.gesture = None;
        }
        result.map(|()| dispatch.commands)
    }

    /// Tab pressed: activate it and, when enabled, select its stack.
    pub fn tab_activated(&mut self, component: ItemId) -> Result<(), LayoutError> {
        let stack = self
            .parent_of(component)
            .ok_or(LayoutError::UnknownItem(component))?;
        self.set_active_content_item(stack, component)?;
        if self.settings.selection_enabled {
            self.select_item(Some(stack))?;
        }
        Ok(())
    }

    /// Tab dragged past the threshold: pull the component out into a drag
    /// proxy, unless that would empty a stack that cannot close.
    pub fn tab_drag_started(&mut self, component: ItemId, origin: Point) -> Result<(), LayoutError> {
        self.ensure_initialised()?;
        if self.drag.is_some() || !self.can_drag_out(component) {
            debug!(target: "lattice.drag", item = component.get(), "tab drag refused");
            return Ok(());
        }
        if let Some(stack) = self.parent_of(component)
            && self.maximised == Some(stack)
        {
            self.toggle_maximise(stack)?;
        }
        self.start_drag_proxy(component, origin)
    }

    fn drag_source_started(&mut self, id: DragSourceId, origin: Point) -> Result<(), LayoutError> {
        if self.drag.is_some() {
            return Ok(());
        }
        let Some(config) = self
            .drag_sources
            .iter()
            .find(|(source, _)| *source == id)
            .map(|(_, config)| config.clone())
        else {
            return Ok(());
        };
        let item = self.build_item(&config, None)?;
        debug!(target: "lattice.drag", source = id.get(), item = item.get(), "drag source started");
        self.start_drag_proxy(item, origin)
    }
}
