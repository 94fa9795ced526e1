#![forbid(unsafe_code)]

//! Pointer gesture engine: turns raw pointer events into drag phases.
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Pending --(delay elapsed | moved past distance)--> Dragging
//!   ^               |                                                  |
//!   +------up-------+-------------------------up-----------------------+
//! ```
//!
//! # Invariants
//!
//! 1. `DragStart` and `DragStop` always come in pairs. A release while still
//!    Pending is a click and emits neither.
//! 2. `Drag` deltas are measured from the origin recorded at pointer-down.
//! 3. After [`DragListener::destroy`] no further events are produced.
//!
//! The listener never owns a timer. The host calls [`DragListener::poll`]
//! (on a tick, or from a `setTimeout` it armed after `ListenGlobal`) and the
//! delay is evaluated against the supplied `now`.

use std::time::Duration;

use web_time::Instant;

use crate::geometry::Point;
use crate::pointer::{PointerEvent, PointerPhase};

/// Default hold delay before a pending press becomes a drag.
pub const DEFAULT_DRAG_DELAY: Duration = Duration::from_millis(200);

/// Default movement (pixels, either axis) before a pending press becomes a drag.
pub const DEFAULT_DRAG_DISTANCE: u32 = 10;

/// Thresholds for leaving the Pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragListenerConfig {
    /// Hold time after which a press becomes a drag without moving.
    pub delay: Duration,
    /// Movement in either axis (strictly greater than) that starts a drag.
    pub distance: u32,
}

impl Default for DragListenerConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DRAG_DELAY,
            distance: DEFAULT_DRAG_DISTANCE,
        }
    }
}

/// Public view of the gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragListenerState {
    Idle,
    Pending,
    Dragging,
}

/// Semantic gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    /// The gesture became a drag. `origin` is the pointer-down position.
    DragStart { origin: Point },
    /// Pointer moved while dragging.
    Drag {
        delta_x: i32,
        delta_y: i32,
        position: Point,
    },
    /// Pointer released after a drag.
    DragStop { position: Point },
}

/// Side effect the host must perform on behalf of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Route document-level move/up events to this listener.
    ListenGlobal,
    /// Stop routing document-level move/up events.
    UnlistenGlobal,
    /// Toggle the page-wide dragging state (iframes stop capturing pointers).
    SetGlobalDragging(bool),
}

/// Output of one listener step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragDispatch {
    pub events: Vec<DragEvent>,
    pub commands: Vec<HostCommand>,
}

impl DragDispatch {
    /// True when the step produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.commands.is_empty()
    }

    /// Append another dispatch.
    pub fn extend(&mut self, other: DragDispatch) {
        self.events.extend(other.events);
        self.commands.extend(other.commands);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending {
        pointer_id: u32,
        origin: Point,
        deadline: Instant,
    },
    Dragging {
        pointer_id: u32,
        origin: Point,
    },
}

/// Three-phase drag gesture machine for one draggable handle.
#[derive(Debug, Clone)]
pub struct DragListener {
    config: DragListenerConfig,
    phase: Phase,
    destroyed: bool,
}

impl DragListener {
    /// Create an idle listener.
    #[must_use]
    pub fn new(config: DragListenerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            destroyed: false,
        }
    }

    /// Current thresholds.
    #[must_use]
    pub const fn config(&self) -> DragListenerConfig {
        self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> DragListenerState {
        match self.phase {
            Phase::Idle => DragListenerState::Idle,
            Phase::Pending { .. } => DragListenerState::Pending,
            Phase::Dragging { .. } => DragListenerState::Dragging,
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Whether the listener has been torn down.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// When the pending delay will elapse, if a press is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> DragDispatch {
        let mut out = DragDispatch::default();
        if self.destroyed {
            return out;
        }
        match (event.phase, self.phase) {
            (PointerPhase::Down, Phase::Idle) => {
                if !event.can_start_drag() {
                    return out;
                }
                self.phase = Phase::Pending {
                    pointer_id: event.pointer_id,
                    origin: event.position,
                    deadline: now + self.config.delay,
                };
                out.commands.push(HostCommand::ListenGlobal);
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    target: "lattice.drag",
                    x = event.position.x,
                    y = event.position.y,
                    "drag pending"
                );
            }
            (PointerPhase::Down, _) => {}
            (
                PointerPhase::Move,
                Phase::Pending {
                    pointer_id, origin, ..
                },
            ) => {
                if pointer_id != event.pointer_id {
                    return out;
                }
                let (delta_x, delta_y) = event.position.delta_from(origin);
                if delta_x.unsigned_abs() > self.config.distance
                    || delta_y.unsigned_abs() > self.config.distance
                {
                    self.start_drag(pointer_id, origin, &mut out);
                    out.events.push(DragEvent::Drag {
                        delta_x,
                        delta_y,
                        position: event.position,
                    });
                }
            }
            (
                PointerPhase::Move,
                Phase::Dragging {
                    pointer_id, origin, ..
                },
            ) => {
                if pointer_id != event.pointer_id {
                    return out;
                }
                let (delta_x, delta_y) = event.position.delta_from(origin);
                out.events.push(DragEvent::Drag {
                    delta_x,
                    delta_y,
                    position: event.position,
                });
            }
            (PointerPhase::Move, Phase::Idle) => {}
            (PointerPhase::Up | PointerPhase::Cancel, Phase::Pending { pointer_id, .. }) => {
                if pointer_id != event.pointer_id {
                    return out;
                }
                self.phase = Phase::Idle;
                out.commands.push(HostCommand::UnlistenGlobal);
            }
            (PointerPhase::Up | PointerPhase::Cancel, Phase::Dragging { pointer_id, .. }) => {
                if pointer_id != event.pointer_id {
                    return out;
                }
                self.phase = Phase::Idle;
                out.commands.push(HostCommand::SetGlobalDragging(false));
                out.commands.push(HostCommand::UnlistenGlobal);
                out.events.push(DragEvent::DragStop {
                    position: event.position,
                });
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    target: "lattice.drag",
                    x = event.position.x,
                    y = event.position.y,
                    "drag stopped"
                );
            }
            (PointerPhase::Up | PointerPhase::Cancel, Phase::Idle) => {}
        }
        out
    }

    /// Evaluate the pending delay timer.
    pub fn poll(&mut self, now: Instant) -> DragDispatch {
        let mut out = DragDispatch::default();
        if self.destroyed {
            return out;
        }
        if let Phase::Pending {
            pointer_id,
            origin,
            deadline,
        } = self.phase
            && now >= deadline
        {
            self.start_drag(pointer_id, origin, &mut out);
        }
        out
    }

    /// Tear down the listener, cancelling any pending timer.
    ///
    /// Returns only host commands needed to unwind global state; no drag
    /// completion event is emitted.
    pub fn destroy(&mut self) -> DragDispatch {
        let mut out = DragDispatch::default();
        if self.destroyed {
            return out;
        }
        match self.phase {
            Phase::Idle => {}
            Phase::Pending { .. } => out.commands.push(HostCommand::UnlistenGlobal),
            Phase::Dragging { .. } => {
                out.commands.push(HostCommand::SetGlobalDragging(false));
                out.commands.push(HostCommand::UnlistenGlobal);
            }
        }
        self.phase = Phase::Idle;
        self.destroyed = true;
        out
    }

    fn start_drag(&mut self, pointer_id: u32, origin: Point, out: &mut DragDispatch) {
        self.phase = Phase::Dragging { pointer_id, origin };
        out.commands.push(HostCommand::SetGlobalDragging(true));
        out.events.push(DragEvent::DragStart { origin });
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "lattice.drag",
            x = origin.x,
            y = origin.y,
            "drag started"
        );
    }
}

impl Default for DragListener {
    fn default() -> Self {
        Self::new(DragListenerConfig::default())
    }
}
