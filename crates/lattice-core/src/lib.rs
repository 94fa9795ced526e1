#![forbid(unsafe_code)]

//! Core primitives for Lattice: geometry, pointer input, the drag gesture
//! machine, and deferred-work slots.

pub mod drag_listener;
pub mod geometry;
pub mod pointer;
pub mod schedule;

pub use drag_listener::{
    DEFAULT_DRAG_DELAY, DEFAULT_DRAG_DISTANCE, DragDispatch, DragEvent, DragListener,
    DragListenerConfig, DragListenerState, HostCommand,
};
pub use geometry::{Bounds, Point, Rect};
pub use pointer::{PointerButton, PointerEvent, PointerKind, PointerPhase};
pub use schedule::{DEFAULT_RESIZE_DEBOUNCE, Debounce, FrameRequest};

/// Re-exported so hosts and tests share one clock type across targets.
pub use web_time::Instant;
