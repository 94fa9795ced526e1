#![forbid(unsafe_code)]

//! Host-neutral pointer input model.
//!
//! Mouse, touch, and pen input are all normalized into [`PointerEvent`]
//! before they reach a [`DragListener`](crate::drag_listener::DragListener).
//! Touch lists are reduced to their first touch by the host adapter; the
//! `is_primary` flag records whether this event belongs to that touch.

use crate::geometry::Point;

/// Button that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Device class of a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// Lifecycle phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One normalized pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub kind: PointerKind,
    pub pointer_id: u32,
    pub button: PointerButton,
    pub position: Point,
    /// False for secondary touches of a multi-touch list.
    pub is_primary: bool,
}

impl PointerEvent {
    /// Primary-button mouse event.
    #[must_use]
    pub const fn mouse(phase: PointerPhase, x: i32, y: i32) -> Self {
        Self {
            phase,
            kind: PointerKind::Mouse,
            pointer_id: 1,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            is_primary: true,
        }
    }

    /// Touch event for the given touch identifier.
    #[must_use]
    pub const fn touch(phase: PointerPhase, pointer_id: u32, x: i32, y: i32, is_primary: bool) -> Self {
        Self {
            phase,
            kind: PointerKind::Touch,
            pointer_id,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            is_primary,
        }
    }

    /// Replace the button.
    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Whether this event may start a drag gesture: primary mouse button,
    /// or the first touch of a touch list.
    #[must_use]
    pub const fn can_start_drag(&self) -> bool {
        match self.kind {
            PointerKind::Touch => self.is_primary,
            PointerKind::Mouse | PointerKind::Pen => {
                matches!(self.button, PointerButton::Primary) && self.is_primary
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_mouse_starts_drag() {
        assert!(PointerEvent::mouse(PointerPhase::Down, 0, 0).can_start_drag());
    }

    #[test]
    fn secondary_button_does_not_start_drag() {
        let event =
            PointerEvent::mouse(PointerPhase::Down, 0, 0).with_button(PointerButton::Secondary);
        assert!(!event.can_start_drag());
    }

    #[test]
    fn only_first_touch_starts_drag() {
        assert!(PointerEvent::touch(PointerPhase::Down, 4, 1, 1, true).can_start_drag());
        assert!(!PointerEvent::touch(PointerPhase::Down, 5, 1, 1, false).can_start_drag());
    }
}
