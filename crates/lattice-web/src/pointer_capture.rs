#![forbid(unsafe_code)]

//! Deterministic pointer-capture adapter for layout drag gestures.
//!
//! This module bridges browser pointer lifecycle signals into
//! [`lattice_layout::Layout::pointer`] calls while enforcing:
//! - one active pointer at a time,
//! - explicit capture acquire/release commands for JS hosts, and
//! - cancellation on interruption paths (blur/visibility/lost-capture).
//!
//! Interruptions are delivered to the layout as a `Cancel` at the last
//! known position, which ends the gesture like a release there.

use lattice_core::{HostCommand, Instant, Point, PointerButton, PointerEvent, PointerKind, PointerPhase};
use lattice_layout::{Layout, LayoutError, PointerTarget};

/// Adapter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCaptureConfig {
    /// Button required to begin a gesture.
    pub activation_button: PointerButton,
    /// If true, pointer leave cancels the gesture when capture was requested
    /// but never acknowledged.
    pub cancel_on_leave_without_capture: bool,
}

impl Default for PointerCaptureConfig {
    fn default() -> Self {
        Self {
            activation_button: PointerButton::Primary,
            cancel_on_leave_without_capture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePointerCapture {
    pointer_id: u32,
    kind: PointerKind,
    target: PointerTarget,
    button: PointerButton,
    is_primary: bool,
    last_position: Point,
    capture_state: CaptureState,
}

impl ActivePointerCapture {
    fn event(&self, phase: PointerPhase, position: Point) -> PointerEvent {
        PointerEvent {
            phase,
            kind: self.kind,
            pointer_id: self.pointer_id,
            button: self.button,
            position,
            is_primary: self.is_primary,
        }
    }
}

/// Browser pointer-capture control emitted by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
}

/// Why an incoming lifecycle signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    LeaveWhileCaptured,
    /// The layout did not start a gesture for the pressed handle.
    NotDraggable,
}

/// Outcome category for one lifecycle dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    Forwarded,
    CaptureStateUpdated,
    Ignored(IgnoredReason),
    /// The layout returned an error for the forwarded event.
    Rejected(LayoutError),
}

/// Structured lifecycle log record for one adapter dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub phase: LifecyclePhase,
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub target: Option<PointerTarget>,
    pub position: Option<Point>,
    pub capture_command: Option<CaptureCommand>,
    pub outcome: LogOutcome,
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerDispatch {
    /// Event handed to the layout, if any.
    pub pointer_event: Option<PointerEvent>,
    /// Document-level side effects requested by the layout.
    pub host_commands: Vec<HostCommand>,
    pub capture_command: Option<CaptureCommand>,
    pub log: LogEntry,
}

impl PointerDispatch {
    fn ignored(
        phase: LifecyclePhase,
        reason: IgnoredReason,
        pointer_id: Option<u32>,
        target: Option<PointerTarget>,
        position: Option<Point>,
    ) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "lattice.web", ?phase, ?reason, pointer_id, "pointer signal ignored");
        Self {
            pointer_event: None,
            host_commands: Vec::new(),
            capture_command: None,
            log: LogEntry {
                phase,
                sequence: None,
                pointer_id,
                target,
                position,
                capture_command: None,
                outcome: LogOutcome::Ignored(reason),
            },
        }
    }

    fn capture_state_updated(phase: LifecyclePhase, pointer_id: u32, target: PointerTarget) -> Self {
        Self {
            pointer_event: None,
            host_commands: Vec::new(),
            capture_command: None,
            log: LogEntry {
                phase,
                sequence: None,
                pointer_id: Some(pointer_id),
                target: Some(target),
                position: None,
                capture_command: None,
                outcome: LogOutcome::CaptureStateUpdated,
            },
        }
    }
}

/// Pointer input sample from the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub pointer_id: u32,
    pub kind: PointerKind,
    pub button: PointerButton,
    pub position: Point,
    /// False for the second and later fingers of a multi-touch.
    pub is_primary: bool,
}

impl PointerSample {
    /// Primary mouse button at `(x, y)`.
    #[must_use]
    pub const fn mouse(x: i32, y: i32) -> Self {
        Self {
            pointer_id: 1,
            kind: PointerKind::Mouse,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            is_primary: true,
        }
    }

    /// Touch point `pointer_id` at `(x, y)`.
    #[must_use]
    pub const fn touch(pointer_id: u32, x: i32, y: i32, is_primary: bool) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Touch,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            is_primary,
        }
    }

    fn event(&self, phase: PointerPhase) -> PointerEvent {
        PointerEvent {
            phase,
            kind: self.kind,
            pointer_id: self.pointer_id,
            button: self.button,
            position: self.position,
            is_primary: self.is_primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DispatchContext {
    phase: LifecyclePhase,
    pointer_id: Option<u32>,
    target: Option<PointerTarget>,
    position: Option<Point>,
}

/// Deterministic pointer-capture adapter for layout web hosts.
///
/// Returns host pointer-capture commands that can be wired to DOM
/// `setPointerCapture()` / `releasePointerCapture()`, alongside the
/// document-listener commands produced by the layout's drag listener.
#[derive(Debug, Clone)]
pub struct PointerCaptureAdapter {
    config: PointerCaptureConfig,
    active: Option<ActivePointerCapture>,
    next_sequence: u64,
}

impl Default for PointerCaptureAdapter {
    fn default() -> Self {
        Self::new(PointerCaptureConfig::default())
    }
}

impl PointerCaptureAdapter {
    #[must_use]
    pub const fn new(config: PointerCaptureConfig) -> Self {
        Self {
            config,
            active: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub const fn config(&self) -> PointerCaptureConfig {
        self.config
    }

    /// Active pointer ID, if any.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.map(|active| active.pointer_id)
    }

    /// Handle pointer-down on a draggable handle.
    pub fn pointer_down(
        &mut self,
        layout: &mut Layout,
        target: PointerTarget,
        sample: PointerSample,
        now: Instant,
    ) -> PointerDispatch {
        let (pointer_id, position) = (sample.pointer_id, sample.position);
        if pointer_id == 0 {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerDown,
                IgnoredReason::InvalidPointerId,
                Some(pointer_id),
                Some(target),
                Some(position),
            );
        }
        if sample.button != self.config.activation_button {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerDown,
                IgnoredReason::ButtonNotAllowed,
                Some(pointer_id),
                Some(target),
                Some(position),
            );
        }
        if self.active.is_some() {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerDown,
                IgnoredReason::ActivePointerAlreadyInProgress,
                Some(pointer_id),
                Some(target),
                Some(position),
            );
        }

        let event = sample.event(PointerPhase::Down);
        let mut dispatch = self.forward(
            layout,
            DispatchContext {
                phase: LifecyclePhase::PointerDown,
                pointer_id: Some(pointer_id),
                target: Some(target),
                position: Some(position),
            },
            Some(target),
            event,
            now,
            Some(CaptureCommand::Acquire { pointer_id }),
        );
        if !layout.has_active_gesture() {
            dispatch.capture_command = None;
            dispatch.log.capture_command = None;
            if dispatch.log.outcome == LogOutcome::Forwarded {
                dispatch.log.outcome = LogOutcome::Ignored(IgnoredReason::NotDraggable);
            }
            return dispatch;
        }
        self.active = Some(ActivePointerCapture {
            pointer_id,
            kind: sample.kind,
            target,
            button: sample.button,
            is_primary: sample.is_primary,
            last_position: position,
            capture_state: CaptureState::Requested,
        });
        dispatch
    }

    /// Mark browser pointer capture as successfully acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> PointerDispatch {
        let Some(mut active) = self.active else {
            return PointerDispatch::ignored(
                LifecyclePhase::CaptureAcquired,
                IgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                LifecyclePhase::CaptureAcquired,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.target),
                None,
            );
        }
        active.capture_state = CaptureState::Acquired;
        self.active = Some(active);
        PointerDispatch::capture_state_updated(LifecyclePhase::CaptureAcquired, pointer_id, active.target)
    }

    /// Handle pointer-move for the active pointer.
    pub fn pointer_move(
        &mut self,
        layout: &mut Layout,
        pointer_id: u32,
        position: Point,
        now: Instant,
    ) -> PointerDispatch {
        let Some(mut active) = self.active else {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerMove,
                IgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                Some(position),
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerMove,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.target),
                Some(position),
            );
        }
        let event = active.event(PointerPhase::Move, position);
        let dispatch = self.forward(
            layout,
            DispatchContext {
                phase: LifecyclePhase::PointerMove,
                pointer_id: Some(pointer_id),
                target: Some(active.target),
                position: Some(position),
            },
            None,
            event,
            now,
            None,
        );
        active.last_position = position;
        self.active = Some(active);
        dispatch
    }

    /// Handle pointer-up and release capture for the active pointer.
    pub fn pointer_up(
        &mut self,
        layout: &mut Layout,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
        now: Instant,
    ) -> PointerDispatch {
        let Some(active) = self.active else {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerUp,
                IgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                Some(position),
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerUp,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.target),
                Some(position),
            );
        }
        if active.button != button {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerUp,
                IgnoredReason::ButtonMismatch,
                Some(pointer_id),
                Some(active.target),
                Some(position),
            );
        }
        let event = active.event(PointerPhase::Up, position);
        let dispatch = self.forward(
            layout,
            DispatchContext {
                phase: LifecyclePhase::PointerUp,
                pointer_id: Some(pointer_id),
                target: Some(active.target),
                position: Some(position),
            },
            None,
            event,
            now,
            active
                .capture_state
                .is_acquired()
                .then_some(CaptureCommand::Release { pointer_id }),
        );
        self.active = None;
        dispatch
    }

    /// Handle browser pointer-cancel events.
    pub fn pointer_cancel(
        &mut self,
        layout: &mut Layout,
        pointer_id: Option<u32>,
        now: Instant,
    ) -> PointerDispatch {
        self.cancel_active(layout, LifecyclePhase::PointerCancel, pointer_id, true, now)
    }

    /// Handle pointer-leave lifecycle events.
    pub fn pointer_leave(&mut self, layout: &mut Layout, pointer_id: u32, now: Instant) -> PointerDispatch {
        let Some(active) = self.active else {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerLeave,
                IgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                LifecyclePhase::PointerLeave,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.target),
                None,
            );
        }
        if matches!(active.capture_state, CaptureState::Requested)
            && self.config.cancel_on_leave_without_capture
        {
            self.cancel_active(layout, LifecyclePhase::PointerLeave, Some(pointer_id), true, now)
        } else {
            PointerDispatch::ignored(
                LifecyclePhase::PointerLeave,
                IgnoredReason::LeaveWhileCaptured,
                Some(pointer_id),
                Some(active.target),
                None,
            )
        }
    }

    /// Handle window blur.
    pub fn blur(&mut self, layout: &mut Layout, now: Instant) -> PointerDispatch {
        self.cancel_active(layout, LifecyclePhase::Blur, None, true, now)
    }

    /// Handle visibility-hidden interruptions.
    pub fn visibility_hidden(&mut self, layout: &mut Layout, now: Instant) -> PointerDispatch {
        self.cancel_active(layout, LifecyclePhase::VisibilityHidden, None, true, now)
    }

    /// Handle `lostpointercapture`; the browser already released it.
    pub fn lost_pointer_capture(
        &mut self,
        layout: &mut Layout,
        pointer_id: u32,
        now: Instant,
    ) -> PointerDispatch {
        self.cancel_active(layout, LifecyclePhase::LostPointerCapture, Some(pointer_id), false, now)
    }

    fn cancel_active(
        &mut self,
        layout: &mut Layout,
        phase: LifecyclePhase,
        pointer_id: Option<u32>,
        release_capture: bool,
        now: Instant,
    ) -> PointerDispatch {
        let Some(active) = self.active else {
            return PointerDispatch::ignored(phase, IgnoredReason::NoActivePointer, pointer_id, None, None);
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return PointerDispatch::ignored(
                phase,
                IgnoredReason::PointerMismatch,
                Some(id),
                Some(active.target),
                None,
            );
        }
        let command = (release_capture && active.capture_state.is_acquired()).then_some(
            CaptureCommand::Release {
                pointer_id: active.pointer_id,
            },
        );
        let event = active.event(PointerPhase::Cancel, active.last_position);
        let dispatch = self.forward(
            layout,
            DispatchContext {
                phase,
                pointer_id: Some(active.pointer_id),
                target: Some(active.target),
                position: Some(active.last_position),
            },
            None,
            event,
            now,
            command,
        );
        self.active = None;
        dispatch
    }

    fn forward(
        &mut self,
        layout: &mut Layout,
        context: DispatchContext,
        target: Option<PointerTarget>,
        event: PointerEvent,
        now: Instant,
        capture_command: Option<CaptureCommand>,
    ) -> PointerDispatch {
        let sequence = self.next_sequence();
        let (host_commands, outcome) = match layout.pointer(target, &event, now) {
            Ok(commands) => (commands, LogOutcome::Forwarded),
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "lattice.web", phase = ?context.phase, %error, "layout rejected pointer event");
                (Vec::new(), LogOutcome::Rejected(error))
            }
        };
        PointerDispatch {
            pointer_event: Some(event),
            host_commands,
            capture_command,
            log: LogEntry {
                phase: context.phase,
                sequence: Some(sequence),
                pointer_id: context.pointer_id,
                target: context.target,
                position: context.position,
                capture_command,
                outcome,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}
