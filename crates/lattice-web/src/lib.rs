#![forbid(unsafe_code)]

//! `lattice-web` adapts a [`Layout`] to a browser host.
//!
//! Design goals:
//! - **Host-driven I/O**: JS pushes pointer lifecycle signals and size changes.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The crate does not bind to `wasm-bindgen`. It returns plain commands
//! (pointer capture, document listeners, timer and frame requests) that a
//! thin JS shim applies to the DOM.

pub mod pointer_capture;

use core::time::Duration;

use lattice_core::{HostCommand, Instant, Point, PointerButton, Rect};
use lattice_layout::{Layout, LayoutError, PointerTarget};

pub use pointer_capture::{
    CaptureCommand, IgnoredReason, LifecyclePhase, LogEntry, LogOutcome, PointerCaptureAdapter,
    PointerCaptureConfig, PointerDispatch, PointerSample,
};

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicClock {
    epoch: Instant,
    now: Duration,
}

impl Default for DeterministicClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl DeterministicClock {
    /// Create a clock reading `epoch`.
    #[must_use]
    pub const fn new(epoch: Instant) -> Self {
        Self {
            epoch,
            now: Duration::ZERO,
        }
    }

    /// Set time elapsed since the epoch.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Time elapsed since the epoch.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.epoch + self.now
    }
}

/// A layout bound to a browser host: pointer capture, clock and timers.
pub struct WebSession {
    layout: Layout,
    capture: PointerCaptureAdapter,
    clock: DeterministicClock,
}

impl WebSession {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self::with_parts(layout, PointerCaptureAdapter::default(), DeterministicClock::default())
    }

    #[must_use]
    pub const fn with_parts(
        layout: Layout,
        capture: PointerCaptureAdapter,
        clock: DeterministicClock,
    ) -> Self {
        Self {
            layout,
            capture,
            clock,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    #[must_use]
    pub const fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    #[must_use]
    pub const fn capture(&self) -> &PointerCaptureAdapter {
        &self.capture
    }

    /// Initialise the layout inside a `width` x `height` container.
    pub fn init(&mut self, width: u32, height: u32) -> Result<(), LayoutError> {
        self.layout.init(Rect::from_size(width, height))
    }

    /// Container resized; the re-layout waits for the debounce.
    pub fn resize(&mut self, width: u32, height: u32) {
        let now = self.clock.now();
        self.layout.container_resized(Rect::from_size(width, height), now);
    }

    /// Advance the clock and run any timers that came due.
    pub fn advance(&mut self, dt: Duration) -> Result<Vec<HostCommand>, LayoutError> {
        self.clock.advance(dt);
        self.layout.poll(self.clock.now())
    }

    /// Delay after which the host should call [`WebSession::advance`].
    ///
    /// `None` means no timer needs to be armed.
    #[must_use]
    pub fn next_timeout(&self) -> Option<Duration> {
        self.layout
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    /// Whether the host should request an animation frame.
    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.layout.frame_requested()
    }

    pub fn animation_frame(&mut self) {
        self.layout.animation_frame();
    }

    pub fn pointer_down(&mut self, target: PointerTarget, sample: PointerSample) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.pointer_down(&mut self.layout, target, sample, now)
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> PointerDispatch {
        self.capture.capture_acquired(pointer_id)
    }

    pub fn pointer_move(&mut self, pointer_id: u32, position: Point) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.pointer_move(&mut self.layout, pointer_id, position, now)
    }

    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        let now = self.clock.now();
        self.capture
            .pointer_up(&mut self.layout, pointer_id, button, position, now)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.pointer_cancel(&mut self.layout, pointer_id, now)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.pointer_leave(&mut self.layout, pointer_id, now)
    }

    pub fn blur(&mut self) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.blur(&mut self.layout, now)
    }

    pub fn visibility_hidden(&mut self) -> PointerDispatch {
        let now = self.clock.now();
        self.capture.visibility_hidden(&mut self.layout, now)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> PointerDispatch {
        let now = self.clock.now();
        self.capture
            .lost_pointer_capture(&mut self.layout, pointer_id, now)
    }

    /// Tear the layout down, ending and releasing any pointer still held.
    pub fn destroy(&mut self) -> Result<(Option<CaptureCommand>, Vec<HostCommand>), LayoutError> {
        let mut release = None;
        let mut commands = Vec::new();
        if self.capture.active_pointer_id().is_some() {
            let dispatch = self.blur();
            release = dispatch.capture_command;
            commands = dispatch.host_commands;
        }
        commands.extend(self.layout.destroy()?);
        Ok((release, commands))
    }
}

impl core::fmt::Debug for WebSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebSession")
            .field("container", &self.layout.container())
            .field("capture", &self.capture)
            .field("clock", &self.clock)
            .finish()
    }
}
