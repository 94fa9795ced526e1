#![forbid(unsafe_code)]

//! Explicit pending-work slots for deferred re-layout.
//!
//! Both primitives are cancel-and-replace: scheduling again supersedes any
//! pending request instead of queueing a second one. Neither owns a timer;
//! the host drives them with `now` values and frame callbacks.

use std::time::Duration;

use web_time::Instant;

/// Default quiet period before a burst of window resizes triggers a layout.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Trailing-edge debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Pending deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// (Re)arm the debounce; any earlier deadline is discarded.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the deadline if it has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}

/// A single outstanding "run on next animation frame" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRequest {
    requested: bool,
}

impl FrameRequest {
    #[must_use]
    pub const fn new() -> Self {
        Self { requested: false }
    }

    /// Request work on the next frame. Repeated requests coalesce.
    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn cancel(&mut self) {
        self.requested = false;
    }

    #[must_use]
    pub const fn is_requested(&self) -> bool {
        self.requested
    }

    /// Consume the request; true if work should run this frame.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::default();
        debounce.schedule(start);
        assert!(!debounce.fire_if_due(start + Duration::from_millis(99)));
        assert!(debounce.fire_if_due(start + Duration::from_millis(100)));
        assert!(!debounce.fire_if_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn rescheduling_supersedes_pending_deadline() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));
        debounce.schedule(start);
        debounce.schedule(start + Duration::from_millis(80));
        assert!(!debounce.fire_if_due(start + Duration::from_millis(120)));
        assert!(debounce.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn cancel_clears_debounce() {
        let start = Instant::now();
        let mut debounce = Debounce::default();
        debounce.schedule(start);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.fire_if_due(start + Duration::from_secs(1)));
    }

    #[test]
    fn frame_requests_coalesce() {
        let mut frame = FrameRequest::new();
        frame.request();
        frame.request();
        assert!(frame.take());
        assert!(!frame.take());
    }
}
