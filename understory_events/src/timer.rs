// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamp-driven timers.
//!
//! Nothing here reads a clock. Callers pass the current time in milliseconds
//! to every method, which keeps the state machines deterministic and testable.
//!
//! ```
//! use understory_events::timer::{HoverChange, HoverIntent};
//!
//! let mut hover = HoverIntent::new(150, 150);
//! assert_eq!(hover.enter(1000, false), None);
//! assert_eq!(hover.poll(1100), None);
//! assert_eq!(hover.poll(1150), Some(HoverChange::Open));
//!
//! // Leaving and re-entering before the close delay keeps it open.
//! assert_eq!(hover.leave(2000, true), None);
//! assert_eq!(hover.enter(2100, true), None);
//! assert_eq!(hover.poll(2200), None);
//! ```

/// A one-shot timer slot: at most one pending deadline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<u64>,
}

impl TimerSlot {
    /// An idle slot.
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the slot to fire `delay_ms` after `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: u64, delay_ms: u64) {
        self.deadline = Some(now.saturating_add(delay_ms));
    }

    /// Cancel the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    pub const fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Fire if the deadline has passed. A fired slot becomes idle.
    pub fn poll(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A transition requested by [`HoverIntent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverChange {
    /// The open delay elapsed.
    Open,
    /// The close delay elapsed.
    Close,
}

/// Two-stage delayed open/close, driven by enter and leave signals.
///
/// An enter arms the open timer and cancels a pending close; a leave arms the
/// close timer and cancels a pending open. A zero delay transitions
/// immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverIntent {
    /// Delay between enter and open, in milliseconds.
    pub open_delay: u64,
    /// Delay between leave and close, in milliseconds.
    pub close_delay: u64,
    open_timer: TimerSlot,
    close_timer: TimerSlot,
}

impl HoverIntent {
    /// Create an idle hover intent with the given delays.
    pub const fn new(open_delay: u64, close_delay: u64) -> Self {
        Self {
            open_delay,
            close_delay,
            open_timer: TimerSlot::new(),
            close_timer: TimerSlot::new(),
        }
    }

    /// Pointer (or focus) entered. `is_open` is the current disclosure state.
    pub fn enter(&mut self, now: u64, is_open: bool) -> Option<HoverChange> {
        self.close_timer.cancel();
        if is_open {
            self.open_timer.cancel();
            return None;
        }
        if self.open_delay == 0 {
            self.open_timer.cancel();
            return Some(HoverChange::Open);
        }
        if !self.open_timer.is_armed() {
            self.open_timer.arm(now, self.open_delay);
        }
        None
    }

    /// Pointer (or focus) left. `is_open` is the current disclosure state.
    pub fn leave(&mut self, now: u64, is_open: bool) -> Option<HoverChange> {
        self.open_timer.cancel();
        if !is_open {
            self.close_timer.cancel();
            return None;
        }
        if self.close_delay == 0 {
            self.close_timer.cancel();
            return Some(HoverChange::Close);
        }
        if !self.close_timer.is_armed() {
            self.close_timer.arm(now, self.close_delay);
        }
        None
    }

    /// Report an elapsed timer, if any.
    pub fn poll(&mut self, now: u64) -> Option<HoverChange> {
        if self.open_timer.poll(now) {
            return Some(HoverChange::Open);
        }
        if self.close_timer.poll(now) {
            return Some(HoverChange::Close);
        }
        None
    }

    /// Whether a timer is pending.
    pub const fn is_pending(&self) -> bool {
        self.open_timer.is_armed() || self.close_timer.is_armed()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.open_timer.deadline(), self.close_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel both timers.
    pub fn cancel(&mut self) {
        self.open_timer.cancel();
        self.close_timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_fires_once() {
        let mut slot = TimerSlot::new();
        slot.arm(10, 5);
        assert!(!slot.poll(14));
        assert!(slot.poll(15));
        assert!(!slot.poll(100));
        assert!(!slot.is_armed());
    }

    #[test]
    fn rearm_replaces_deadline() {
        let mut slot = TimerSlot::new();
        slot.arm(0, 100);
        slot.arm(50, 100);
        assert_eq!(slot.deadline(), Some(150));
        assert!(slot.cancel());
        assert!(!slot.cancel());
    }

    #[test]
    fn leave_before_open_delay_never_opens() {
        let mut hover = HoverIntent::new(150, 150);
        assert_eq!(hover.enter(0, false), None);
        assert_eq!(hover.leave(100, false), None);
        assert!(!hover.is_pending());
        assert_eq!(hover.poll(10_000), None);
    }

    #[test]
    fn repeated_enter_does_not_push_deadline() {
        let mut hover = HoverIntent::new(150, 150);
        hover.enter(0, false);
        hover.enter(100, false);
        assert_eq!(hover.next_deadline(), Some(150));
    }

    #[test]
    fn zero_delays_are_immediate() {
        let mut hover = HoverIntent::new(0, 0);
        assert_eq!(hover.enter(0, false), Some(HoverChange::Open));
        assert_eq!(hover.leave(0, true), Some(HoverChange::Close));
        assert!(!hover.is_pending());
    }

    #[test]
    fn close_fires_after_close_delay() {
        let mut hover = HoverIntent::new(150, 300);
        hover.leave(1000, true);
        assert_eq!(hover.poll(1299), None);
        assert_eq!(hover.poll(1300), Some(HoverChange::Close));
    }
}
