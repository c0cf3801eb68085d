//! Last-scheduled-timer-wins bookkeeping.
//!
//! Timers live in the shell, so the core cannot stop a callback that is
//! already queued. Instead every purpose owns a [`TimerSlot`] that remembers
//! the single id it currently expects; arming the slot retires the previous
//! id, and a firing is honoured only if it carries the expected id.

use crate::capabilities::{TimerId, TimerPurpose};

/// Result of arming a slot: the timer to start, and the one it superseded
/// (which the caller should cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rearm {
    pub start: TimerId,
    pub cancel: Option<TimerId>,
}

#[derive(Debug, Clone)]
pub struct TimerSlot {
    purpose: TimerPurpose,
    generation: u64,
    armed: Option<TimerId>,
}

impl TimerSlot {
    pub fn new(purpose: TimerPurpose) -> Self {
        Self {
            purpose,
            generation: 0,
            armed: None,
        }
    }

    pub fn arm(&mut self) -> Rearm {
        self.generation += 1;
        let start = TimerId {
            purpose: self.purpose,
            generation: self.generation,
        };
        let cancel = self.armed.replace(start);
        Rearm { start, cancel }
    }

    /// Consumes the firing if `id` is the armed timer. Stale or foreign ids
    /// leave the slot untouched.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.armed == Some(id) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    /// Forgets the armed timer, returning it so the caller can cancel it.
    pub fn disarm(&mut self) -> Option<TimerId> {
        self.armed.take()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_supersedes_previous_timer() {
        let mut slot = TimerSlot::new(TimerPurpose::Grace);

        let first = slot.arm();
        assert_eq!(first.cancel, None);

        let second = slot.arm();
        assert_eq!(second.cancel, Some(first.start));
        assert_ne!(first.start, second.start);

        assert!(!slot.fire(first.start), "stale timer must be ignored");
        assert!(slot.is_armed());
        assert!(slot.fire(second.start));
        assert!(!slot.is_armed());
    }

    #[test]
    fn firing_twice_is_ignored() {
        let mut slot = TimerSlot::new(TimerPurpose::Settle);
        let armed = slot.arm();
        assert!(slot.fire(armed.start));
        assert!(!slot.fire(armed.start));
    }

    #[test]
    fn disarm_invalidates_pending_timer() {
        let mut slot = TimerSlot::new(TimerPurpose::Search);
        let armed = slot.arm();
        assert_eq!(slot.disarm(), Some(armed.start));
        assert!(!slot.fire(armed.start));
        assert_eq!(slot.disarm(), None);
    }

    #[test]
    fn foreign_purpose_is_ignored() {
        let mut grace = TimerSlot::new(TimerPurpose::Grace);
        let mut settle = TimerSlot::new(TimerPurpose::Settle);
        let g = grace.arm();
        let _ = settle.arm();
        assert!(!settle.fire(g.start));
        assert!(grace.fire(g.start));
    }
}
