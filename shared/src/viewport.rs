//! Viewport filtering and the settle debounce.

use std::time::Duration;

use crate::capabilities::{TimerId, TimerPurpose};
use crate::dataset::Place;
use crate::geo::Bounds;
use crate::schedule::{Rearm, TimerSlot};

/// Places whose coordinate lies inside `viewport` (edges included), in the
/// order of `places`.
pub fn filter(places: &[Place], viewport: &Bounds) -> Vec<Place> {
    places
        .iter()
        .filter(|place| viewport.contains(place.position))
        .cloned()
        .collect()
}

/// The visible set for an optional last-sampled viewport. Until the map has
/// reported a viewport everything is visible.
pub fn visible_set(places: &[Place], viewport: Option<&Bounds>) -> Vec<Place> {
    match viewport {
        Some(bounds) => filter(places, bounds),
        None => places.to_vec(),
    }
}

/// Keeps only the latest value pushed within a quiet window.
///
/// Every push replaces the pending value and re-arms the slot; when the armed
/// timer fires, the value pushed last is released. Intermediate values are
/// dropped, never queued.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    window: Duration,
    slot: TimerSlot,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    pub fn new(purpose: TimerPurpose, window: Duration) -> Self {
        Self {
            window,
            slot: TimerSlot::new(purpose),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) -> Rearm {
        self.pending = Some(value);
        self.slot.arm()
    }

    /// Releases the pending value if `id` is the armed timer.
    pub fn elapsed(&mut self, id: TimerId) -> Option<T> {
        if self.slot.fire(id) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Drops the pending value; returns the timer to cancel, if any.
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending = None;
        self.slot.disarm()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }
}
