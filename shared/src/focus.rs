//! Turns a requested focus point into a single map recenter.

use crate::capabilities::MapOperation;
use crate::geo::{LatLon, Zoom};

/// Holds at most one pending focus point. Flushing issues a `SetView` and
/// clears it; redundant moves are left for the widget to skip.
#[derive(Debug, Clone, Default)]
pub struct ViewSync {
    pending: Option<LatLon>,
}

impl ViewSync {
    pub fn focus(&mut self, point: LatLon) {
        self.pending = Some(point);
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn flush(&mut self, zoom: Zoom) -> Option<MapOperation> {
        let center = self.pending.take()?;
        Some(MapOperation::SetView { center, zoom })
    }

    pub fn pending(&self) -> Option<LatLon> {
        self.pending
    }
}
