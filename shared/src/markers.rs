use std::collections::BTreeMap;

use tracing::debug;

use crate::capabilities::MarkerHandle;
use crate::dataset::PlaceId;

/// Place id to marker handle, kept in step with the shell's mount and
/// unmount notifications.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    handles: BTreeMap<PlaceId, MarkerHandle>,
}

impl MarkerRegistry {
    /// Records a mounted marker, returning the handle it replaced.
    pub fn mount(&mut self, place: PlaceId, marker: MarkerHandle) -> Option<MarkerHandle> {
        let previous = self.handles.insert(place.clone(), marker);
        if let Some(old) = previous {
            debug!(%place, old = old.0, new = marker.0, "marker remounted");
        }
        previous
    }

    pub fn unmount(&mut self, place: &PlaceId) -> Option<MarkerHandle> {
        self.handles.remove(place)
    }

    pub fn get(&self, place: &PlaceId) -> Option<MarkerHandle> {
        self.handles.get(place).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}
