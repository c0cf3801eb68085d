use serde::{Deserialize, Serialize};

use crux_core::capability::{Capability, CapabilityContext, Operation};

use crate::dataset::PlaceId;
use crate::geo::{LatLon, Zoom};

/// Shell-side handle of a mounted marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerHandle(pub u64);

/// Commands accepted by the map widget. All of them are fire-and-forget; the
/// widget reports consequences (moves, popup closes) back as events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapOperation {
    SetView { center: LatLon, zoom: Zoom },
    OpenPopup { marker: MarkerHandle, place: PlaceId },
    ClosePopup { marker: MarkerHandle, place: PlaceId },
}

impl Operation for MapOperation {
    type Output = ();
}

pub struct MapWidget<Ev> {
    context: CapabilityContext<MapOperation, Ev>,
}

impl<Ev> Capability<Ev> for MapWidget<Ev> {
    type Operation = MapOperation;
    type MappedSelf<MappedEv> = MapWidget<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        MapWidget::new(self.context.map_event(f))
    }
}

impl<Ev> MapWidget<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<MapOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn set_view(&self, center: LatLon, zoom: Zoom) {
        self.notify(MapOperation::SetView { center, zoom });
    }

    pub fn open_popup(&self, marker: MarkerHandle, place: PlaceId) {
        self.notify(MapOperation::OpenPopup { marker, place });
    }

    pub fn close_popup(&self, marker: MarkerHandle, place: PlaceId) {
        self.notify(MapOperation::ClosePopup { marker, place });
    }

    fn notify(&self, operation: MapOperation) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
