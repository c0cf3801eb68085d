use serde::{Deserialize, Serialize};

use crate::capabilities::{GeolocationResult, HttpResult, MarkerHandle, TimerId, TimerOutput};
use crate::config::MapConfig;
use crate::dataset::PlaceId;
use crate::geo::Bounds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Session
    AppStarted,
    Configure(Box<MapConfig>),
    ReloadRequested,
    SessionEnded,
    #[serde(skip)]
    PositionLocated {
        result: GeolocationResult,
    },

    // Dataset
    #[serde(skip)]
    PlaceGeocoded {
        run: u64,
        index: usize,
        result: Box<HttpResult>,
    },

    // Map widget
    PanStarted,
    PanSettled {
        bounds: Bounds,
    },
    MapClicked,
    MarkerClicked {
        place: PlaceId,
    },
    MarkerPopupClosed {
        place: PlaceId,
    },
    MarkerHoverEntered {
        place: PlaceId,
    },
    MarkerHoverExited {
        place: PlaceId,
    },
    MarkerMounted {
        place: PlaceId,
        marker: MarkerHandle,
    },
    MarkerUnmounted {
        place: PlaceId,
    },

    // Place list
    ListItemClicked {
        place: PlaceId,
    },
    ListItemHoverEntered {
        place: PlaceId,
    },
    ListItemHoverExited {
        place: PlaceId,
    },

    // Cities and search
    CityChosen {
        index: usize,
    },
    SearchQueryChanged {
        query: String,
    },
    #[serde(skip)]
    SearchCompleted {
        query: String,
        result: Box<HttpResult>,
    },
    SuggestionChosen {
        index: usize,
    },

    #[serde(skip)]
    TimerFired {
        id: TimerId,
        output: TimerOutput,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::ReloadRequested => "reload_requested",
            Self::SessionEnded => "session_ended",
            Self::PositionLocated { .. } => "position_located",
            Self::PlaceGeocoded { .. } => "place_geocoded",
            Self::PanStarted => "pan_started",
            Self::PanSettled { .. } => "pan_settled",
            Self::MapClicked => "map_clicked",
            Self::MarkerClicked { .. } => "marker_clicked",
            Self::MarkerPopupClosed { .. } => "marker_popup_closed",
            Self::MarkerHoverEntered { .. } => "marker_hover_entered",
            Self::MarkerHoverExited { .. } => "marker_hover_exited",
            Self::MarkerMounted { .. } => "marker_mounted",
            Self::MarkerUnmounted { .. } => "marker_unmounted",
            Self::ListItemClicked { .. } => "list_item_clicked",
            Self::ListItemHoverEntered { .. } => "list_item_hover_entered",
            Self::ListItemHoverExited { .. } => "list_item_hover_exited",
            Self::CityChosen { .. } => "city_chosen",
            Self::SearchQueryChanged { .. } => "search_query_changed",
            Self::SearchCompleted { .. } => "search_completed",
            Self::SuggestionChosen { .. } => "suggestion_chosen",
            Self::TimerFired { .. } => "timer_fired",
        }
    }

    /// Events raised directly by the user, as opposed to capability answers
    /// and widget lifecycle notifications.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ReloadRequested
                | Self::PanStarted
                | Self::MapClicked
                | Self::MarkerClicked { .. }
                | Self::MarkerPopupClosed { .. }
                | Self::ListItemClicked { .. }
                | Self::CityChosen { .. }
                | Self::SearchQueryChanged { .. }
                | Self::SuggestionChosen { .. }
        )
    }
}
