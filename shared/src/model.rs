use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::capabilities::TimerPurpose;
use crate::config::{City, MapConfig};
use crate::dataset::{BuildState, DatasetBuilder, Place, PlaceId, Progress};
use crate::focus::ViewSync;
use crate::geo::{Bounds, LatLon};
use crate::geocoder::Suggestion;
use crate::markers::MarkerRegistry;
use crate::schedule::TimerSlot;
use crate::selection::SelectionState;
use crate::viewport::{self, Debounce};

#[derive(Debug, Clone)]
pub struct SearchState {
    pub query: String,
    pub debounce: Debounce<String>,
    pub suggestions: Vec<Suggestion>,
    /// Query of the lookup currently awaiting an answer.
    pub in_flight: Option<String>,
}

impl SearchState {
    fn new(config: &MapConfig) -> Self {
        Self {
            query: String::new(),
            debounce: Debounce::new(TimerPurpose::Search, config.search_debounce()),
            suggestions: Vec::new(),
            in_flight: None,
        }
    }
}

/// Everything one map session knows.
#[derive(Debug, Clone)]
pub struct Model {
    pub config: MapConfig,
    pub session_active: bool,
    pub builder: DatasetBuilder,
    /// Deadline of the geocoding lookup in flight.
    pub lookup_deadline: TimerSlot,
    /// Full resolved place set, in seed order.
    pub places: Vec<Place>,
    pub visible: Vec<Place>,
    /// Last viewport sampled after a settle.
    pub viewport: Option<Bounds>,
    pub settle: Debounce<Bounds>,
    pub selection: SelectionState,
    pub markers: MarkerRegistry,
    pub open_popups: BTreeSet<PlaceId>,
    pub view_sync: ViewSync,
    pub search: SearchState,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(MapConfig::default())
    }
}

impl Model {
    pub fn with_config(config: MapConfig) -> Self {
        Self {
            builder: DatasetBuilder::new(config.seed.clone()),
            lookup_deadline: TimerSlot::new(TimerPurpose::Lookup),
            settle: Debounce::new(TimerPurpose::Settle, config.settle_debounce()),
            search: SearchState::new(&config),
            config,
            session_active: false,
            places: Vec::new(),
            visible: Vec::new(),
            viewport: None,
            selection: SelectionState::default(),
            markers: MarkerRegistry::default(),
            open_popups: BTreeSet::new(),
            view_sync: ViewSync::default(),
        }
    }

    /// Swaps in an already validated configuration. Timer windows apply from
    /// the next arm; the seed applies from the next build.
    pub fn apply_config(&mut self, config: MapConfig) {
        self.settle.set_window(config.settle_debounce());
        self.search.debounce.set_window(config.search_debounce());
        self.builder.reseed(config.seed.clone());
        self.config = config;
    }

    pub fn place(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|place| &place.id == id)
    }

    pub fn is_known(&self, id: &PlaceId) -> bool {
        self.place(id).is_some()
    }

    /// Installs a freshly built place set and drops state that points at
    /// places no longer in it.
    pub fn install_places(&mut self, places: Vec<Place>) {
        self.places = places;
        let known: BTreeSet<PlaceId> = self.places.iter().map(|p| p.id.clone()).collect();
        self.selection.retain(|id| known.contains(id));
        self.open_popups.retain(|id| known.contains(id));
        self.refresh_visible();
    }

    pub fn refresh_visible(&mut self) {
        self.visible = viewport::visible_set(&self.places, self.viewport.as_ref());
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlaceRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub selected: bool,
    pub hovered: bool,
    /// Selected or hovered. Selection wins visually when both apply.
    pub highlighted: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub popup_open: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CityView {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&City> for CityView {
    fn from(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            lat: city.position.lat(),
            lon: city.position.lon(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchView {
    pub query: String,
    pub suggestions: Vec<String>,
    pub searching: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoadingView {
    pub state: BuildState,
    pub progress: Progress,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub rows: Vec<PlaceRow>,
    pub markers: Vec<MarkerView>,
    pub cities: Vec<CityView>,
    pub search: SearchView,
    pub loading: LoadingView,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub initial_center: LatLon,
    pub initial_zoom: f64,
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        let selection = &model.selection;

        let rows = model
            .visible
            .iter()
            .map(|place| {
                let selected = selection.is_selected(&place.id);
                let hovered = selection.is_hovered(&place.id);
                PlaceRow {
                    id: place.id.to_string(),
                    name: place.name().to_string(),
                    address: place.address.clone(),
                    lat: place.position.lat(),
                    lon: place.position.lon(),
                    selected,
                    hovered,
                    highlighted: selected || hovered,
                }
            })
            .collect();

        let markers = model
            .places
            .iter()
            .map(|place| MarkerView {
                id: place.id.to_string(),
                lat: place.position.lat(),
                lon: place.position.lon(),
                popup_open: model.open_popups.contains(&place.id),
            })
            .collect();

        Self {
            rows,
            markers,
            cities: model.config.cities.iter().map(CityView::from).collect(),
            search: SearchView {
                query: model.search.query.clone(),
                suggestions: model
                    .search
                    .suggestions
                    .iter()
                    .map(|s| s.label.clone())
                    .collect(),
                searching: model.search.debounce.pending().is_some()
                    || model.search.in_flight.is_some(),
            },
            loading: LoadingView {
                state: model.builder.state(),
                progress: model.builder.progress(),
            },
            selected: selection.selected().map(ToString::to_string),
            hovered: selection.hovered().map(ToString::to_string),
            initial_center: model.config.initial_center,
            initial_zoom: model.config.initial_zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Trigger;
    use std::time::Duration;

    fn place(name: &str, lat: f64, lon: f64) -> Place {
        Place {
            id: PlaceId::new(name),
            address: format!("{name} street"),
            position: LatLon::new(lat, lon).unwrap(),
        }
    }

    #[test]
    fn default_model_uses_default_config() {
        let model = Model::default();
        assert_eq!(model.config, MapConfig::default());
        assert!(!model.session_active);
        assert_eq!(model.builder.state(), BuildState::Idle);
        assert_eq!(model.builder.progress().total, model.config.seed.len());
    }

    #[test]
    fn install_shows_everything_until_a_viewport_is_known() {
        let mut model = Model::default();
        model.install_places(vec![place("a", 43.3, 5.4), place("b", 48.8, 2.3)]);
        assert_eq!(model.visible.len(), 2);

        model.viewport = Some(
            Bounds::new(LatLon::new(43.0, 5.0).unwrap(), LatLon::new(44.0, 6.0).unwrap()).unwrap(),
        );
        model.refresh_visible();
        assert_eq!(model.visible, vec![place("a", 43.3, 5.4)]);
        assert_eq!(model.places.len(), 2);
    }

    #[test]
    fn install_drops_selection_of_missing_place() {
        let mut model = Model::default();
        model.install_places(vec![place("a", 1.0, 1.0)]);
        model.selection.apply(
            Trigger::Select {
                id: PlaceId::new("a"),
                position: LatLon::new(1.0, 1.0).unwrap(),
            },
            Duration::from_millis(500),
        );
        model.open_popups.insert(PlaceId::new("a"));

        model.install_places(vec![place("b", 2.0, 2.0)]);
        assert_eq!(model.selection.selected(), None);
        assert!(model.open_popups.is_empty());
    }

    #[test]
    fn view_rows_follow_visible_set_and_flags() {
        let mut model = Model::default();
        model.install_places(vec![place("a", 1.0, 1.0), place("b", 2.0, 2.0)]);
        model.selection.apply(Trigger::Hover(PlaceId::new("b")), Duration::from_millis(500));
        model.open_popups.insert(PlaceId::new("b"));

        let view = ViewModel::from_model(&model);
        assert_eq!(view.rows.len(), 2);
        assert!(!view.rows[0].highlighted);
        assert!(view.rows[1].hovered && view.rows[1].highlighted && !view.rows[1].selected);
        assert!(view.markers[1].popup_open);
        assert_eq!(view.hovered.as_deref(), Some("b"));
        assert_eq!(view.cities.len(), model.config.cities.len());
        assert_eq!(view.initial_zoom, 13.0);
    }
}
