use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::capabilities::{Capabilities, MapOperation, TimerId, TimerOutput, TimerPurpose};
use crate::dataset::{PlaceId, Step};
use crate::event::Event;
use crate::geo::LatLon;
use crate::geocoder::{Geocoder, Resolution};
use crate::model::{Model, ViewModel};
use crate::schedule::Rearm;
use crate::selection::{Command, Trigger};

#[derive(Default)]
pub struct App;

impl App {
    fn start_build(model: &mut Model, caps: &Capabilities) {
        if let Some(id) = model.lookup_deadline.disarm() {
            caps.timer.cancel(id);
        }
        let step = model.builder.start();
        Self::drive_build(model, caps, step);
    }

    /// Issues the next lookup under its deadline, or installs the finished
    /// dataset. A lookup whose request cannot even be built counts as not
    /// found.
    fn drive_build(model: &mut Model, caps: &Capabilities, mut step: Step) {
        let geocoder = Geocoder::from_config(&model.config);
        loop {
            match step {
                Step::Lookup(pending) => match geocoder.request(&pending.address, None) {
                    Ok(lookup) => {
                        let (run, index) = (pending.run, pending.index);
                        caps.http
                            .get(lookup.url.as_str())
                            .header("Accept", "application/json")
                            .send(move |result| Event::PlaceGeocoded {
                                run,
                                index,
                                result: Box::new(result),
                            });
                        let rearm = model.lookup_deadline.arm();
                        Self::arm(caps, rearm, lookup.deadline);
                        return;
                    }
                    Err(e) => {
                        warn!(address = %pending.address, error = %e, "could not build lookup");
                        step = model
                            .builder
                            .record(pending.run, pending.index, Resolution::NotFound);
                    }
                },
                Step::Complete(places) => {
                    info!(count = places.len(), "place set ready");
                    model.install_places(places);
                    return;
                }
                Step::Stale => return,
            }
        }
    }

    fn end_session(model: &mut Model, caps: &Capabilities) {
        model.session_active = false;

        let armed = [
            model.lookup_deadline.disarm(),
            model.selection.reset(),
            model.settle.cancel(),
            model.search.debounce.cancel(),
        ];
        for id in armed.into_iter().flatten() {
            debug!(timer = %id, "cancelling timer at teardown");
            caps.timer.cancel(id);
        }

        if model.builder.abort() {
            debug!("in-flight geocoding abandoned");
        }
        model.markers.clear();
        model.open_popups.clear();
        model.view_sync.clear();
        model.search.suggestions.clear();
        model.search.in_flight = None;
        info!("map session ended");
    }

    fn arm(caps: &Capabilities, rearm: Rearm, after: Duration) {
        if let Some(stale) = rearm.cancel {
            caps.timer.cancel(stale);
        }
        let id = rearm.start;
        caps.timer
            .start(id, after, move |output| Event::TimerFired { id, output });
    }

    fn select(model: &mut Model, caps: &Capabilities, id: PlaceId) {
        let Some(position) = model.place(&id).map(|place| place.position) else {
            debug!(place = %id, "ignoring selection of unknown place");
            return;
        };
        Self::interact(model, caps, Trigger::Select { id, position });
    }

    fn interact_with_known(model: &mut Model, caps: &Capabilities, id: PlaceId, trigger: Trigger) {
        if model.is_known(&id) {
            Self::interact(model, caps, trigger);
        } else {
            debug!(place = %id, "ignoring event for unknown place");
        }
    }

    fn interact(model: &mut Model, caps: &Capabilities, trigger: Trigger) {
        let commands = model.selection.apply(trigger, model.config.grace_window());
        for command in commands {
            Self::execute(model, caps, command);
        }
        Self::flush_focus(model, caps);
    }

    fn execute(model: &mut Model, caps: &Capabilities, command: Command) {
        match command {
            Command::OpenPopup(id) => match model.markers.get(&id) {
                Some(marker) => {
                    model.open_popups.insert(id.clone());
                    caps.map.open_popup(marker, id);
                }
                None => debug!(place = %id, "no marker mounted, popup not opened"),
            },
            Command::ClosePopup(id) => {
                model.open_popups.remove(&id);
                if let Some(marker) = model.markers.get(&id) {
                    caps.map.close_popup(marker, id);
                }
            }
            Command::CloseAllPopups => {
                for id in std::mem::take(&mut model.open_popups) {
                    if let Some(marker) = model.markers.get(&id) {
                        caps.map.close_popup(marker, id);
                    }
                }
            }
            Command::Recenter(point) => model.view_sync.focus(point),
            Command::ClearRecenter => model.view_sync.clear(),
            Command::StartTimer { id, after } => {
                caps.timer
                    .start(id, after, move |output| Event::TimerFired { id, output });
            }
            Command::CancelTimer(id) => caps.timer.cancel(id),
        }
    }

    fn focus(model: &mut Model, caps: &Capabilities, point: LatLon) {
        model.view_sync.focus(point);
        Self::flush_focus(model, caps);
    }

    fn flush_focus(model: &mut Model, caps: &Capabilities) {
        if let Some(MapOperation::SetView { center, zoom }) =
            model.view_sync.flush(model.config.focus_zoom())
        {
            debug!(%center, zoom = zoom.value(), "recentering map");
            caps.map.set_view(center, zoom);
        }
    }

    fn search_changed(model: &mut Model, caps: &Capabilities, query: String) {
        model.search.query = query;
        if model.search.query.chars().count() < model.config.min_search_chars {
            model.search.suggestions.clear();
            model.search.in_flight = None;
            if let Some(id) = model.search.debounce.cancel() {
                caps.timer.cancel(id);
            }
            return;
        }

        let rearm = model.search.debounce.push(model.search.query.clone());
        Self::arm(caps, rearm, model.search.debounce.window());
    }

    fn run_search(model: &mut Model, caps: &Capabilities, query: String) {
        let geocoder = Geocoder::from_config(&model.config);
        match geocoder.request(&query, Some(model.config.search_limit)) {
            Ok(lookup) => {
                debug!(%query, "searching addresses");
                model.search.in_flight = Some(query.clone());
                caps.http
                    .get(lookup.url.as_str())
                    .header("Accept", "application/json")
                    .send(move |result| Event::SearchCompleted {
                        query,
                        result: Box::new(result),
                    });
            }
            Err(e) => warn!(%query, error = %e, "could not build search request"),
        }
    }

    fn timer_fired(model: &mut Model, caps: &Capabilities, id: TimerId) {
        match id.purpose {
            TimerPurpose::Grace => Self::interact(model, caps, Trigger::GraceElapsed(id)),
            TimerPurpose::Settle => match model.settle.elapsed(id) {
                Some(bounds) => {
                    model.viewport = Some(bounds);
                    model.refresh_visible();
                    debug!(visible = model.visible.len(), "viewport settled");
                }
                None => debug!(timer = %id, "ignoring superseded settle timer"),
            },
            TimerPurpose::Search => match model.search.debounce.elapsed(id) {
                Some(query) => Self::run_search(model, caps, query),
                None => debug!(timer = %id, "ignoring superseded search timer"),
            },
            TimerPurpose::Lookup => {
                if !model.lookup_deadline.fire(id) {
                    debug!(timer = %id, "ignoring superseded lookup deadline");
                    return;
                }
                if let Some((run, index)) = model.builder.pending() {
                    warn!(run, index, "geocoding lookup timed out");
                    let step = model.builder.record(run, index, Resolution::NotFound);
                    Self::drive_build(model, caps, step);
                }
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user = event.is_user_initiated(),
            "handling event"
        );

        match event {
            Event::AppStarted => {
                model.session_active = true;
                info!(seed = model.config.seed.len(), "map session started");
                Self::start_build(model, caps);
                caps.geolocation
                    .current_position(|result| Event::PositionLocated { result });
                caps.render.render();
            }
            Event::Configure(config) => {
                match config.validate() {
                    Ok(()) => {
                        model.apply_config(*config);
                        info!("configuration applied");
                        if model.session_active {
                            Self::start_build(model, caps);
                        }
                        caps.render.render();
                    }
                    Err(e) => error!(error = %e, "rejected configuration"),
                }
            }
            event if !model.session_active => {
                debug!(event = event.name(), "no active session, event ignored");
            }
            event => Self::session_event(model, caps, event),
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}

impl App {
    fn session_event(model: &mut Model, caps: &Capabilities, event: Event) {
        match event {
            // Handled before the session check.
            Event::AppStarted | Event::Configure(_) => {}

            Event::ReloadRequested => {
                Self::start_build(model, caps);
                caps.render.render();
            }

            Event::SessionEnded => {
                Self::end_session(model, caps);
                caps.render.render();
            }

            Event::PositionLocated { result } => match result {
                Ok(position) => {
                    info!(%position, "centering on device position");
                    Self::focus(model, caps, position);
                    caps.render.render();
                }
                Err(error) => warn!(%error, "device position unavailable, keeping initial view"),
            },

            Event::PlaceGeocoded { run, index, result } => {
                if !model.builder.expects(run, index) {
                    debug!(run, index, "ignoring stale geocoding answer");
                    return;
                }
                if let Some(id) = model.lookup_deadline.disarm() {
                    caps.timer.cancel(id);
                }
                let geocoder = Geocoder::from_config(&model.config);
                let address = model.builder.address(index).unwrap_or_default().to_string();
                let resolution = geocoder.resolve(&address, *result);
                let step = model.builder.record(run, index, resolution);
                Self::drive_build(model, caps, step);
                caps.render.render();
            }

            Event::PanStarted => {
                Self::interact(model, caps, Trigger::PanStart);
                caps.render.render();
            }

            Event::PanSettled { bounds } => {
                let rearm = model.settle.push(bounds);
                Self::arm(caps, rearm, model.settle.window());
            }

            Event::MapClicked => {
                Self::interact(model, caps, Trigger::MapClick);
                caps.render.render();
            }

            Event::MarkerClicked { place } | Event::ListItemClicked { place } => {
                Self::select(model, caps, place);
                caps.render.render();
            }

            Event::MarkerPopupClosed { place } => {
                model.open_popups.remove(&place);
                Self::interact_with_known(model, caps, place.clone(), Trigger::PopupClosed(place));
                caps.render.render();
            }

            Event::MarkerHoverEntered { place } | Event::ListItemHoverEntered { place } => {
                Self::interact_with_known(model, caps, place.clone(), Trigger::Hover(place));
                caps.render.render();
            }

            Event::MarkerHoverExited { place } | Event::ListItemHoverExited { place } => {
                Self::interact_with_known(model, caps, place.clone(), Trigger::Unhover(place));
                caps.render.render();
            }

            Event::MarkerMounted { place, marker } => {
                if model.is_known(&place) {
                    model.markers.mount(place, marker);
                } else {
                    debug!(%place, "ignoring marker for unknown place");
                }
            }

            Event::MarkerUnmounted { place } => {
                model.markers.unmount(&place);
                model.open_popups.remove(&place);
            }

            Event::CityChosen { index } => match model.config.cities.get(index) {
                Some(city) => {
                    debug!(city = %city.name, "jumping to city");
                    let position = city.position;
                    Self::focus(model, caps, position);
                }
                None => debug!(index, "ignoring unknown city"),
            },

            Event::SearchQueryChanged { query } => {
                Self::search_changed(model, caps, query);
                caps.render.render();
            }

            Event::SearchCompleted { query, result } => {
                if model.search.in_flight.as_deref() == Some(query.as_str()) {
                    model.search.in_flight = None;
                }
                if query != model.search.query {
                    debug!(%query, "dropping stale search answer");
                    return;
                }
                let geocoder = Geocoder::from_config(&model.config);
                model.search.suggestions = geocoder.suggestions(&query, *result);
                caps.render.render();
            }

            Event::SuggestionChosen { index } => {
                let Some(chosen) = model.search.suggestions.get(index).cloned() else {
                    debug!(index, "ignoring unknown suggestion");
                    return;
                };
                if let Some(id) = model.search.debounce.cancel() {
                    caps.timer.cancel(id);
                }
                model.search.query = chosen.label;
                model.search.suggestions.clear();
                model.search.in_flight = None;
                Self::focus(model, caps, chosen.position);
                caps.render.render();
            }

            Event::TimerFired { id, output } => match output {
                TimerOutput::Elapsed => {
                    Self::timer_fired(model, caps, id);
                    caps.render.render();
                }
                TimerOutput::Cancelled => debug!(timer = %id, "timer cancelled"),
            },
        }
    }
}
