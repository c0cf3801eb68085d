#![allow(dead_code)]

use crux_core::testing::AppTester;
use crux_http::testing::ResponseBuilder;
use placemap::capabilities::{
    HttpResult, MapOperation, MarkerHandle, TimerId, TimerOperation, TimerPurpose,
};
use placemap::{App, Effect, Event, LatLon, MapConfig, Model, PlaceId, SeedEntry};

pub type Tester = AppTester<App, Effect>;

pub const A: (f64, f64) = (43.2965, 5.3698);
pub const C: (f64, f64) = (43.2930, 5.3810);

pub fn at((lat, lon): (f64, f64)) -> LatLon {
    LatLon::new(lat, lon).unwrap()
}

pub fn id(name: &str) -> PlaceId {
    PlaceId::new(name)
}

pub fn config() -> MapConfig {
    MapConfig {
        seed: vec![
            SeedEntry::new("A", "addr-a"),
            SeedEntry::new("B", "addr-bad"),
            SeedEntry::new("C", "addr-c"),
        ],
        ..MapConfig::default()
    }
}

/// A `200` answer carrying `body`.
pub fn ok(body: &str) -> Box<HttpResult> {
    Box::new(Ok(ResponseBuilder::ok().body(body.as_bytes().to_vec()).build()))
}

pub fn found((lat, lon): (f64, f64)) -> Box<HttpResult> {
    ok(&format!(
        r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","geometry":{{"type":"Point","coordinates":[{lon},{lat}]}},"properties":{{"label":"somewhere"}}}}]}}"#
    ))
}

pub fn not_found() -> Box<HttpResult> {
    ok(r#"{"type":"FeatureCollection","features":[]}"#)
}

pub fn http_requests(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect()
}

pub fn geolocation_requested(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Geolocation(_)))
}

pub fn map_ops(effects: &[Effect]) -> Vec<MapOperation> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::MapWidget(request) => Some(request.operation.clone()),
            _ => None,
        })
        .collect()
}

pub fn timer_ops(effects: &[Effect]) -> Vec<TimerOperation> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => Some(request.operation.clone()),
            _ => None,
        })
        .collect()
}

pub fn started(effects: &[Effect], purpose: TimerPurpose) -> TimerId {
    timer_ops(effects)
        .into_iter()
        .find_map(|op| match op {
            TimerOperation::Start { id, .. } if id.purpose == purpose => Some(id),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no {purpose:?} timer started"))
}

pub fn renders(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(_)))
}

/// A started session whose dataset resolved to `[A, C]` (B dropped), with
/// markers 1 and 2 mounted.
pub fn loaded_session(app: &Tester) -> Model {
    let mut model = Model::default();
    app.update(Event::Configure(Box::new(config())), &mut model);
    app.update(Event::AppStarted, &mut model);

    for (index, result) in [found(A), not_found(), found(C)].into_iter().enumerate() {
        app.update(
            Event::PlaceGeocoded {
                run: 1,
                index,
                result,
            },
            &mut model,
        );
    }

    app.update(
        Event::MarkerMounted {
            place: id("A"),
            marker: MarkerHandle(1),
        },
        &mut model,
    );
    app.update(
        Event::MarkerMounted {
            place: id("C"),
            marker: MarkerHandle(2),
        },
        &mut model,
    );
    model
}
