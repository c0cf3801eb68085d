//! Everything the core asks of its host: view refreshes, HTTP, the map
//! widget, one-shot timers and the device position.

mod geolocation;
mod http;
mod map;
mod timer;

pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, GeolocationResult,
};
pub use self::http::{
    check_timeout, HttpResult, RequestError, ValidatedUrl, MAX_TIMEOUT_MS, MAX_URL_LENGTH,
};
pub use self::map::{MapOperation, MapWidget, MarkerHandle};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput, TimerPurpose};

// Crux's built-in Render covers view updates; no wrapper needed.
pub use crux_core::render::Render;
pub use crux_http::Http;

// The `Effect` derive names the app type `App` in the code it generates.
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub map: MapWidget<Event>,
    pub timer: Timer<Event>,
    pub geolocation: Geolocation<Event>,
}
