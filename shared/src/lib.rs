//! Shared core of a map place browser: a list of named places kept in step
//! with their markers, hover and selection highlighting, and viewport
//! filtering. Platform shells render the map and answer capability requests.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod dataset;
pub mod event;
pub mod focus;
pub mod geo;
pub mod geocoder;
pub mod markers;
pub mod model;
pub mod schedule;
pub mod selection;
pub mod viewport;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, MapConfig, SeedEntry};
pub use crux_core::{render::Render, App as CruxApp};
pub use dataset::{Place, PlaceId};
pub use event::Event;
pub use geo::{Bounds, CoordinateError, LatLon, Zoom};
pub use model::{Model, ViewModel};
