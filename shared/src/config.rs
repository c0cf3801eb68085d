//! Session configuration and the bundled demo datasets.
//!
//! Everything here is static data: the core reads it when a session starts
//! and never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::geo::{LatLon, Zoom};
use crate::geocoder::{GeocodeError, Geocoder};

pub const DEFAULT_GEOCODER_URL: &str = "https://api-adresse.data.gouv.fr/search/";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_GRACE_WINDOW_MS: u64 = 500;
pub const DEFAULT_SETTLE_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_FOCUS_ZOOM: f64 = 15.0;
pub const DEFAULT_INITIAL_ZOOM: f64 = 13.0;
pub const DEFAULT_INITIAL_CENTER: (f64, f64) = (43.675_819, 7.289_429);
pub const DEFAULT_MIN_SEARCH_CHARS: usize = 3;
pub const DEFAULT_SEARCH_LIMIT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("geocoder cannot issue lookups: {0}")]
    UnusableGeocoder(GeocodeError),
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("{field} must be within [0, 25], got {value}")]
    ZoomOutOfRange { field: &'static str, value: String },
    #[error("min_search_chars must be at least 1")]
    EmptySearchThreshold,
    #[error("duplicate place name in seed data: {0}")]
    DuplicatePlace(String),
}

/// A named place awaiting geocoding.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SeedEntry {
    pub name: String,
    pub address: String,
}

impl SeedEntry {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Quick-jump destination shown above the place list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct City {
    pub name: String,
    pub position: LatLon,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    pub geocoder_url: String,
    pub request_timeout_ms: u64,
    pub grace_window_ms: u64,
    pub settle_debounce_ms: u64,
    pub search_debounce_ms: u64,
    pub focus_zoom: f64,
    pub initial_center: LatLon,
    pub initial_zoom: f64,
    pub min_search_chars: usize,
    pub search_limit: u8,
    pub seed: Vec<SeedEntry>,
    pub cities: Vec<City>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            grace_window_ms: DEFAULT_GRACE_WINDOW_MS,
            settle_debounce_ms: DEFAULT_SETTLE_DEBOUNCE_MS,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
            initial_center: known(DEFAULT_INITIAL_CENTER.0, DEFAULT_INITIAL_CENTER.1),
            initial_zoom: DEFAULT_INITIAL_ZOOM,
            min_search_chars: DEFAULT_MIN_SEARCH_CHARS,
            search_limit: DEFAULT_SEARCH_LIMIT,
            seed: default_seed(),
            cities: default_cities(),
        }
    }
}

impl MapConfig {
    /// Checks the configuration the way the session will use it: the
    /// geocoder settings must yield a lookup the request path accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Geocoder::from_config(self)
            .request("", None)
            .map_err(ConfigError::UnusableGeocoder)?;

        for (field, value) in [
            ("grace_window_ms", self.grace_window_ms),
            ("settle_debounce_ms", self.settle_debounce_ms),
            ("search_debounce_ms", self.search_debounce_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }

        for (field, value) in [
            ("focus_zoom", self.focus_zoom),
            ("initial_zoom", self.initial_zoom),
        ] {
            if Zoom::new(value).is_err() {
                return Err(ConfigError::ZoomOutOfRange {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if self.min_search_chars == 0 {
            return Err(ConfigError::EmptySearchThreshold);
        }

        let mut seen = HashSet::with_capacity(self.seed.len());
        for entry in &self.seed {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicatePlace(entry.name.clone()));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn grace_window(&self) -> Duration {
        Duration::from_millis(self.grace_window_ms)
    }

    #[must_use]
    pub fn settle_debounce(&self) -> Duration {
        Duration::from_millis(self.settle_debounce_ms)
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Zoom used for every focus command. Falls back to the default when the
    /// configured value is out of range; `validate` rejects such configs anyway.
    #[must_use]
    pub fn focus_zoom(&self) -> Zoom {
        Zoom::new(self.focus_zoom).unwrap_or(Zoom::from_trusted(DEFAULT_FOCUS_ZOOM))
    }
}

// Demo data is hard-coded and always in range.
const fn known(lat: f64, lon: f64) -> LatLon {
    LatLon::from_trusted(lat, lon)
}

#[must_use]
pub fn default_seed() -> Vec<SeedEntry> {
    vec![
        SeedEntry::new(
            "Le Réfectoire - 13 Solidaires",
            "171 Chem. de la Madrague-Ville, 13002 Marseille",
        ),
        SeedEntry::new("Le République", "1 Pl. Sadi-Carnot, 13002 Marseille"),
        SeedEntry::new("Le plan de A à Z", "117 La Canebière, 13001 Marseille"),
        SeedEntry::new(
            "Le Restaurant De La Gaité",
            "35 Rue du Dr Léon Perrin, 13003 Marseille",
        ),
        SeedEntry::new("Restaurant Social Noga", "74 Cr Julien, 13006 Marseille"),
        SeedEntry::new("L'Après M", "214 Chem. de Sainte-Marthe, 13014 Marseille"),
    ]
}

#[must_use]
pub fn default_cities() -> Vec<City> {
    [
        ("Nice", 43.703_13, 7.266_08),
        ("Cannes", 43.551_35, 7.012_75),
        ("Monaco", 43.731_41, 7.420_82),
        ("Lyon", 45.757_81, 4.832_01),
        ("Paris", 48.8566, 2.3522),
    ]
    .into_iter()
    .map(|(name, lat, lon)| City {
        name: name.to_string(),
        position: known(lat, lon),
    })
    .collect()
}
