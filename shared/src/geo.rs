use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
    #[error("Bounds corners are inverted: south-west {sw} is not below/left of north-east {ne}")]
    InvertedBounds { sw: LatLon, ne: LatLon },
    #[error("invalid zoom: {0}")]
    InvalidZoom(f64),
}

/// Validated latitude/longitude pair. Values arriving from the shell go
/// through [`LatLon::new`] as well.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLatLon")]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Skips validation; only for compile-time constants known to be in range.
    pub(crate) const fn from_trusted(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }
}

#[derive(Deserialize)]
struct RawLatLon {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawLatLon> for LatLon {
    type Error = CoordinateError;

    fn try_from(raw: RawLatLon) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl std::fmt::Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Axis-aligned viewport rectangle as reported by the map widget.
///
/// Containment is inclusive on every edge.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    south_west: LatLon,
    north_east: LatLon,
}

impl Bounds {
    pub fn new(south_west: LatLon, north_east: LatLon) -> Result<Self, CoordinateError> {
        if south_west.lat > north_east.lat || south_west.lon > north_east.lon {
            return Err(CoordinateError::InvertedBounds {
                sw: south_west,
                ne: north_east,
            });
        }
        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Smallest rectangle covering both corners, in any order.
    #[must_use]
    pub fn spanning(a: LatLon, b: LatLon) -> Self {
        Self {
            south_west: LatLon {
                lat: a.lat.min(b.lat),
                lon: a.lon.min(b.lon),
            },
            north_east: LatLon {
                lat: a.lat.max(b.lat),
                lon: a.lon.max(b.lon),
            },
        }
    }

    #[must_use]
    pub const fn south_west(&self) -> LatLon {
        self.south_west
    }

    #[must_use]
    pub const fn north_east(&self) -> LatLon {
        self.north_east
    }

    #[must_use]
    pub fn contains(&self, point: LatLon) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lon >= self.south_west.lon
            && point.lon <= self.north_east.lon
    }
}

#[derive(Deserialize)]
struct RawBounds {
    south_west: LatLon,
    north_east: LatLon,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = CoordinateError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.south_west, raw.north_east)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct Zoom(f64);

impl TryFrom<f64> for Zoom {
    type Error = CoordinateError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Zoom {
    pub fn new(value: f64) -> Result<Self, CoordinateError> {
        if !value.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&value) {
            return Err(CoordinateError::InvalidZoom(value));
        }
        Ok(Self(value))
    }

    pub(crate) const fn from_trusted(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> LatLon {
        LatLon::new(lat, lon).unwrap()
    }

    #[test]
    fn coordinate_rejects_non_finite() {
        assert_eq!(LatLon::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
        assert_eq!(
            LatLon::new(0.0, f64::INFINITY),
            Err(CoordinateError::NonFinite)
        );
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(matches!(
            LatLon::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            LatLon::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
        assert!(LatLon::new(90.0, 180.0).is_ok());
        assert!(LatLon::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn bounds_contains_is_inclusive_on_edges() {
        let bounds = Bounds::new(at(43.0, 5.0), at(44.0, 6.0)).unwrap();

        assert!(bounds.contains(at(43.5, 5.5)));
        assert!(bounds.contains(at(43.0, 5.0)));
        assert!(bounds.contains(at(44.0, 6.0)));
        assert!(bounds.contains(at(43.0, 6.0)));
        assert!(!bounds.contains(at(42.9999, 5.5)));
        assert!(!bounds.contains(at(43.5, 6.0001)));
    }

    #[test]
    fn bounds_reject_inverted_corners() {
        let result = Bounds::new(at(44.0, 5.0), at(43.0, 6.0));
        assert!(matches!(result, Err(CoordinateError::InvertedBounds { .. })));
    }

    #[test]
    fn spanning_orders_corners() {
        let bounds = Bounds::spanning(at(44.0, 6.0), at(43.0, 5.0));
        assert_eq!(bounds.south_west(), at(43.0, 5.0));
        assert_eq!(bounds.north_east(), at(44.0, 6.0));
    }

    #[test]
    fn zoom_rejects_invalid() {
        assert!(Zoom::new(-1.0).is_err());
        assert!(Zoom::new(26.0).is_err());
        assert!(Zoom::new(f64::NAN).is_err());
        assert_eq!(Zoom::new(15.0).unwrap().value(), 15.0);
    }

    #[test]
    fn deserializing_validates_coordinates() {
        let ok: LatLon = serde_json::from_str(r#"{"lat":43.2965,"lon":5.3698}"#).unwrap();
        assert_eq!(ok, at(43.2965, 5.3698));

        for bad in [
            r#"{"lat":91.0,"lon":0.0}"#,
            r#"{"lat":0.0,"lon":-180.5}"#,
            r#"{"lat":0.0}"#,
        ] {
            assert!(serde_json::from_str::<LatLon>(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn deserializing_rejects_inverted_bounds() {
        let inverted = r#"{
            "south_west": {"lat":44.0,"lon":5.0},
            "north_east": {"lat":43.0,"lon":6.0}
        }"#;
        let error = serde_json::from_str::<Bounds>(inverted).unwrap_err();
        assert!(error.to_string().contains("inverted"));

        let out_of_range = r#"{
            "south_west": {"lat":-95.0,"lon":5.0},
            "north_east": {"lat":43.0,"lon":6.0}
        }"#;
        assert!(serde_json::from_str::<Bounds>(out_of_range).is_err());

        let bounds = Bounds::new(at(43.0, 5.0), at(44.0, 6.0)).unwrap();
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(serde_json::from_str::<Bounds>(&json).unwrap(), bounds);
    }

    #[test]
    fn deserializing_rejects_out_of_range_zoom() {
        assert!(serde_json::from_str::<Zoom>("30.0").is_err());
        assert_eq!(serde_json::from_str::<Zoom>("15.0").unwrap().value(), 15.0);
    }
}
