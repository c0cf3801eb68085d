//! Address lookup against a GeoJSON search service (api-adresse style).
//!
//! The service answers `GET <base>?q=<text>` with a `FeatureCollection` whose
//! features carry `Point` geometries in `[longitude, latitude]` order and a
//! human-readable `label` property. The first usable feature is
//! authoritative.

use std::time::Duration;

use geojson::{FeatureCollection, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::capabilities::{check_timeout, HttpResult, RequestError, ValidatedUrl};
use crate::config::MapConfig;
use crate::geo::LatLon;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Found(LatLon),
    NotFound,
}

/// One candidate match returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub position: LatLon,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("could not build lookup request: {0}")]
    InvalidRequest(RequestError),
    #[error("lookup transport failed: {0}")]
    Transport(String),
    #[error("lookup returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed lookup response: {reason}")]
    Malformed { reason: String },
}

/// A checked lookup: where to send it and how long to wait for the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub url: ValidatedUrl,
    pub deadline: Duration,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    base: String,
    timeout_ms: u64,
}

impl Geocoder {
    pub fn new(base: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base: base.into(),
            timeout_ms,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(&config.geocoder_url, config.request_timeout_ms)
    }

    /// Builds the single lookup for `query`.
    pub fn request(&self, query: &str, limit: Option<u8>) -> Result<Lookup, GeocodeError> {
        check_timeout(self.timeout_ms).map_err(GeocodeError::InvalidRequest)?;

        let mut params = vec![("q", query.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let url = Url::parse_with_params(&self.base, &params).map_err(|e| {
            GeocodeError::InvalidRequest(RequestError::InvalidUrl {
                url: self.base.clone(),
                reason: e.to_string(),
            })
        })?;

        Ok(Lookup {
            url: ValidatedUrl::new(url).map_err(GeocodeError::InvalidRequest)?,
            deadline: Duration::from_millis(self.timeout_ms),
        })
    }

    /// Interprets the answer to a lookup for `address`. Every failure is
    /// logged and reported as [`Resolution::NotFound`]; a failed lookup only
    /// ever costs the one entry.
    pub fn resolve(&self, address: &str, result: HttpResult) -> Resolution {
        match candidates(result) {
            Ok(found) => match found.into_iter().next() {
                Some(first) => {
                    debug!(%address, position = %first.position, "address resolved");
                    Resolution::Found(first.position)
                }
                None => {
                    warn!(%address, "no coordinates found for address");
                    Resolution::NotFound
                }
            },
            Err(error) => {
                warn!(%address, %error, "address lookup failed");
                Resolution::NotFound
            }
        }
    }

    /// Interprets the answer to a free-text search.
    pub fn suggestions(&self, query: &str, result: HttpResult) -> Vec<Suggestion> {
        match candidates(result) {
            Ok(found) => {
                debug!(%query, count = found.len(), "search answered");
                found
            }
            Err(error) => {
                warn!(%query, %error, "address search failed");
                Vec::new()
            }
        }
    }
}

fn candidates(result: HttpResult) -> Result<Vec<Suggestion>, GeocodeError> {
    let response = result.map_err(|e| GeocodeError::Transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::Status {
            status: status.into(),
        });
    }
    parse_candidates(response.body().map(Vec::as_slice).unwrap_or_default())
}

/// Extracts every usable point feature, in service order. Features without
/// a valid point geometry are skipped.
pub fn parse_candidates(body: &[u8]) -> Result<Vec<Suggestion>, GeocodeError> {
    let collection: FeatureCollection =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Malformed {
            reason: e.to_string(),
        })?;

    let found = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let position = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::Point(coords)) if coords.len() >= 2 => {
                    LatLon::new(coords[1], coords[0]).ok()
                }
                _ => None,
            };
            let Some(position) = position else {
                debug!("skipping feature without a usable point geometry");
                return None;
            };
            let label = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("label"))
                .and_then(|v| v.as_str())
                .map_or_else(|| position.to_string(), str::to_string);
            Some(Suggestion { label, position })
        })
        .collect();

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_http::http::StatusCode;
    use crux_http::testing::ResponseBuilder;

    const BODY: &str = r#"{
        "type": "FeatureCollection",
        "version": "draft",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [5.3698, 43.2965] },
                "properties": { "label": "1 Pl. Sadi-Carnot 13002 Marseille", "score": 0.97 }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [5.38, 43.30] },
                "properties": { "label": "Place Sadi Carnot 13002 Marseille" }
            }
        ],
        "query": "1 Pl. Sadi-Carnot"
    }"#;

    fn geocoder() -> Geocoder {
        Geocoder::new("https://geo.example.com/search/", 5_000)
    }

    fn ok(body: &str) -> HttpResult {
        Ok(ResponseBuilder::ok().body(body.as_bytes().to_vec()).build())
    }

    #[test]
    fn builds_encoded_lookup_url() {
        let lookup = geocoder()
            .request("117 La Canebière, 13001 Marseille", None)
            .unwrap();
        let url = Url::parse(lookup.url.as_str()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("geo.example.com"));
        assert_eq!(url.path(), "/search/");
        assert_eq!(
            pairs,
            [("q".to_string(), "117 La Canebière, 13001 Marseille".to_string())]
        );
        assert_eq!(lookup.deadline, Duration::from_millis(5_000));
    }

    #[test]
    fn search_request_carries_limit() {
        let lookup = geocoder().request("canebiere", Some(5)).unwrap();
        assert!(lookup.url.as_str().ends_with("q=canebiere&limit=5"));
    }

    #[test]
    fn rejects_private_geocoder_host() {
        let result = Geocoder::new("http://localhost/search/", 1_000).request("x", None);
        assert!(matches!(
            result,
            Err(GeocodeError::InvalidRequest(RequestError::PrivateNetworkBlocked { .. }))
        ));
    }

    #[test]
    fn rejects_unbounded_timeout() {
        let result = Geocoder::new("https://geo.example.com/search/", 200_000).request("x", None);
        assert_eq!(
            result,
            Err(GeocodeError::InvalidRequest(RequestError::InvalidTimeout {
                timeout_ms: 200_000
            }))
        );
    }

    #[test]
    fn first_feature_is_authoritative() {
        let resolution = geocoder().resolve("addr", ok(BODY));
        assert_eq!(
            resolution,
            Resolution::Found(LatLon::new(43.2965, 5.3698).unwrap())
        );
    }

    #[test]
    fn empty_collection_is_not_found() {
        let body = r#"{"type": "FeatureCollection", "features": []}"#;
        assert_eq!(geocoder().resolve("nowhere", ok(body)), Resolution::NotFound);
    }

    #[test]
    fn transport_failure_is_not_found() {
        let result = Err(crux_http::Error::Timeout);
        assert_eq!(geocoder().resolve("addr", result), Resolution::NotFound);
    }

    #[test]
    fn malformed_or_failed_response_is_not_found() {
        assert_eq!(geocoder().resolve("addr", ok("<html>")), Resolution::NotFound);

        let server_error = ResponseBuilder::with_status(StatusCode::ServiceUnavailable)
            .body(BODY.as_bytes().to_vec())
            .build();
        assert_eq!(
            geocoder().resolve("addr", Ok(server_error)),
            Resolution::NotFound
        );
    }

    #[test]
    fn parses_suggestions_in_order_and_skips_unusable_features() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": { "label": "nowhere" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [500.0, 43.0] }, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [7.26608, 43.70313] }, "properties": { "label": "Nice" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2.3522, 48.8566] }, "properties": null }
            ]
        }"#;

        let found = parse_candidates(body.as_bytes()).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].label, "Nice");
        assert_eq!(found[0].position, LatLon::new(43.70313, 7.26608).unwrap());
        assert_eq!(found[1].label, "(48.85660, 2.35220)");
    }

    #[test]
    fn failed_search_yields_no_suggestions() {
        let result = Err(crux_http::Error::Io("connection refused".into()));
        assert!(geocoder().suggestions("nice", result).is_empty());
        assert_eq!(geocoder().suggestions("sadi", ok(BODY)).len(), 2);
    }
}
