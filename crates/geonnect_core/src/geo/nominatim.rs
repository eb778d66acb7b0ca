//! Nominatim-backed geocoding provider.
//!
//! # Responsibility
//! - Implement the provider seam over the OSM Nominatim search API.
//! - Map transport and decode failures into typed geocode errors.
//!
//! # Invariants
//! - An HTTP 200 with zero places is a valid empty result, not an error.
//! - Requests always carry an identifying User-Agent, per Nominatim usage
//!   policy.

use crate::geo::provider::{GeocodeCandidate, GeocodeError, GeocodeResult, GeocodingProvider};
use log::warn;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER_ID: &str = "nominatim";
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("geonnect/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;
const RESULT_LIMIT: u32 = 5;

/// One place entry from the Nominatim search response.
///
/// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Blocking HTTP provider against a Nominatim instance.
pub struct NominatimProvider {
    client: Client,
    base_url: String,
}

impl NominatimProvider {
    /// Creates a provider against the public OSM instance.
    pub fn new() -> GeocodeResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a provider against a custom instance (self-hosted or test).
    pub fn with_base_url(base_url: impl Into<String>) -> GeocodeResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| GeocodeError::unavailable(PROVIDER_ID, err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl GeocodingProvider for NominatimProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn geocode(&self, query: &str) -> GeocodeResult<Vec<GeocodeCandidate>> {
        let url = format!("{}/search", self.base_url);
        let limit = RESULT_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|err| {
                warn!(
                    "event=geocode_request module=geo status=error provider={PROVIDER_ID} error={err}"
                );
                GeocodeError::unavailable(PROVIDER_ID, err.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                "event=geocode_request module=geo status=error provider={PROVIDER_ID} http_status={status}"
            );
            return Err(GeocodeError::unavailable(
                PROVIDER_ID,
                format!("unexpected HTTP status {status}"),
            ));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .map_err(|err| GeocodeError::invalid_response(PROVIDER_ID, err.to_string()))?;

        places.into_iter().map(parse_place).collect()
    }
}

fn parse_place(place: NominatimPlace) -> GeocodeResult<GeocodeCandidate> {
    let latitude: f64 = place.lat.parse().map_err(|_| {
        GeocodeError::invalid_response(PROVIDER_ID, format!("unparseable lat `{}`", place.lat))
    })?;
    let longitude: f64 = place.lon.parse().map_err(|_| {
        GeocodeError::invalid_response(PROVIDER_ID, format!("unparseable lon `{}`", place.lon))
    })?;

    Ok(GeocodeCandidate {
        latitude,
        longitude,
        label: place.display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_place, NominatimPlace};
    use crate::geo::provider::GeocodeError;

    #[test]
    fn parses_string_coordinates() {
        let place = NominatimPlace {
            lat: "-23.5613".to_string(),
            lon: "-46.6565".to_string(),
            display_name: Some("Avenida Paulista".to_string()),
        };
        let candidate = parse_place(place).unwrap();
        assert!((candidate.latitude + 23.5613).abs() < 1e-9);
        assert!((candidate.longitude + 46.6565).abs() < 1e-9);
        assert_eq!(candidate.label.as_deref(), Some("Avenida Paulista"));
    }

    #[test]
    fn rejects_unparseable_latitude() {
        let place = NominatimPlace {
            lat: "not-a-number".to_string(),
            lon: "0".to_string(),
            display_name: None,
        };
        assert!(matches!(
            parse_place(place),
            Err(GeocodeError::InvalidResponse { .. })
        ));
    }
}
