//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::{select_place_label, AddressFields, ForwardMatch, GeoBackend};
use serde::Deserialize;
use tracing::{debug, warn};

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    zoom: u8,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct ReverseResult {
    address: Option<AddressFields>,
}

impl NominatimBackend {
    /// Create a backend against a specific Nominatim instance
    pub fn with_base_url(base_url: &str, user_agent: &str, zoom: u8) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            zoom,
        })
    }

    /// Parse lat/lng strings to a validated coordinate
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinate> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lng)))?;
        Coordinate::try_new(lat, lng)
    }

    async fn search(&self, query: &str) -> Result<Option<ForwardMatch>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        let Some(result) = results.into_iter().next() else {
            return Ok(None);
        };

        let coordinate = Self::parse_coords(&result.lat, &result.lon)?;
        Ok(Some(ForwardMatch {
            coordinate,
            display_name: result.display_name,
        }))
    }

    async fn reverse_lookup(&self, coordinate: Coordinate) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom={}",
            self.base_url, coordinate.lat, coordinate.lng, self.zoom
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: ReverseResult = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        Ok(select_place_label(result.address.as_ref()))
    }
}

impl GeoBackend for NominatimBackend {
    async fn forward(&self, query: &str) -> Option<ForwardMatch> {
        match self.search(query).await {
            Ok(found) => {
                debug!(query, found = found.is_some(), "forward geocode finished");
                found
            }
            Err(e) => {
                warn!(query, error = %e, "forward geocode failed");
                None
            }
        }
    }

    async fn reverse(&self, coordinate: Coordinate) -> Option<String> {
        match self.reverse_lookup(coordinate).await {
            Ok(label) => label,
            Err(e) => {
                warn!(%coordinate, error = %e, "reverse geocode failed");
                None
            }
        }
    }
}
