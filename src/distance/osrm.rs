//! OSRM table backend
//!
//! `GET {base}/table/v1/{profile}/{lng,lat;lng,lat;...}?sources=0&annotations=distance`
//! with the origin as the first coordinate.

use crate::coord::Coordinate;
use crate::distance::WindowExecutor;
use crate::error::{Error, Result};
use serde::Deserialize;

/// OSRM `table` service client
#[derive(Debug, Clone)]
pub struct OsrmTable {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

/// OSRM table response
#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
}

impl OsrmTable {
    /// Client for a specific OSRM instance and profile
    pub fn with_base_url(base_url: &str, profile: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
        })
    }

    fn table_url(&self, origin: Coordinate, destinations: &[Coordinate]) -> String {
        let coords = std::iter::once(origin)
            .chain(destinations.iter().copied())
            .map(|c| c.lng_lat())
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?sources=0&annotations=distance",
            self.base_url, self.profile, coords
        )
    }
}

impl WindowExecutor for OsrmTable {
    async fn execute(&self, origin: Coordinate, destinations: &[Coordinate]) -> Result<Vec<Option<f64>>> {
        let url = self.table_url(origin, destinations);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Routing(format!("OSRM request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Routing(format!(
                "OSRM returned status: {}",
                response.status()
            )));
        }

        let table: TableResponse = response
            .json()
            .await
            .map_err(|e| Error::Routing(format!("Failed to parse OSRM response: {}", e)))?;

        if table.code != "Ok" {
            return Err(Error::Routing(format!(
                "OSRM returned code {}: {}",
                table.code,
                table.message.unwrap_or_default()
            )));
        }

        table
            .distances
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| Error::Routing("OSRM response has no distance row".to_string()))
    }
}
