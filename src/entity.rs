//! Vendor locations supplied by the catalog
//!
//! The catalog owns these records; this crate only reads an id and an
//! optional coordinate from them.

use crate::coord::Coordinate;
use serde::{Deserialize, Serialize};

/// Anything that can be ranked by distance
pub trait Locatable {
    fn id(&self) -> &str;

    /// Validated coordinate, or `None` when absent or out of range
    fn coordinate(&self) -> Option<Coordinate>;
}

/// A vendor location as delivered by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Vendor {
    pub fn new(id: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            id: id.into(),
            name: None,
            latitude: coordinate.map(|c| c.lat),
            longitude: coordinate.map(|c| c.lng),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Locatable for Vendor {
    fn id(&self) -> &str {
        &self.id
    }

    fn coordinate(&self) -> Option<Coordinate> {
        let (lat, lng) = (self.latitude?, self.longitude?);
        Coordinate::try_new(lat, lng).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_coordinate() {
        let vendor = Vendor::new("a", Some(Coordinate::new(9.9, 76.2)));
        assert_eq!(vendor.coordinate(), Some(Coordinate::new(9.9, 76.2)));
    }

    #[test]
    fn test_vendor_partial_or_invalid_coordinate() {
        let json = r#"[
            {"id": "no-coords"},
            {"id": "lat-only", "latitude": 9.9},
            {"id": "bad", "latitude": 99.0, "longitude": 76.2},
            {"id": "null", "latitude": null, "longitude": null}
        ]"#;
        let vendors: Vec<Vendor> = serde_json::from_str(json).unwrap();
        assert_eq!(vendors.len(), 4);
        assert!(vendors.iter().all(|v| v.coordinate().is_none()));
    }
}
