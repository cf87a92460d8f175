//! Geographic coordinates
//!
//! Every coordinate that crosses a module boundary is validated first:
//! latitude in [-90, 90], longitude in [-180, 180], both finite.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create new coordinates without validation
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create coordinates, rejecting out-of-range or non-finite values
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self::new(lat, lng);
        coord.validate()?;
        Ok(coord)
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Encode as `"longitude,latitude"`, the order routing engines expect
    pub fn lng_lat(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(Coordinate::try_new(9.9312, 76.2673).is_ok());
        assert!(Coordinate::try_new(90.0, 180.0).is_ok());
        assert!(Coordinate::try_new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Coordinate::try_new(90.1, 0.0).is_err());
        assert!(Coordinate::try_new(0.0, -180.5).is_err());
        assert!(Coordinate::try_new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::try_new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_lng_lat_order() {
        let coord = Coordinate::new(9.9312, 76.2673);
        assert_eq!(coord.lng_lat(), "76.2673,9.9312");
    }

    #[test]
    fn test_display() {
        let coord = Coordinate::new(9.9312, 76.2673);
        assert_eq!(coord.to_string(), "(9.931200, 76.267300)");
    }
}
