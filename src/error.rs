//! Error types for shop-locator

use thiserror::Error;

/// Main error type for shop-locator operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Location permission denied. Please enable location access in your settings or enter your location manually.")]
    PermissionDenied,

    #[error("Location request timed out. Please check your connection and try again, or enter your location manually.")]
    LocationTimeout,

    #[error("Unable to retrieve your location. Please try again or enter your location manually.")]
    LocationUnavailable,

    #[error("Geolocation is not supported on this device. Please enter your location manually.")]
    Unsupported,

    #[error("Location not found: '{0}'. Please try a different search.")]
    NotFound(String),

    #[error("Location request superseded by a newer request")]
    Superseded,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for shop-locator operations
pub type Result<T> = std::result::Result<T, Error>;
