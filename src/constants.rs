//! Centralized constants for the shop-locator crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Public OSRM routing server
    pub const OSRM_URL: &str = "http://router.project-osrm.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Geocoding parameters
pub mod geocoding {
    /// Nominatim zoom level for city-level reverse lookups
    pub const CITY_ZOOM: u8 = 10;

    /// Label used when an address block exists but has no recognized field
    pub const UNKNOWN_LOCATION: &str = "Unknown Location";
}

/// Device acquisition tiers
pub mod device {
    use std::time::Duration;

    /// Tier 1 (high accuracy) timeout
    pub const HIGH_ACCURACY_TIMEOUT: Duration = Duration::from_secs(15);

    /// Tier 1 accepts no cached position
    pub const HIGH_ACCURACY_MAX_AGE: Duration = Duration::ZERO;

    /// Tier 2 (low accuracy) timeout
    pub const LOW_ACCURACY_TIMEOUT: Duration = Duration::from_secs(10);

    /// Tier 2 accepts a cached position up to 5 minutes old
    pub const LOW_ACCURACY_MAX_AGE: Duration = Duration::from_secs(300);
}

/// Distance matrix batching
pub mod routing {
    /// Destinations per table request, bounded by practical URL length
    pub const WINDOW_SIZE: usize = 50;

    /// Default OSRM routing profile
    pub const PROFILE: &str = "driving";
}

/// Durable storage keys
pub mod storage {
    /// Namespace shared by every persisted key
    pub const NAMESPACE: &str = "shop-locator";

    /// Last resolved coordinate (JSON)
    pub const LAST_COORDINATE_KEY: &str = "shop-locator.last_coordinate";

    /// Last resolved place label (plain text)
    pub const LAST_PLACE_KEY: &str = "shop-locator.last_place";

    /// Storage file name in the data directory
    pub const LOCATION_FILE_NAME: &str = "location.json";

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}
