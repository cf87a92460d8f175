//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, geocoding, routing, storage};

/// Default Nominatim instance
pub const DEFAULT_GEOCODING_URL: &str = api::NOMINATIM_URL;

/// Default User-Agent sent to Nominatim (required by its usage policy)
pub const DEFAULT_USER_AGENT: &str = concat!("shop-locator/", env!("CARGO_PKG_VERSION"));

/// Default reverse geocoding zoom (city level)
pub const DEFAULT_ZOOM: u8 = geocoding::CITY_ZOOM;

/// Default OSRM instance
pub const DEFAULT_ROUTING_URL: &str = api::OSRM_URL;

/// Default OSRM profile
pub const DEFAULT_PROFILE: &str = routing::PROFILE;

/// Default destinations per table request
pub const DEFAULT_WINDOW_SIZE: usize = routing::WINDOW_SIZE;

/// Default IP geolocation endpoint
pub const DEFAULT_IP_API_URL: &str = api::IP_API_URL;

/// Default IP location cache file name
pub const DEFAULT_CACHE_FILE: &str = storage::IP_LOCATION_CACHE_FILE;

/// Default label for vendors without a distance
pub const DEFAULT_PLACEHOLDER: &str = "Nearby";

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = storage::NAMESPACE;
