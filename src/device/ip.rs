//! IP-based geolocation
//!
//! Uses ip-api.com as a network-based locator with a file-backed cache.
//! An IP lookup is inherently low accuracy, so high-accuracy requests are
//! reported as unavailable and the caller falls back to its next tier.

use crate::constants::storage::NAMESPACE;
use crate::device::{DeviceLocator, Position, PositionError, PositionOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// IP location service with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    api_url: String,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Cached position
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPosition {
    latitude: f64,
    longitude: f64,
    timestamp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl IpLocator {
    /// Create an IP locator caching under the user cache directory
    pub fn new(api_url: &str, cache_file: &str) -> Result<Self> {
        let cache_path = dirs::cache_dir().map(|p| p.join(NAMESPACE).join(cache_file));
        Self::build(api_url, cache_path)
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(api_url: &str, cache_path: PathBuf) -> Result<Self> {
        Self::build(api_url, Some(cache_path))
    }

    /// Create an IP locator without caching
    pub fn without_cache(api_url: &str) -> Result<Self> {
        Self::build(api_url, None)
    }

    fn build(api_url: &str, cache_path: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_url: api_url.to_string(),
            cache_path,
        })
    }

    /// Fetch position from ip-api.com
    async fn fetch_position(&self, timeout: Duration) -> std::result::Result<Position, PositionError> {
        let response = self
            .client
            .get(&self.api_url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PositionError::timeout()
                } else {
                    PositionError::unavailable(format!("IP location request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(PositionError::unavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            PositionError::unavailable(format!("Failed to parse IP location response: {}", e))
        })?;

        if data.status != "success" {
            let reason = data.message.unwrap_or_else(|| "unknown reason".to_string());
            return Err(PositionError::unavailable(format!(
                "IP location lookup failed: {}",
                reason
            )));
        }

        match (data.lat, data.lon) {
            (Some(lat), Some(lon)) => Ok(Position::new(lat, lon)),
            _ => Err(PositionError::unavailable("No coordinates in response")),
        }
    }

    /// Load the cached position if it is no older than `max_age`
    fn load_cache(&self, max_age: Duration) -> Option<Position> {
        if max_age.is_zero() {
            return None;
        }
        let cache_path = self.cache_path.as_ref()?;
        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedPosition = serde_json::from_str(&content).ok()?;

        let age = now_secs().saturating_sub(cached.timestamp);
        if age <= max_age.as_secs() {
            Some(Position::new(cached.latitude, cached.longitude))
        } else {
            None
        }
    }

    /// Save position to cache
    fn save_cache(&self, position: &Position) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedPosition {
            latitude: position.latitude,
            longitude: position.longitude,
            timestamp: now_secs(),
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl DeviceLocator for IpLocator {
    async fn request(&self, options: PositionOptions) -> std::result::Result<Position, PositionError> {
        if options.enable_high_accuracy {
            return Err(PositionError::unavailable(
                "IP geolocation cannot provide a high-accuracy fix",
            ));
        }

        if let Some(cached) = self.load_cache(options.maximum_age) {
            debug!("using cached IP position");
            return Ok(cached);
        }

        let position = self.fetch_position(options.timeout).await?;
        self.save_cache(&position);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::api::IP_API_URL;
    use crate::device::PositionErrorCode;
    use tempfile::TempDir;

    fn low_accuracy(maximum_age: Duration) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: false,
            timeout: Duration::from_secs(10),
            maximum_age,
        }
    }

    #[test]
    fn test_ip_locator_without_cache() {
        let locator = IpLocator::without_cache(IP_API_URL).unwrap();
        assert!(locator.cache_path.is_none());
    }

    #[test]
    fn test_cache_respects_max_age() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("test_cache.json");
        let locator = IpLocator::with_cache_path(IP_API_URL, cache_path).unwrap();

        assert!(locator.load_cache(Duration::from_secs(300)).is_none());

        locator.save_cache(&Position::new(9.9312, 76.2673));

        let loaded = locator.load_cache(Duration::from_secs(300)).unwrap();
        assert_eq!(loaded.latitude, 9.9312);

        // Zero tolerance never reads the cache
        assert!(locator.load_cache(Duration::ZERO).is_none());

        locator.clear_cache();
        assert!(locator.load_cache(Duration::from_secs(300)).is_none());
    }

    #[test]
    fn test_stale_cache_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("stale.json");
        let stale = CachedPosition {
            latitude: 1.0,
            longitude: 2.0,
            timestamp: now_secs() - 600,
        };
        fs::write(&cache_path, serde_json::to_string(&stale).unwrap()).unwrap();

        let locator = IpLocator::with_cache_path(IP_API_URL, cache_path).unwrap();
        assert!(locator.load_cache(Duration::from_secs(300)).is_none());
        assert!(locator.load_cache(Duration::from_secs(900)).is_some());
    }

    #[tokio::test]
    async fn test_high_accuracy_unavailable() {
        let locator = IpLocator::without_cache(IP_API_URL).unwrap();
        let options = PositionOptions {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::ZERO,
        };

        let err = locator.request(options).await.unwrap_err();
        assert_eq!(err.code, PositionErrorCode::PositionUnavailable);
    }

    #[tokio::test]
    async fn test_cached_position_served_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("cache.json");
        // Unroutable URL: any network attempt would fail the test
        let locator = IpLocator::with_cache_path("http://127.0.0.1:9/json", cache_path).unwrap();
        locator.save_cache(&Position::new(9.9312, 76.2673));

        let position = locator.request(low_accuracy(Duration::from_secs(300))).await.unwrap();
        assert_eq!(position, Position::new(9.9312, 76.2673));
    }
}
