//! Device geolocation capability
//!
//! Mirrors the platform geolocation contract: a request carries accuracy,
//! timeout and cache-tolerance options, and either yields a position or
//! fails with one of the standard error codes.

pub mod ip;

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Options for a single acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Maximum age of a cached position the caller will accept
    pub maximum_age: Duration,
}

/// A position fix reported by a locator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Validated coordinate of this fix
    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::try_new(self.latitude, self.longitude)
    }
}

/// Standard geolocation failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// Any code outside the standard set
    Other(u16),
}

impl PositionErrorCode {
    /// Map a numeric platform code (1, 2, 3) to its variant
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
            Self::Other(code) => *code,
        }
    }
}

/// A failed acquisition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionError {
    pub code: PositionErrorCode,
    pub message: String,
}

impl PositionError {
    pub fn new(code: PositionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(PositionErrorCode::PermissionDenied, "User denied geolocation")
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(PositionErrorCode::PositionUnavailable, message)
    }

    pub fn timeout() -> Self {
        Self::new(PositionErrorCode::Timeout, "Timeout expired")
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code.code(), self.message)
    }
}

/// Trait for device geolocation sources
pub trait DeviceLocator: Send + Sync {
    /// Whether this device can locate at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Request the current position
    fn request(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = std::result::Result<Position, PositionError>> + Send;
}

/// Get the configured device locator
pub fn get_locator(config: &Config) -> Result<ip::IpLocator> {
    ip::IpLocator::new(&config.device.ip_api_url, &config.device.cache_file)
}
