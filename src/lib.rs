//! shop-locator: location resolution and proximity ranking
//!
//! A library and CLI tool that figures out where the user is and orders a
//! list of vendors by driving distance from that point.
//!
//! ## Features
//!
//! - Device location with a high-accuracy attempt and a coarse fallback
//! - Manual place search and reverse geocoding through Nominatim
//! - Durable last-known location that survives restarts
//! - Windowed OSRM table requests with partial-failure tolerance
//! - Stable distance ranking with a placeholder for unresolved vendors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shop_locator::distance::DistanceMatrixService;
//! use shop_locator::{rank, Config, Coordinate, Vendor};
//!
//! # async fn demo() -> shop_locator::Result<()> {
//! let origin = Coordinate::try_new(9.9312, 76.2673)?; // Kochi
//! let vendors = vec![
//!     Vendor::new("v1", Some(Coordinate::new(9.98, 76.28))),
//!     Vendor::new("v2", None),
//! ];
//!
//! let service = DistanceMatrixService::from_config(&Config::default())?;
//! let distances = service.compute_distances(origin, &vendors).await?;
//!
//! for item in rank::rank(&vendors, &distances, "Nearby") {
//!     println!("{}: {}", item.entity.id, item.label);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod device;
pub mod distance;
pub mod entity;
pub mod error;
pub mod format;
pub mod geo;
pub mod rank;
pub mod resolver;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinate;
pub use distance::{DistanceMatrixService, DistanceResult};
pub use entity::{Locatable, Vendor};
pub use error::{Error, Result};
pub use resolver::{LocationResolver, LocationSource, ResolvedLocation};
