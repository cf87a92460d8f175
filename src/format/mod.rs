//! Output formatters
//!
//! Provides trait-based output formatting for resolved locations and
//! ranked vendor lists.

pub mod json;
pub mod text;

use crate::coord::Coordinate;
use crate::entity::Vendor;
use crate::error::Result;
use crate::rank::Ranked;
use crate::resolver::ResolvedLocation;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a resolved location
    fn location(&self, location: &ResolvedLocation) -> Result<String>;

    /// Format a ranked vendor list computed from `origin`
    fn ranking(&self, origin: Coordinate, ranked: &[Ranked<Vendor>]) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [&json::JsonFormatter as &dyn OutputFormatter, &text::TextFormatter]
        .into_iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}
