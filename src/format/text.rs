//! Human-readable text output formatter

use crate::coord::Coordinate;
use crate::entity::Vendor;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::rank::Ranked;
use crate::resolver::ResolvedLocation;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn location(&self, location: &ResolvedLocation) -> Result<String> {
        let place = location.place_name.as_deref().unwrap_or("(unnamed)");
        Ok(format!(
            "{}\nCoordinate: {}\nSource: {}\n",
            place, location.coordinate, location.source
        ))
    }

    fn ranking(&self, origin: Coordinate, ranked: &[Ranked<Vendor>]) -> Result<String> {
        let mut output = format!("Vendors by distance from {}:\n", origin);

        for (position, item) in ranked.iter().enumerate() {
            let name = item.entity.name.as_deref().unwrap_or(&item.entity.id);
            output.push_str(&format!("  {:>3}. {:<32} {}\n", position + 1, name, item.label));
        }

        Ok(output)
    }
}
