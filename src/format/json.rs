//! JSON output formatter

use crate::coord::Coordinate;
use crate::entity::Vendor;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::rank::Ranked;
use crate::resolver::ResolvedLocation;
use serde::Serialize;

/// JSON formatter - outputs pretty-printed JSON
pub struct JsonFormatter;

#[derive(Serialize)]
struct RankingDocument<'a> {
    origin: Coordinate,
    vendors: &'a [Ranked<Vendor>],
}

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }

    fn location(&self, location: &ResolvedLocation) -> Result<String> {
        Ok(serde_json::to_string_pretty(location)?)
    }

    fn ranking(&self, origin: Coordinate, ranked: &[Ranked<Vendor>]) -> Result<String> {
        Ok(serde_json::to_string_pretty(&RankingDocument {
            origin,
            vendors: ranked,
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LocationSource;

    #[test]
    fn test_location_json() {
        let location = ResolvedLocation {
            coordinate: Coordinate::new(9.9312, 76.2673),
            place_name: None,
            source: LocationSource::Device,
        };

        let output = JsonFormatter.location(&location).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["source"], "device");
        assert_eq!(parsed["coordinate"]["lat"], 9.9312);
        assert!(parsed.get("place_name").is_none());
    }

    #[test]
    fn test_ranking_json() {
        let ranked = vec![Ranked {
            entity: Vendor::new("a", None),
            distance_km: None,
            label: "Nearby".to_string(),
        }];

        let output = JsonFormatter.ranking(Coordinate::new(1.0, 2.0), &ranked).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["origin"]["lng"], 2.0);
        assert_eq!(parsed["vendors"][0]["id"], "a");
        assert_eq!(parsed["vendors"][0]["label"], "Nearby");
    }
}
