//! Proximity ranking
//!
//! Pure merge and sort of entities against a computed [`DistanceResult`].

use crate::distance::DistanceResult;
use crate::entity::Locatable;
use serde::Serialize;
use std::cmp::Ordering;

/// An entity annotated with its distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub entity: T,
    /// Kilometers with one decimal digit, when a route was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<String>,
    /// Display text: "12.3 km", or the caller's placeholder
    pub label: String,
}

impl<T> Ranked<T> {
    /// Numeric distance for ordering; unresolved sorts as infinitely far
    pub fn distance_value(&self) -> f64 {
        self.distance_km
            .as_deref()
            .and_then(|km| km.parse::<f64>().ok())
            .filter(|km| !km.is_nan())
            .unwrap_or(f64::INFINITY)
    }
}

/// Annotate each entity with its distance, or `placeholder` when absent
pub fn merge<T: Locatable + Clone>(
    entities: &[T],
    distances: &DistanceResult,
    placeholder: &str,
) -> Vec<Ranked<T>> {
    entities
        .iter()
        .map(|entity| {
            let distance_km = distances.get(entity.id()).cloned();
            let label = match &distance_km {
                Some(km) => format!("{} km", km),
                None => placeholder.to_string(),
            };
            Ranked {
                entity: entity.clone(),
                distance_km,
                label,
            }
        })
        .collect()
}

/// Stable ascending sort by distance; unresolved entities go last in their
/// original relative order
pub fn sort_by_distance<T>(ranked: &mut [Ranked<T>]) {
    ranked.sort_by(|a, b| {
        a.distance_value()
            .partial_cmp(&b.distance_value())
            .unwrap_or(Ordering::Equal)
    });
}

/// Merge then sort
pub fn rank<T: Locatable + Clone>(
    entities: &[T],
    distances: &DistanceResult,
    placeholder: &str,
) -> Vec<Ranked<T>> {
    let mut ranked = merge(entities, distances, placeholder);
    sort_by_distance(&mut ranked);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::entity::Vendor;

    fn vendor(id: &str) -> Vendor {
        Vendor::new(id, Some(Coordinate::new(9.9, 76.2)))
    }

    fn distances(pairs: &[(&str, &str)]) -> DistanceResult {
        pairs
            .iter()
            .map(|(id, km)| (id.to_string(), km.to_string()))
            .collect()
    }

    fn ids<T: Locatable>(ranked: &[Ranked<T>]) -> Vec<&str> {
        ranked.iter().map(|r| r.entity.id()).collect()
    }

    #[test]
    fn test_merge_labels() {
        let entities = vec![vendor("a"), vendor("b")];
        let ranked = merge(&entities, &distances(&[("a", "3.2")]), "Nearby");

        assert_eq!(ranked[0].distance_km.as_deref(), Some("3.2"));
        assert_eq!(ranked[0].label, "3.2 km");
        assert_eq!(ranked[1].distance_km, None);
        assert_eq!(ranked[1].label, "Nearby");
    }

    #[test]
    fn test_sort_ascending_numeric() {
        let entities = vec![vendor("far"), vendor("near"), vendor("mid")];
        let d = distances(&[("far", "100.0"), ("near", "9.5"), ("mid", "20.0")]);

        let ranked = rank(&entities, &d, "Nearby");

        // Numeric, not lexicographic: "9.5" < "20.0" < "100.0"
        assert_eq!(ids(&ranked), vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_unresolved_sort_last_and_stable() {
        let entities = vec![vendor("x"), vendor("a"), vendor("y"), vendor("b"), vendor("z")];
        let d = distances(&[("a", "5.0"), ("b", "1.0")]);

        let ranked = rank(&entities, &d, "Calculating...");

        assert_eq!(ids(&ranked), vec!["b", "a", "x", "y", "z"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let entities = vec![vendor("first"), vendor("second"), vendor("third")];
        let d = distances(&[("first", "2.0"), ("second", "2.0"), ("third", "1.0")]);

        let ranked = rank(&entities, &d, "Nearby");

        assert_eq!(ids(&ranked), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_distance_value() {
        let ranked = merge(&[vendor("a"), vendor("b")], &distances(&[("a", "12.3")]), "-");
        approx::assert_relative_eq!(ranked[0].distance_value(), 12.3);
        assert!(ranked[1].distance_value().is_infinite());
    }

    #[test]
    fn test_ranked_serialization_flattens_entity() {
        let ranked = merge(&[vendor("a").with_name("Spice Mart")], &distances(&[("a", "1.5")]), "-");
        let json = serde_json::to_value(&ranked[0]).unwrap();

        assert_eq!(json["id"], "a");
        assert_eq!(json["name"], "Spice Mart");
        assert_eq!(json["distance_km"], "1.5");
        assert_eq!(json["label"], "1.5 km");
    }
}
