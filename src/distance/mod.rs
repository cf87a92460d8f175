//! Batched travel distances
//!
//! Destinations are split into fixed-size windows. Each window becomes one
//! one-to-many table request with the origin as the sole source. Windows
//! run strictly one after another; a failed window is logged and skipped,
//! so the result holds whatever subset of distances could be obtained.

pub mod osrm;

use crate::config::Config;
use crate::constants::routing::WINDOW_SIZE;
use crate::coord::Coordinate;
use crate::entity::Locatable;
use crate::error::Result;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, warn};

/// Entity id -> distance in kilometers, one decimal digit
pub type DistanceResult = BTreeMap<String, String>;

/// One batch of destinations sent in a single table request
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'a> {
    pub index: usize,
    pub ids: Vec<&'a str>,
    pub destinations: Vec<Coordinate>,
}

/// Partition coordinate-bearing entities into windows of `size`
///
/// Entities without a valid coordinate are skipped.
pub fn windows<T: Locatable>(entities: &[T], size: usize) -> Vec<Window<'_>> {
    let eligible: Vec<(&str, Coordinate)> = entities
        .iter()
        .filter_map(|e| e.coordinate().map(|c| (e.id(), c)))
        .collect();

    eligible
        .chunks(size.max(1))
        .enumerate()
        .map(|(index, chunk)| Window {
            index,
            ids: chunk.iter().map(|(id, _)| *id).collect(),
            destinations: chunk.iter().map(|(_, c)| *c).collect(),
        })
        .collect()
}

/// Format meters as kilometers with exactly one decimal digit
///
/// Ties round up (250 m is "0.3"); meters are never negative.
pub fn format_km(meters: f64) -> String {
    format!("{:.1}", (meters / 100.0).round() / 10.0)
}

/// Map a table row onto a window's entities
///
/// `row[0]` is origin to origin and is discarded; `row[k + 1]` belongs to
/// the k-th destination. Missing, null, negative or non-finite values mean
/// no route and the entity is left out.
pub fn window_distances(window: &Window<'_>, row: &[Option<f64>]) -> Vec<(String, String)> {
    window
        .ids
        .iter()
        .enumerate()
        .filter_map(|(k, id)| {
            let meters = row.get(k + 1).copied().flatten()?;
            (meters.is_finite() && meters >= 0.0).then(|| (id.to_string(), format_km(meters)))
        })
        .collect()
}

/// Executes a single window against a routing backend
pub trait WindowExecutor: Send + Sync {
    /// Return the origin row of the distance matrix for `origin` followed
    /// by `destinations`, in meters
    fn execute(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<Option<f64>>>> + Send;
}

/// Run `windows` one at a time, merging every successful window
pub async fn compute_with<E: WindowExecutor>(
    executor: &E,
    origin: Coordinate,
    windows: &[Window<'_>],
) -> DistanceResult {
    let mut result = DistanceResult::new();

    for window in windows {
        debug!(window = window.index, size = window.ids.len(), "requesting distance window");
        match executor.execute(origin, &window.destinations).await {
            Ok(row) => result.extend(window_distances(window, &row)),
            Err(e) => warn!(window = window.index, error = %e, "distance window failed, skipping"),
        }
    }

    result
}

/// Distance matrix service over a window executor
#[derive(Debug, Clone)]
pub struct DistanceMatrixService<E> {
    executor: E,
    window_size: usize,
}

impl DistanceMatrixService<osrm::OsrmTable> {
    /// Build the configured OSRM-backed service
    pub fn from_config(config: &Config) -> Result<Self> {
        let executor = osrm::OsrmTable::with_base_url(&config.routing.base_url, &config.routing.profile)?;
        Ok(Self::new(executor, config.routing.window_size))
    }
}

impl<E: WindowExecutor> DistanceMatrixService<E> {
    pub fn new(executor: E, window_size: usize) -> Self {
        Self {
            executor,
            window_size: window_size.max(1),
        }
    }

    pub fn with_default_window(executor: E) -> Self {
        Self::new(executor, WINDOW_SIZE)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Distances from `origin` to every coordinate-bearing entity
    ///
    /// Best-effort: window failures only shrink the result. The only error
    /// is an invalid origin.
    pub async fn compute_distances<T: Locatable>(
        &self,
        origin: Coordinate,
        entities: &[T],
    ) -> Result<DistanceResult> {
        origin.validate()?;
        let windows = windows(entities, self.window_size);
        debug!(windows = windows.len(), "computing distances");
        Ok(compute_with(&self.executor, origin, &windows).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Vendor;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records each window and answers with 1 km per destination position
    #[derive(Default)]
    struct RecordingExecutor {
        requests: Mutex<Vec<usize>>,
        fail_windows: Vec<usize>,
    }

    impl WindowExecutor for RecordingExecutor {
        async fn execute(&self, _origin: Coordinate, destinations: &[Coordinate]) -> Result<Vec<Option<f64>>> {
            let index = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(destinations.len() + 1);
                requests.len() - 1
            };
            if self.fail_windows.contains(&index) {
                return Err(Error::Routing("status 502".to_string()));
            }
            let mut row = vec![Some(0.0)];
            row.extend((1..=destinations.len()).map(|k| Some(k as f64 * 1000.0)));
            Ok(row)
        }
    }

    fn vendors(count: usize) -> Vec<Vendor> {
        (0..count)
            .map(|i| Vendor::new(format!("v{}", i), Some(Coordinate::new(9.0 + i as f64 * 0.001, 76.0))))
            .collect()
    }

    fn origin() -> Coordinate {
        Coordinate::new(9.9312, 76.2673)
    }

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(12345.0), "12.3");
        assert_eq!(format_km(49.0), "0.0");
        assert_eq!(format_km(1_000_000.0), "1000.0");
        assert_eq!(format_km(0.0), "0.0");
        assert_eq!(format_km(2500.0), "2.5");
    }

    #[test]
    fn test_format_km_rounds_ties_up() {
        assert_eq!(format_km(250.0), "0.3");
        assert_eq!(format_km(1250.0), "1.3");
        assert_eq!(format_km(2250.0), "2.3");
        assert_eq!(format_km(1249.0), "1.2");
    }

    #[test]
    fn test_windows_skip_missing_coordinates() {
        let mut entities = vendors(3);
        entities.insert(1, Vendor::new("nowhere", None));

        let windows = windows(&entities, 2);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].ids, vec!["v0", "v1"]);
        assert_eq!(windows[1].ids, vec!["v2"]);
        assert_eq!(windows[1].index, 1);
    }

    #[test]
    fn test_windows_empty() {
        assert!(windows(&vendors(0), 50).is_empty());
        assert!(windows(&[Vendor::new("x", None)], 50).is_empty());
    }

    #[test]
    fn test_window_distances_mapping() {
        let entities = vendors(3);
        let windows = windows(&entities, 50);
        let row = vec![Some(0.0), Some(1500.0), None, Some(12345.0)];

        let mapped = window_distances(&windows[0], &row);

        assert_eq!(
            mapped,
            vec![
                ("v0".to_string(), "1.5".to_string()),
                ("v2".to_string(), "12.3".to_string()),
            ]
        );
    }

    #[test]
    fn test_window_distances_short_or_bad_row() {
        let entities = vendors(3);
        let windows = windows(&entities, 50);

        assert!(window_distances(&windows[0], &[Some(0.0)]).is_empty());
        assert!(window_distances(&windows[0], &[]).is_empty());

        let row = vec![Some(0.0), Some(f64::NAN), Some(-5.0), Some(10.0)];
        let mapped = window_distances(&windows[0], &row);
        assert_eq!(mapped, vec![("v2".to_string(), "0.0".to_string())]);
    }

    #[tokio::test]
    async fn test_120_entities_issue_three_windows() {
        let service = DistanceMatrixService::with_default_window(RecordingExecutor::default());

        let result = service.compute_distances(origin(), &vendors(120)).await.unwrap();

        let requests = service.executor.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![51, 51, 21]);
        assert!(requests.iter().all(|&n| n <= 51));
        assert_eq!(result.len(), 120);
        // v50 is the first destination of the second window
        assert_eq!(result["v50"], "1.0");
        assert_eq!(result["v119"], "20.0");
    }

    #[tokio::test]
    async fn test_failed_window_is_skipped() {
        let executor = RecordingExecutor {
            fail_windows: vec![1],
            ..RecordingExecutor::default()
        };
        let service = DistanceMatrixService::new(executor, 50);

        let result = service.compute_distances(origin(), &vendors(120)).await.unwrap();

        assert_eq!(service.executor.requests.lock().unwrap().len(), 3);
        assert_eq!(result.len(), 70);
        assert!(result.contains_key("v0"));
        assert!(!result.contains_key("v50"));
        assert!(result.contains_key("v100"));
    }

    #[tokio::test]
    async fn test_all_windows_failing_yields_empty_result() {
        let executor = RecordingExecutor {
            fail_windows: vec![0, 1, 2],
            ..RecordingExecutor::default()
        };
        let service = DistanceMatrixService::new(executor, 50);

        let result = service.compute_distances(origin(), &vendors(120)).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_missing_coordinate_never_keyed() {
        let mut entities = vendors(5);
        entities.push(Vendor::new("nowhere", None));
        let service = DistanceMatrixService::new(RecordingExecutor::default(), 50);

        let result = service.compute_distances(origin(), &entities).await.unwrap();

        assert_eq!(result.len(), 5);
        assert!(!result.contains_key("nowhere"));
    }

    #[tokio::test]
    async fn test_no_eligible_entities_makes_no_requests() {
        let service = DistanceMatrixService::new(RecordingExecutor::default(), 50);

        let result = service
            .compute_distances(origin(), &[Vendor::new("nowhere", None)])
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(service.executor.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_origin_rejected() {
        let service = DistanceMatrixService::new(RecordingExecutor::default(), 50);

        let err = service
            .compute_distances(Coordinate::new(100.0, 0.0), &vendors(3))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidCoordinates(_)));
    }

    /// Fails if two windows are ever in flight at once
    #[derive(Default)]
    struct OverlapExecutor {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl WindowExecutor for OverlapExecutor {
        async fn execute(&self, _origin: Coordinate, destinations: &[Coordinate]) -> Result<Vec<Option<f64>>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Some(500.0); destinations.len() + 1])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_windows_run_one_at_a_time() {
        let service = DistanceMatrixService::new(OverlapExecutor::default(), 10);

        let result = service.compute_distances(origin(), &vendors(45)).await.unwrap();

        assert_eq!(result.len(), 45);
        assert_eq!(service.executor.calls.load(Ordering::SeqCst), 5);
        assert_eq!(service.executor.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_window_size_clamped() {
        let service = DistanceMatrixService::new(RecordingExecutor::default(), 0);
        assert_eq!(service.window_size(), 1);
    }
}
