//! Location resolution
//!
//! `LocationResolver` owns the acquisition state machine:
//!
//! ```text
//! Idle -> RequestingHigh -> Resolved
//!         RequestingHigh -> Denied            (permission denied, terminal)
//!         RequestingHigh -> RequestingLow     (unavailable / timeout)
//!                           RequestingLow -> Resolved | Failed
//! Idle -> ManualPending -> ManualResolved | Failed
//! ```
//!
//! Only the most recently started request may change state. Every request
//! takes a ticket from a generation counter; an outcome whose ticket is no
//! longer current is dropped and reported as [`Error::Superseded`].

pub mod storage;

use crate::constants::device::{
    HIGH_ACCURACY_MAX_AGE, HIGH_ACCURACY_TIMEOUT, LOW_ACCURACY_MAX_AGE, LOW_ACCURACY_TIMEOUT,
};
use crate::coord::Coordinate;
use crate::device::{DeviceLocator, PositionError, PositionErrorCode, PositionOptions};
use crate::error::{Error, Result};
use crate::geo::GeoBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use storage::LocationStore;
use tracing::{debug, info, warn};

/// How a location was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Device,
    Manual,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A successfully resolved user location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    /// Reverse geocoding is best-effort, so the label may be missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    pub source: LocationSource,
}

/// Accuracy tier of a device acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// GPS-grade fix, no cached positions
    High,
    /// Network-based fix, cached positions up to five minutes old
    Low,
}

impl Tier {
    pub fn options(self) -> PositionOptions {
        match self {
            Self::High => PositionOptions {
                enable_high_accuracy: true,
                timeout: HIGH_ACCURACY_TIMEOUT,
                maximum_age: HIGH_ACCURACY_MAX_AGE,
            },
            Self::Low => PositionOptions {
                enable_high_accuracy: false,
                timeout: LOW_ACCURACY_TIMEOUT,
                maximum_age: LOW_ACCURACY_MAX_AGE,
            },
        }
    }
}

/// Why an acquisition ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Unavailable,
    Unsupported,
    NotFound,
}

/// What to do after a failed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Retry(Tier),
    Deny,
    Fail(FailureKind),
}

/// Decide the next step after `tier` failed with `code`
pub fn next_action(tier: Tier, code: PositionErrorCode) -> NextAction {
    use PositionErrorCode::*;

    match (tier, code) {
        (Tier::High, PermissionDenied) => NextAction::Deny,
        (Tier::High, PositionUnavailable | Timeout) => NextAction::Retry(Tier::Low),
        (Tier::High, Other(_)) => NextAction::Fail(FailureKind::Unavailable),
        (Tier::Low, Timeout) => NextAction::Fail(FailureKind::Timeout),
        (Tier::Low, _) => NextAction::Fail(FailureKind::Unavailable),
    }
}

/// Resolver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    RequestingHigh,
    RequestingLow,
    Resolved,
    Denied,
    Failed(FailureKind),
    ManualPending,
    ManualResolved,
}

impl ResolverState {
    fn requesting(tier: Tier) -> Self {
        match tier {
            Tier::High => Self::RequestingHigh,
            Tier::Low => Self::RequestingLow,
        }
    }

    /// A request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::RequestingHigh | Self::RequestingLow | Self::ManualPending
        )
    }

    /// User-facing message for terminal failure states
    pub fn message(&self) -> Option<String> {
        let message = match self {
            Self::Denied => Error::PermissionDenied.to_string(),
            Self::Failed(FailureKind::Timeout) => Error::LocationTimeout.to_string(),
            Self::Failed(FailureKind::Unavailable) => Error::LocationUnavailable.to_string(),
            Self::Failed(FailureKind::Unsupported) => Error::Unsupported.to_string(),
            Self::Failed(FailureKind::NotFound) => {
                "Location not found. Please try a different search.".to_string()
            }
            _ => return None,
        };
        Some(message)
    }
}

/// Device permission as observed by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug)]
struct Inner {
    state: ResolverState,
    location: Option<ResolvedLocation>,
    permission: Option<PermissionStatus>,
    generation: u64,
}

/// Acquires, labels and persists the user's location
pub struct LocationResolver<D, G, S> {
    locator: D,
    geocoder: G,
    store: S,
    inner: Mutex<Inner>,
    /// Ticket of the last record written to the store
    persisted: Mutex<u64>,
}

impl<D, G, S> LocationResolver<D, G, S>
where
    D: DeviceLocator,
    G: GeoBackend,
    S: LocationStore,
{
    /// Create a resolver, rehydrating the last-known location from `store`
    /// before any network call is made
    pub fn new(locator: D, geocoder: G, store: S) -> Self {
        let location = storage::load_last_known(&store).unwrap_or_else(|e| {
            warn!(error = %e, "failed to read last-known location");
            None
        });
        if let Some(location) = &location {
            debug!(coordinate = %location.coordinate, "rehydrated last-known location");
        }

        Self {
            locator,
            geocoder,
            store,
            inner: Mutex::new(Inner {
                state: ResolverState::Idle,
                location,
                permission: None,
                generation: 0,
            }),
            persisted: Mutex::new(0),
        }
    }

    pub fn state(&self) -> ResolverState {
        self.lock().state
    }

    /// Current location: the latest resolution, or the rehydrated record
    pub fn location(&self) -> Option<ResolvedLocation> {
        self.lock().location.clone()
    }

    pub fn permission(&self) -> Option<PermissionStatus> {
        self.lock().permission
    }

    pub fn locator(&self) -> &D {
        &self.locator
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Acquire the device position, falling back from high to low accuracy
    pub async fn request_device_location(&self) -> Result<ResolvedLocation> {
        if self.permission() == Some(PermissionStatus::Denied) {
            return Err(Error::PermissionDenied);
        }
        if !self.locator.is_supported() {
            let ticket = self.begin(ResolverState::Failed(FailureKind::Unsupported));
            debug!(ticket, "device geolocation unsupported");
            return Err(Error::Unsupported);
        }

        let mut tier = Tier::High;
        let ticket = self.begin(ResolverState::requesting(tier));

        loop {
            info!(?tier, ticket, "requesting device location");
            let outcome = self.attempt(tier).await;
            if !self.is_current(ticket) {
                debug!(ticket, "discarding superseded device location outcome");
                return Err(Error::Superseded);
            }

            let failure = match outcome {
                Ok(coordinate) => return self.finish_device(ticket, coordinate).await,
                Err(failure) => failure,
            };
            warn!(?tier, error = %failure, "device location attempt failed");

            match next_action(tier, failure.code) {
                NextAction::Retry(next) => {
                    tier = next;
                    self.commit(ticket, |inner| inner.state = ResolverState::requesting(next))?;
                }
                NextAction::Deny => {
                    self.commit(ticket, |inner| {
                        inner.state = ResolverState::Denied;
                        inner.permission = Some(PermissionStatus::Denied);
                    })?;
                    return Err(Error::PermissionDenied);
                }
                NextAction::Fail(kind) => {
                    self.commit(ticket, |inner| inner.state = ResolverState::Failed(kind))?;
                    return Err(match kind {
                        FailureKind::Timeout => Error::LocationTimeout,
                        _ => Error::LocationUnavailable,
                    });
                }
            }
        }
    }

    /// Resolve a free-text place query through forward geocoding
    pub async fn request_manual_location(&self, query: &str) -> Result<ResolvedLocation> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Please enter a location".to_string()));
        }

        let ticket = self.begin(ResolverState::ManualPending);
        info!(query, ticket, "resolving manual location");

        let found = self
            .geocoder
            .forward(query)
            .await
            .filter(|found| found.coordinate.validate().is_ok());

        match found {
            Some(found) => {
                let location = ResolvedLocation {
                    coordinate: found.coordinate,
                    place_name: Some(found.short_label(query)),
                    source: LocationSource::Manual,
                };
                self.resolve(ticket, ResolverState::ManualResolved, location)
            }
            None => {
                self.commit(ticket, |inner| {
                    inner.state = ResolverState::Failed(FailureKind::NotFound);
                    inner.location = None;
                })?;
                Err(Error::NotFound(query.to_string()))
            }
        }
    }

    async fn attempt(&self, tier: Tier) -> std::result::Result<Coordinate, PositionError> {
        let options = tier.options();
        let position = tokio::time::timeout(options.timeout, self.locator.request(options))
            .await
            .map_err(|_| PositionError::timeout())??;

        position
            .coordinate()
            .map_err(|e| PositionError::unavailable(e.to_string()))
    }

    async fn finish_device(&self, ticket: u64, coordinate: Coordinate) -> Result<ResolvedLocation> {
        let place_name = self.geocoder.reverse(coordinate).await;
        let location = ResolvedLocation {
            coordinate,
            place_name,
            source: LocationSource::Device,
        };
        self.resolve(ticket, ResolverState::Resolved, location)
    }

    /// Install `location` as current and overwrite the durable record
    fn resolve(
        &self,
        ticket: u64,
        state: ResolverState,
        location: ResolvedLocation,
    ) -> Result<ResolvedLocation> {
        {
            let mut inner = self.lock();
            if inner.generation != ticket {
                debug!(ticket, "discarding superseded resolution");
                return Err(Error::Superseded);
            }

            inner.state = state;
            inner.location = Some(location.clone());
            if location.source == LocationSource::Device {
                inner.permission = Some(PermissionStatus::Granted);
            }
        }

        self.persist(ticket, &location);

        info!(
            coordinate = %location.coordinate,
            place = location.place_name.as_deref().unwrap_or("-"),
            source = %location.source,
            "location resolved"
        );
        Ok(location)
    }

    /// Write the durable record outside the state lock. Writes are
    /// serialized and an older ticket never overwrites a newer one.
    fn persist(&self, ticket: u64, location: &ResolvedLocation) {
        let mut persisted = self.persisted.lock().unwrap_or_else(PoisonError::into_inner);
        if *persisted > ticket {
            debug!(ticket, newer = *persisted, "skipping stale location write");
            return;
        }

        match storage::save_last_known(&self.store, location) {
            Ok(()) => *persisted = ticket,
            Err(e) => warn!(error = %e, "failed to persist last-known location"),
        }
    }

    fn begin(&self, state: ResolverState) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = state;
        inner.generation
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.lock().generation == ticket
    }

    fn commit(&self, ticket: u64, apply: impl FnOnce(&mut Inner)) -> Result<()> {
        let mut inner = self.lock();
        if inner.generation != ticket {
            return Err(Error::Superseded);
        }
        apply(&mut inner);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
