//! Durable last-known-location storage
//!
//! A single-slot record made of two keys under the crate namespace: the
//! last coordinate (JSON) and the last place label (plain text). Read once
//! when a resolver starts, overwritten after every successful resolution.
//! Last writer wins; there is no locking across processes.

use crate::constants::storage::{LAST_COORDINATE_KEY, LAST_PLACE_KEY, LOCATION_FILE_NAME, NAMESPACE};
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::resolver::{LocationSource, ResolvedLocation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Key-value storage port for the last-known location
pub trait LocationStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: LocationStore + ?Sized> LocationStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// JSON-file store in the XDG data directory
/// (~/.local/share/shop-locator/location.json)
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at the default data path
    pub fn new() -> Result<Self> {
        let dir = dirs::data_dir()
            .map(|p| p.join(NAMESPACE))
            .ok_or_else(|| Error::Storage("Could not determine data directory".to_string()))?;
        Ok(Self::at(dir.join(LOCATION_FILE_NAME)))
    }

    /// Store at a specific path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", self.path.display(), e)))
    }

    fn save_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }
        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, content)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl LocationStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_map()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(key.to_string(), value.to_string());
        self.save_map(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.load_map()?;
        if map.remove(key).is_some() {
            self.save_map(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCoordinate {
    lat: f64,
    lng: f64,
    source: LocationSource,
}

/// Read the last-known location record
///
/// A malformed or out-of-range coordinate is discarded rather than used.
pub fn load_last_known<S: LocationStore + ?Sized>(store: &S) -> Result<Option<ResolvedLocation>> {
    let Some(raw) = store.read(LAST_COORDINATE_KEY)? else {
        return Ok(None);
    };

    let stored: StoredCoordinate = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "discarding unreadable stored coordinate");
            return Ok(None);
        }
    };

    let coordinate = match Coordinate::try_new(stored.lat, stored.lng) {
        Ok(coordinate) => coordinate,
        Err(e) => {
            warn!(error = %e, "discarding invalid stored coordinate");
            return Ok(None);
        }
    };

    Ok(Some(ResolvedLocation {
        coordinate,
        place_name: store.read(LAST_PLACE_KEY)?,
        source: stored.source,
    }))
}

/// Overwrite the last-known location record
///
/// A location without a place label removes the stored label so it never
/// pairs with a newer coordinate.
pub fn save_last_known<S: LocationStore + ?Sized>(store: &S, location: &ResolvedLocation) -> Result<()> {
    let stored = StoredCoordinate {
        lat: location.coordinate.lat,
        lng: location.coordinate.lng,
        source: location.source,
    };
    store.write(LAST_COORDINATE_KEY, &serde_json::to_string(&stored)?)?;

    match &location.place_name {
        Some(place) => store.write(LAST_PLACE_KEY, place),
        None => store.remove(LAST_PLACE_KEY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn kochi(place: Option<&str>) -> ResolvedLocation {
        ResolvedLocation {
            coordinate: Coordinate::new(9.9312, 76.2673),
            place_name: place.map(str::to_string),
            source: LocationSource::Manual,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(load_last_known(&store).unwrap().is_none());

        save_last_known(&store, &kochi(Some("Kochi"))).unwrap();
        assert_eq!(load_last_known(&store).unwrap(), Some(kochi(Some("Kochi"))));
    }

    #[test]
    fn test_missing_place_clears_stale_label() {
        let store = MemoryStore::new();
        save_last_known(&store, &kochi(Some("Kochi"))).unwrap();
        save_last_known(&store, &kochi(None)).unwrap();

        let loaded = load_last_known(&store).unwrap().unwrap();
        assert_eq!(loaded.place_name, None);
        assert_eq!(store.read(LAST_PLACE_KEY).unwrap(), None);
    }

    #[test]
    fn test_invalid_stored_coordinate_ignored() {
        let store = MemoryStore::new();
        store
            .write(LAST_COORDINATE_KEY, r#"{"lat":123.0,"lng":0.0,"source":"device"}"#)
            .unwrap();
        assert!(load_last_known(&store).unwrap().is_none());

        store.write(LAST_COORDINATE_KEY, "not json").unwrap();
        assert!(load_last_known(&store).unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("location.json");

        let store = FileStore::at(path.clone());
        save_last_known(&store, &kochi(Some("Kochi"))).unwrap();

        let reopened = FileStore::at(path.clone());
        assert_eq!(load_last_known(&reopened).unwrap(), Some(kochi(Some("Kochi"))));

        reopened.remove(LAST_PLACE_KEY).unwrap();
        assert_eq!(reopened.read(LAST_PLACE_KEY).unwrap(), None);
        assert!(reopened.read(LAST_COORDINATE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("location.json");
        fs::write(&path, "{{{").unwrap();

        let store = FileStore::at(path.clone());
        assert!(matches!(store.read(LAST_COORDINATE_KEY), Err(Error::Storage(_))));
    }
}
