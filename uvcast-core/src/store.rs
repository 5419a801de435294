//! Durable state: the saved-places list and the first-launch flag.
//!
//! Both live in a small key-value store. The saved-places entry holds the
//! whole JSON array and is rewritten on every change.

use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    error::{Result, WeatherError},
    model::SavedPlace,
};

pub const SAVED_PLACES_KEY: &str = "savedLocations";
pub const FIRST_LAUNCH_KEY: &str = "hasLaunched";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// All keys in one JSON object file, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            WeatherError::StorageFailure(format!("corrupt store {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| WeatherError::StorageFailure(e.to_string()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| WeatherError::StorageFailure("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| WeatherError::StorageFailure("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct SavedPlaces<S> {
    store: S,
}

impl<S: KeyValueStore> SavedPlaces<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Vec<SavedPlace>> {
        match self.store.get(SAVED_PLACES_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| WeatherError::StorageFailure(format!("invalid saved places: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Append `place` and persist the full list. Duplicates are allowed.
    pub fn add(&self, place: SavedPlace) -> Result<Vec<SavedPlace>> {
        let mut places = self.load()?;
        places.push(place);
        self.persist(&places)?;
        Ok(places)
    }

    /// Drop every entry with `id` and persist the rest.
    pub fn remove(&self, id: &str) -> Result<Vec<SavedPlace>> {
        let mut places = self.load()?;
        let before = places.len();
        places.retain(|p| p.id != id);

        if places.len() == before {
            tracing::debug!(id, "no saved place with this id");
        }

        self.persist(&places)?;
        Ok(places)
    }

    pub fn find(&self, id: &str) -> Result<Option<SavedPlace>> {
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    fn persist(&self, places: &[SavedPlace]) -> Result<()> {
        let json = serde_json::to_string(places)
            .map_err(|e| WeatherError::StorageFailure(e.to_string()))?;
        self.store.set(SAVED_PLACES_KEY, &json)
    }
}

pub struct FirstLaunch<S> {
    store: S,
}

impl<S: KeyValueStore> FirstLaunch<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn is_first_launch(&self) -> Result<bool> {
        Ok(self.store.get(FIRST_LAUNCH_KEY)?.as_deref() != Some("true"))
    }

    pub fn mark_launched(&self) -> Result<()> {
        self.store.set(FIRST_LAUNCH_KEY, "true")
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, lat: f64, lon: f64) -> SavedPlace {
        SavedPlace {
            id: id.into(),
            name: "Antalya".into(),
            region: "Antalya".into(),
            country: "Turkey".into(),
            lat,
            lon,
        }
    }

    #[test]
    fn add_then_load_contains_place() {
        let places = SavedPlaces::new(MemoryStore::default());
        let p = place("a", 36.9, 30.7);

        places.add(p.clone()).unwrap();
        assert!(places.load().unwrap().contains(&p));
    }

    #[test]
    fn remove_drops_every_entry_with_the_id() {
        let places = SavedPlaces::new(MemoryStore::default());
        places.add(place("a", 1.0, 1.0)).unwrap();
        places.add(place("b", 2.0, 2.0)).unwrap();
        places.add(place("a", 3.0, 3.0)).unwrap();

        let left = places.remove("a").unwrap();
        assert_eq!(left, vec![place("b", 2.0, 2.0)]);
        assert!(places.load().unwrap().iter().all(|p| p.id != "a"));
    }

    #[test]
    fn same_coordinates_are_saved_twice() {
        let places = SavedPlaces::new(MemoryStore::default());
        places.add(place("a", 36.9, 30.7)).unwrap();
        places.add(place("b", 36.9, 30.7)).unwrap();

        assert_eq!(places.load().unwrap().len(), 2);
    }

    #[test]
    fn missing_key_loads_empty() {
        let places = SavedPlaces::new(MemoryStore::default());
        assert!(places.load().unwrap().is_empty());
        assert!(places.remove("nope").unwrap().is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        SavedPlaces::new(FileStore::new(&path)).add(place("a", 1.0, 2.0)).unwrap();
        FirstLaunch::new(FileStore::new(&path)).mark_launched().unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        assert!(store.path().exists());

        let reopened = SavedPlaces::new(store);
        assert_eq!(reopened.load().unwrap(), vec![place("a", 1.0, 2.0)]);
        assert_eq!(reopened.find("a").unwrap().map(|p| p.lat), Some(1.0));
        assert!(!FirstLaunch::new(FileStore::new(&path)).is_first_launch().unwrap());
    }

    #[test]
    fn corrupt_file_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let err = SavedPlaces::new(FileStore::new(&path)).load().unwrap_err();
        assert!(matches!(err, WeatherError::StorageFailure(_)));
    }

    #[test]
    fn first_launch_flag_flips_once_marked() {
        let store = MemoryStore::default();
        let flag = FirstLaunch::new(&store);

        assert!(flag.is_first_launch().unwrap());
        flag.mark_launched().unwrap();
        assert!(!flag.is_first_launch().unwrap());
    }
}
