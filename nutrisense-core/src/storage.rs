//! Durable local storage for the client state.
//!
//! Storage is write-through: the state store saves the whole aggregate after
//! every mutation and reads it back only at startup. Backends implement
//! [`StateStorage`]; [`LocalPersistence`] wraps a backend and swallows its
//! failures so a broken disk never takes the session down.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::{Ingredient, Profile, Recipe, Store};

/// File name of the persisted state inside the data directory.
pub const STATE_FILENAME: &str = "state.json";
/// Where an unparseable state file is moved so the next save can't clobber it.
pub const CORRUPT_FILENAME: &str = "state.json.corrupt";

/// Serialized form of the client state.
///
/// Every field defaults, so data written by an older client or a partially
/// written file still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PersistedState {
    pub profile: Profile,
    pub preferences: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub stores: Vec<Store>,
    pub recipes: Vec<Recipe>,
}

impl PersistedState {
    /// Decodes saved state one field at a time.
    ///
    /// An invalid field falls back to its default without touching the rest:
    /// a bad profile value resets just that value, and a list element that
    /// isn't a record is dropped. Only input that is not a JSON object fails.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let Value::Object(mut fields) = serde_json::from_slice(bytes)? else {
            return Err(serde_json::Error::custom("expected a JSON object"));
        };

        let mut take = |key: &str| fields.remove(key).unwrap_or(Value::Null);
        Ok(Self {
            profile: record(take("profile"), "profile").unwrap_or_default(),
            preferences: list(take("preferences"), "preferences", |v| {
                serde_json::from_value(v).ok()
            }),
            ingredients: list(take("ingredients"), "ingredients", |v| record(v, "ingredient")),
            stores: list(take("stores"), "stores", |v| record(v, "store")),
            recipes: list(take("recipes"), "recipes", |v| record(v, "recipe")),
        })
    }
}

/// Decodes an object, dropping any field that fails on its own.
fn record<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return None,
        other => {
            tracing::warn!("Ignoring saved {}: expected an object, got {}", what, other);
            return None;
        }
    };

    match serde_json::from_value(Value::Object(fields.clone())) {
        Ok(decoded) => return Some(decoded),
        Err(e) => tracing::warn!("Resetting invalid fields of saved {}: {}", what, e),
    }

    let valid: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, value)| {
            let single = Map::from_iter([(key.clone(), value.clone())]);
            serde_json::from_value::<T>(Value::Object(single)).is_ok()
        })
        .collect();
    serde_json::from_value(Value::Object(valid)).ok()
}

fn list<T>(value: Value, what: &str, decode: impl Fn(Value) -> Option<T>) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!("Ignoring saved {}: expected a list, got {}", what, other);
            return Vec::new();
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items.into_iter().filter_map(decode).collect();
    if decoded.len() < total {
        tracing::warn!(
            "Dropped {} unreadable entries from saved {}",
            total - decoded.len(),
            what
        );
    }
    decoded
}

/// A place the client state can be saved to and loaded from.
pub trait StateStorage: Send + Sync {
    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;

    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedState>, StorageError>;
}

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILENAME)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    pub fn corrupt_path(&self) -> PathBuf {
        self.data_dir.join(CORRUPT_FILENAME)
    }
}

impl StateStorage for FileStorage {
    /// Creates the data directory if it doesn't exist.
    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let path = self.path();
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;

        // Write to a sibling file first so a crash mid-write leaves the old state intact.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StorageError::IoError(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::IoError(path, e))?;

        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        let path = self.path();

        match fs::read(&path) {
            Ok(bytes) => match PersistedState::from_json(&bytes) {
                Ok(state) => Ok(Some(state)),
                Err(e) => {
                    let aside = self.corrupt_path();
                    match fs::rename(&path, &aside) {
                        Ok(()) => tracing::warn!("Moved unreadable state to {}", aside.display()),
                        Err(e) => tracing::warn!("Could not move unreadable state aside: {}", e),
                    }
                    Err(StorageError::MalformedState(path, e.to_string()))
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }
}

/// In-memory backend. Keeps the last saved snapshot; useful for tests and
/// for hosts without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: Mutex<Option<PersistedState>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Option<PersistedState> {
        self.saved.lock().ok().and_then(|s| s.clone())
    }
}

impl StateStorage for MemoryStorage {
    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let mut saved = self.saved.lock().map_err(|_| StorageError::Poisoned)?;
        *saved = Some(state.clone());
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        let saved = self.saved.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(saved.clone())
    }
}

impl<S: StateStorage + ?Sized> StateStorage for std::sync::Arc<S> {
    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        (**self).load()
    }
}

/// Error-swallowing front for a storage backend.
pub struct LocalPersistence {
    backend: Box<dyn StateStorage>,
}

impl LocalPersistence {
    pub fn new(backend: impl StateStorage + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Saves the state. A failure is logged and the session carries on
    /// memory-only for this flush.
    pub fn save(&self, state: &PersistedState) {
        if let Err(e) = self.backend.save(state) {
            tracing::warn!("Failed to persist local state: {}", e);
        }
    }

    /// Loads the last saved state. Missing, unreadable and malformed data all
    /// come back as `None`; the caller starts from defaults.
    pub fn load(&self) -> Option<PersistedState> {
        match self.backend.load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring unusable local state: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for LocalPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPersistence").finish_non_exhaustive()
    }
}

/// Errors that can occur while saving or loading local state.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// Persisted data could not be parsed.
    MalformedState(PathBuf, String),
    /// State could not be serialized.
    SerializeError(String),
    /// A lock guarding in-memory state was poisoned.
    Poisoned,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::MalformedState(path, e) => {
                write!(f, "Malformed local state in {}: {}", path.display(), e)
            }
            StorageError::SerializeError(e) => write!(f, "Failed to serialize state: {}", e),
            StorageError::Poisoned => write!(f, "Storage lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            _ => None,
        }
    }
}
