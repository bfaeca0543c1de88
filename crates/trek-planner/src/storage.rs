//! Small string key/value storage for state that survives restarts, such as
//! the active profile.

use std::{
  collections::{BTreeMap, HashMap},
  io,
  path::{Path, PathBuf},
  sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("io error: {0}")]
  Io(#[from] io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub trait LocalStorage: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

  /// Removing an absent key is not an error.
  fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── File ────────────────────────────────────────────────────────────────────

/// A JSON object on disk, rewritten in full on every change.
pub struct FileStorage {
  path:    PathBuf,
  entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
  /// Load `path` if it exists. A missing or unreadable file starts empty.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let entries = match std::fs::read_to_string(&path) {
      Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
        tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable state file");
        BTreeMap::new()
      }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
      Err(e) => {
        tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable state file");
        BTreeMap::new()
      }
    };
    Self { path, entries: Mutex::new(entries) }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(entries)?;
    if let Some(dir) = self.path.parent()
      && !dir.as_os_str().is_empty()
    {
      std::fs::create_dir_all(dir)?;
    }
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl LocalStorage for FileStorage {
  fn get(&self, key: &str) -> Option<String> { lock(&self.entries).get(key).cloned() }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let mut entries = lock(&self.entries);
    entries.insert(key.to_owned(), value.to_owned());
    self.persist(&entries)
  }

  fn remove(&self, key: &str) -> Result<(), StorageError> {
    let mut entries = lock(&self.entries);
    if entries.remove(key).is_some() {
      self.persist(&entries)?;
    }
    Ok(())
  }
}

// ─── Memory ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }
}

impl LocalStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<String> { lock(&self.entries).get(key).cloned() }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    lock(&self.entries).insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StorageError> {
    lock(&self.entries).remove(key);
    Ok(())
  }
}
