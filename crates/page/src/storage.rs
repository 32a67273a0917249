//! Key-value persistence standing in for browser local storage.
use crate::error::PageError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`. Implementations absorb their own failures.
    fn set_item(&mut self, key: &str, value: &str);

    fn remove_item(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// A JSON object file (`{"theme": "light"}`) written through on every change.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Opens `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| PageError::StorageFormat {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PageError::Io { path, source }),
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PageError> {
        let text = serde_json::to_string_pretty(&self.items).map_err(|source| {
            PageError::StorageFormat {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, text).map_err(|source| PageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn flush_or_warn(&self) {
        if let Err(err) = self.flush() {
            log::warn!(target: "page.storage", "{err}");
        }
    }
}

impl Storage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        if self.items.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.items.insert(key.to_string(), value.to_string());
        self.flush_or_warn();
    }

    fn remove_item(&mut self, key: &str) {
        if self.items.remove(key).is_some() {
            self.flush_or_warn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new().with_item("theme", "light");
        assert_eq!(storage.get_item("theme").as_deref(), Some("light"));
        storage.set_item("theme", "dark");
        assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
        storage.remove_item("theme");
        assert_eq!(storage.get_item("theme"), None);
    }

    #[test]
    fn json_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        {
            let mut storage = JsonFileStorage::open(&path).unwrap();
            assert_eq!(storage.get_item("theme"), None);
            storage.set_item("theme", "light");
        }
        let storage = JsonFileStorage::open(&path).unwrap();
        assert_eq!(storage.get_item("theme").as_deref(), Some("light"));
    }

    #[test]
    fn json_storage_rejects_non_object_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            JsonFileStorage::open(&path),
            Err(PageError::StorageFormat { .. })
        ));
    }
}
