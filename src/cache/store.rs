//! Durable key-value store backing the persisted cache

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::cache as cache_config;
use crate::error::{Result, SwitchError};

/// Minimal durable key-value store; each value is replaced as a whole
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn update(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Key-value store kept in a single JSON document on disk
pub struct FileStore {
    path: PathBuf,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    /// Create a new store using the default path (~/.gcpswitch/state.json)
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Create a store with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(cache_config::DIR_NAME)
            .join(cache_config::FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns an empty document if the file doesn't exist, errors on corrupt JSON.
    fn load(&self) -> Result<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            SwitchError::Persistence(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SwitchError::Persistence(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Atomic write (tmp file + rename), creating the parent dir if needed
    fn save(&self, document: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SwitchError::Persistence(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| SwitchError::Persistence(format!("Failed to serialize state: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).map_err(|e| {
            SwitchError::Persistence(format!(
                "Failed to write temp state file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        // the cache holds refresh tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, permissions).map_err(|e| {
                SwitchError::Persistence(format!("Failed to set permissions on state file: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            SwitchError::Persistence(format!(
                "Failed to rename temp state file to {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(key))
    }

    fn update(&mut self, key: &str, value: Value) -> Result<()> {
        let mut document = self.load()?;
        document.insert(key.to_string(), value);
        self.save(&document)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> FileStore {
        FileStore::with_path(dir.path().join("state.json"))
    }

    #[test]
    fn test_get_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(test_store(&dir).get("anything").unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_json_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not valid json!!!").unwrap();
        let err = FileStore::with_path(path).get("k").unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }

    #[test]
    fn test_update_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subdir").join("state.json");
        let mut store = FileStore::with_path(path.clone());
        store.update("k", json!(1)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_update_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);
        store.update("a", json!({"x": 1})).unwrap();
        store.update("b", json!([1, 2])).unwrap();
        store.update("a", json!({"x": 2})).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(json!({"x": 2})));
        assert_eq!(store.get("b").unwrap(), Some(json!([1, 2])));
    }

    #[cfg(unix)]
    #[test]
    fn test_update_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut store = test_store(&dir);
        store.update("k", json!(true)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_default_path() {
        let path = FileStore::default_path();
        assert!(path.to_string_lossy().contains(cache_config::DIR_NAME));
        assert!(path.to_string_lossy().contains(cache_config::FILE_NAME));
    }
}
