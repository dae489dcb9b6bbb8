//! In-memory mirror of the cache record with write-through persistence

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::config::cache as cache_config;
use crate::error::Result;
use crate::gcloud::{Configuration, CredentialBlob, Project};

use super::models::{Activity, CacheRecord};
use super::store::KeyValueStore;

/// Persisted cache of configurations, credentials, projects and activity.
///
/// Loaded once at construction. Every mutator writes the whole record back
/// before returning; the in-memory copy is updated first, so a failed write
/// leaves memory ahead of disk until the next successful mutation.
pub struct PersistedCache {
    store: Box<dyn KeyValueStore>,
    record: CacheRecord,
}

impl PersistedCache {
    /// Load the record from `store`, falling back to the empty default when
    /// the key is missing or holds an incompatible shape.
    pub fn open(store: Box<dyn KeyValueStore>) -> Result<Self> {
        let record = match store.get(cache_config::KEY)? {
            None => {
                debug!("No cache record under '{}', starting empty", cache_config::KEY);
                CacheRecord::default()
            }
            Some(value) => match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        "Discarding incompatible cache record under '{}': {}",
                        cache_config::KEY,
                        e
                    );
                    CacheRecord::default()
                }
            },
        };

        Ok(Self { store, record })
    }

    fn persist(&mut self) -> Result<()> {
        let value = serde_json::to_value(&self.record)?;
        self.store.update(cache_config::KEY, value)
    }

    pub fn record(&self) -> &CacheRecord {
        &self.record
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.record.configurations
    }

    pub fn projects(&self) -> &[Project] {
        &self.record.projects
    }

    pub fn activity_log(&self) -> &[Activity] {
        &self.record.activity_log
    }

    pub fn credential(&self, name: &str) -> Option<&CredentialBlob> {
        self.record.credentials_by_config_name.get(name)
    }

    pub fn has_credential(&self, name: &str) -> bool {
        self.record.credentials_by_config_name.contains_key(name)
    }

    pub fn cached_credential_names(&self) -> Vec<String> {
        self.record
            .credentials_by_config_name
            .keys()
            .cloned()
            .collect()
    }

    pub fn set_credential(&mut self, name: &str, blob: CredentialBlob) -> Result<()> {
        self.record
            .credentials_by_config_name
            .insert(name.to_string(), blob);
        self.persist()
    }

    /// Returns whether a credential was cached under `name`
    pub fn remove_credential(&mut self, name: &str) -> Result<bool> {
        let removed = self
            .record
            .credentials_by_config_name
            .remove(name)
            .is_some();
        self.persist()?;
        Ok(removed)
    }

    /// Replace the configuration list wholesale; no merging with the old one
    pub fn replace_configurations(&mut self, configurations: Vec<Configuration>) -> Result<()> {
        self.record.configurations = configurations;
        self.persist()
    }

    pub fn replace_projects(&mut self, projects: Vec<Project>) -> Result<()> {
        self.record.projects = projects;
        self.persist()
    }

    pub fn active_configuration(&self) -> Option<&Configuration> {
        self.record.configurations.iter().find(|c| c.is_active)
    }

    pub fn configuration_at(&self, index: usize) -> Option<&Configuration> {
        self.record.configurations.get(index)
    }

    pub fn configuration_named(&self, name: &str) -> Option<&Configuration> {
        self.record.configurations.iter().find(|c| c.name == name)
    }

    /// Drop cached credentials whose configuration no longer exists.
    /// Returns the dropped names; persists only when something changed.
    pub fn reconcile(&mut self) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = self
            .record
            .configurations
            .iter()
            .map(|c| c.name.as_str())
            .collect();

        let orphaned: Vec<String> = self
            .record
            .credentials_by_config_name
            .keys()
            .filter(|key| !names.contains(key.as_str()))
            .cloned()
            .collect();

        if orphaned.is_empty() {
            return Ok(orphaned);
        }

        for name in &orphaned {
            self.record.credentials_by_config_name.remove(name);
        }
        debug!("Dropped orphaned credentials: {}", orphaned.join(", "));
        self.persist()?;
        Ok(orphaned)
    }

    pub fn record_activity(&mut self, action: impl Into<String>) -> Result<()> {
        self.record.activity_log.push(Activity::now(action));
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::memory::MemoryStore;
    use crate::error::SwitchError;
    use serde_json::json;

    fn blob(token: &str) -> CredentialBlob {
        CredentialBlob::new(json!({"type": "authorized_user", "refresh_token": token}))
    }

    fn work_and_personal() -> Vec<Configuration> {
        vec![
            Configuration::new("work", true).with_core(Some("a@x.com"), Some("p1")),
            Configuration::new("personal", false).with_core(Some("b@x.com"), Some("p2")),
        ]
    }

    fn open(store: &MemoryStore) -> PersistedCache {
        PersistedCache::open(Box::new(store.clone())).unwrap()
    }

    #[test]
    fn test_missing_key_yields_empty_record() {
        let cache = open(&MemoryStore::new());
        assert_eq!(cache.record(), &CacheRecord::default());
        assert!(cache.active_configuration().is_none());
    }

    #[test]
    fn test_incompatible_record_discarded() {
        let store = MemoryStore::with_value(cache_config::KEY, json!({"ADCs": {"work": {}}}));
        let cache = open(&store);
        assert_eq!(cache.record(), &CacheRecord::default());
    }

    #[test]
    fn test_replace_configurations_is_exact() {
        let store = MemoryStore::new();
        let mut cache = open(&store);
        cache
            .replace_configurations(vec![Configuration::new("old", true)])
            .unwrap();

        let listed = work_and_personal();
        cache.replace_configurations(listed.clone()).unwrap();
        assert_eq!(cache.configurations(), listed.as_slice());

        // a fresh load sees exactly the same list
        assert_eq!(open(&store).configurations(), listed.as_slice());
    }

    #[test]
    fn test_active_configuration_is_work() {
        let mut cache = open(&MemoryStore::new());
        cache.replace_configurations(work_and_personal()).unwrap();

        let active = cache.active_configuration().unwrap();
        assert_eq!(active.name, "work");
        assert_eq!(active.account(), Some("a@x.com"));
        assert_eq!(active.project(), Some("p1"));
    }

    #[test]
    fn test_every_mutation_persists() {
        let store = MemoryStore::new();
        let mut cache = open(&store);
        cache.set_credential("work", blob("r1")).unwrap();
        cache.replace_projects(vec![]).unwrap();
        cache.record_activity("switch work").unwrap();
        cache.remove_credential("work").unwrap();
        assert_eq!(store.writes(), 4);

        let stored = store.value(cache_config::KEY).unwrap();
        assert_eq!(stored["activity_log"][0]["action"], "switch work");
        assert_eq!(stored["credentials_by_config_name"], json!({}));
    }

    #[test]
    fn test_write_failure_propagates() {
        let store = MemoryStore::new();
        let mut cache = open(&store);
        store.fail_writes(true);
        let err = cache.set_credential("work", blob("r1")).unwrap_err();
        assert!(matches!(err, SwitchError::Persistence(_)));
    }

    #[test]
    fn test_reconcile_drops_orphans_and_is_idempotent() {
        let mut cache = open(&MemoryStore::new());
        cache.replace_configurations(work_and_personal()).unwrap();
        cache.set_credential("work", blob("r1")).unwrap();
        cache.set_credential("staging", blob("r2")).unwrap();

        assert_eq!(cache.reconcile().unwrap(), vec!["staging".to_string()]);
        let once = cache.cached_credential_names();

        assert!(cache.reconcile().unwrap().is_empty());
        assert_eq!(cache.cached_credential_names(), once);

        for name in &once {
            assert!(cache.configuration_named(name).is_some());
        }
    }

    #[test]
    fn test_reconcile_without_changes_does_not_write() {
        let store = MemoryStore::new();
        let mut cache = open(&store);
        cache.replace_configurations(work_and_personal()).unwrap();
        let writes = store.writes();
        cache.reconcile().unwrap();
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_remove_credential_reports_presence() {
        let mut cache = open(&MemoryStore::new());
        cache.set_credential("work", blob("r1")).unwrap();
        assert!(cache.remove_credential("work").unwrap());
        assert!(!cache.remove_credential("work").unwrap());
        assert!(!cache.has_credential("work"));
    }

    #[test]
    fn test_configuration_lookup() {
        let mut cache = open(&MemoryStore::new());
        cache.replace_configurations(work_and_personal()).unwrap();
        assert_eq!(cache.configuration_at(1).unwrap().name, "personal");
        assert!(cache.configuration_at(2).is_none());
        assert!(cache.configuration_named("missing").is_none());
    }
}
