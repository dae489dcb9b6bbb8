//! Persisted cache module
//!
//! Keeps configurations, cached credentials, projects and the activity log
//! in one record stored under a single versioned key.

mod models;
mod persisted;
mod store;

pub use models::{Activity, CacheRecord};
pub use persisted::PersistedCache;
pub use store::{FileStore, KeyValueStore};

#[cfg(test)]
pub(crate) use store::memory::MemoryStore;
