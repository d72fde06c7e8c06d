//! Versioned cache storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entry::CacheEntry;
use crate::key::CacheKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Failed to serialize/deserialize an entry.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Backend storage for versioned request/response caches.
///
/// Concurrent writers to the same key are last-write-wins; there is no
/// ordering guarantee across keys and reads are not transactional.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Ensure a cache exists for the version.
    async fn open(&self, version: &str) -> CacheResult<()>;

    /// Look up an entry.
    async fn get(&self, version: &str, key: &CacheKey) -> CacheResult<Option<CacheEntry>>;

    /// Store an entry, replacing any prior value for the key.
    async fn put(&self, version: &str, key: &CacheKey, entry: CacheEntry) -> CacheResult<()>;

    /// Delete an entry. Returns whether one was present.
    async fn delete(&self, version: &str, key: &CacheKey) -> CacheResult<bool>;

    /// All keys stored under a version.
    async fn keys(&self, version: &str) -> CacheResult<Vec<CacheKey>>;

    /// All known versions.
    async fn list_versions(&self) -> CacheResult<Vec<String>>;

    /// Delete an entire version. Returns whether one was present.
    async fn delete_version(&self, version: &str) -> CacheResult<bool>;
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    caches: RwLock<HashMap<String, HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn open(&self, version: &str) -> CacheResult<()> {
        let mut caches = self.caches.write().await;
        caches.entry(version.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, version: &str, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        let caches = self.caches.read().await;
        Ok(caches.get(version).and_then(|c| c.get(key)).cloned())
    }

    async fn put(&self, version: &str, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        let mut caches = self.caches.write().await;
        caches
            .entry(version.to_string())
            .or_default()
            .insert(key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, version: &str, key: &CacheKey) -> CacheResult<bool> {
        let mut caches = self.caches.write().await;
        Ok(caches
            .get_mut(version)
            .is_some_and(|c| c.remove(key).is_some()))
    }

    async fn keys(&self, version: &str) -> CacheResult<Vec<CacheKey>> {
        let caches = self.caches.read().await;
        Ok(caches
            .get(version)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_versions(&self) -> CacheResult<Vec<String>> {
        let caches = self.caches.read().await;
        Ok(caches.keys().cloned().collect())
    }

    async fn delete_version(&self, version: &str) -> CacheResult<bool> {
        let mut caches = self.caches.write().await;
        Ok(caches.remove(version).is_some())
    }
}

/// Handle to one version of the cache store.
///
/// The version is fixed at construction; eviction of other versions goes
/// through `list_versions`/`delete_version`.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    version: String,
}

impl CacheStore {
    /// Bind a backend to a version.
    pub fn new(backend: Arc<dyn CacheBackend>, version: impl Into<String>) -> Self {
        Self {
            backend,
            version: version.into(),
        }
    }

    /// The version this handle is bound to.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Ensure the bound version exists in the backend.
    pub async fn open(&self) -> CacheResult<()> {
        self.backend.open(&self.version).await
    }

    /// Look up an entry under the bound version.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        self.backend.get(&self.version, key).await
    }

    /// Store an entry under the bound version. Last write wins.
    pub async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        self.backend.put(&self.version, key, entry).await
    }

    /// Delete an entry under the bound version.
    pub async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        self.backend.delete(&self.version, key).await
    }

    /// All keys stored under the bound version.
    pub async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        self.backend.keys(&self.version).await
    }

    /// All versions known to the backend.
    pub async fn list_versions(&self) -> CacheResult<Vec<String>> {
        self.backend.list_versions().await
    }

    /// Delete an entire version (typically a superseded one).
    pub async fn delete_version(&self, version: &str) -> CacheResult<bool> {
        self.backend.delete_version(version).await
    }
}
