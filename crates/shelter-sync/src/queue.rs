//! Reserved-key sync queue.

use async_trait::async_trait;
use shelter_cache::{CacheEntry, CacheError, CacheKey, CacheStore};
use tracing::{debug, info};

use crate::item::PendingSyncItem;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync operation errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Underlying cache store failure.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Stored payload is not valid JSON.
    #[error("invalid pending payload under {key}: {reason}")]
    Payload { key: String, reason: String },

    /// No binding registered for a trigger tag.
    #[error("unknown sync tag: {0}")]
    UnknownTag(String),

    /// The transmitter rejected the payload; the entry is left intact.
    #[error("transmission failed for {key}: {reason}")]
    Transmit { key: String, reason: String },
}

/// Error returned by a transmitter.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransmitError(pub String);

/// External collaborator that delivers a pending payload upstream.
///
/// Implementations own their transport, timeouts, and authentication.
#[async_trait]
pub trait Transmitter: Send + Sync {
    /// Deliver a payload. Returning `Ok` confirms receipt and permits
    /// the queue to drop the pending entry.
    async fn transmit(&self, key: &str, payload: &serde_json::Value) -> Result<(), TransmitError>;
}

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending under the key.
    Empty,
    /// The payload was transmitted and the entry removed.
    Flushed,
}

/// Sync queue persisting pending payloads under reserved cache keys.
#[derive(Clone)]
pub struct SyncQueue {
    store: CacheStore,
}

impl SyncQueue {
    /// Create a queue over a cache store handle.
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Park a payload under a reserved key, replacing any prior unsent
    /// payload for that key.
    pub async fn enqueue(&self, key: &str, payload: &serde_json::Value) -> SyncResult<()> {
        let body = serde_json::to_vec(payload).map_err(|e| SyncError::Payload {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let entry = CacheEntry::new(200, body).with_header("content-type", "application/json");
        self.store.put(&CacheKey::from_path(key), entry).await?;
        debug!(key, "parked payload for deferred sync");
        Ok(())
    }

    /// Read the pending payload under a key, if any.
    pub async fn pending(&self, key: &str) -> SyncResult<Option<PendingSyncItem>> {
        let Some(entry) = self.store.get(&CacheKey::from_path(key)).await? else {
            return Ok(None);
        };
        let payload = serde_json::from_slice(&entry.body).map_err(|e| SyncError::Payload {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(PendingSyncItem::new(key, payload, entry.stored_at)))
    }

    /// Flush the pending payload under a key.
    ///
    /// An absent payload is a successful no-op. The entry is deleted only
    /// after the transmitter confirms; on failure it is left byte-identical
    /// so the trigger may reschedule.
    pub async fn flush(
        &self,
        key: &str,
        transmitter: &dyn Transmitter,
    ) -> SyncResult<FlushOutcome> {
        let Some(item) = self.pending(key).await? else {
            debug!(key, "nothing pending to flush");
            return Ok(FlushOutcome::Empty);
        };

        transmitter
            .transmit(key, &item.payload)
            .await
            .map_err(|e| SyncError::Transmit {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        self.store.delete(&CacheKey::from_path(key)).await?;
        info!(key, "flushed pending payload");
        Ok(FlushOutcome::Flushed)
    }
}
