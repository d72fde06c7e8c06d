//! Pending sync items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payload parked under a reserved key, awaiting transmission.
///
/// The stored form is the raw JSON payload; the queued-at time is the
/// cache entry's stored-at timestamp. At most one unsent payload exists
/// per reserved key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSyncItem {
    /// Reserved key the payload is parked under.
    pub key: String,
    /// The JSON payload to transmit.
    pub payload: serde_json::Value,
    /// When the payload was parked.
    pub queued_at: DateTime<Utc>,
}

impl PendingSyncItem {
    /// Create a pending item.
    pub fn new(key: impl Into<String>, payload: serde_json::Value, queued_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload,
            queued_at,
        }
    }
}
