//! Canonical cache keys.

use http::{Method, Uri};
use serde::{Deserialize, Serialize};

/// Reserved keys forming the on-disk contract between the application
/// and the agent.
pub mod reserved {
    /// Offline fallback page served when an HTML navigation fails.
    pub const OFFLINE_FALLBACK: &str = "/offline.html";
    /// Pending emergency report awaiting transmission.
    pub const EMERGENCY_DATA: &str = "/emergency-data.json";
    /// Pending attendance scans awaiting transmission.
    pub const STUDENT_SCANS: &str = "/student-scans.json";
}

/// Canonical identifier of a cacheable request: the path and query of a
/// GET. Non-GET requests have no key and are never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an intercepted request; `None` unless the method is GET.
    pub fn for_request(method: &Method, url: &Uri) -> Option<Self> {
        if method != Method::GET {
            return None;
        }
        let mut key = url.path().to_string();
        if let Some(query) = url.query() {
            key.push('?');
            key.push_str(query);
        }
        Some(Self(key))
    }

    /// Key for a plain path, including the reserved keys.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
