//! Cache lookup dispositions and the debug header.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Header names for cache debugging.
pub mod header_names {
    /// Cache status header (HIT, MISS, FALLBACK, BYPASS).
    pub const X_CACHE_STATUS: &str = "x-cache-status";
}

/// Disposition of a cache lookup for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Fetched from the network (and stored if eligible).
    Miss,
    /// Served the offline fallback after a network failure.
    Fallback,
    /// Not eligible for caching.
    Bypass,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Fallback => write!(f, "FALLBACK"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}

impl CacheStatus {
    /// Stamp the status onto response headers.
    pub fn stamp(&self, headers: &mut HeaderMap) {
        let value = match self {
            Self::Hit => HeaderValue::from_static("HIT"),
            Self::Miss => HeaderValue::from_static("MISS"),
            Self::Fallback => HeaderValue::from_static("FALLBACK"),
            Self::Bypass => HeaderValue::from_static("BYPASS"),
        };
        headers.insert(HeaderName::from_static(header_names::X_CACHE_STATUS), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_header_values() {
        assert_eq!(CacheStatus::Hit.to_string(), "HIT");
        assert_eq!(CacheStatus::Miss.to_string(), "MISS");
        assert_eq!(CacheStatus::Fallback.to_string(), "FALLBACK");
        assert_eq!(CacheStatus::Bypass.to_string(), "BYPASS");
    }

    #[test]
    fn stamp_sets_the_header() {
        let mut headers = HeaderMap::new();
        CacheStatus::Hit.stamp(&mut headers);
        assert_eq!(
            headers.get(header_names::X_CACHE_STATUS).unwrap(),
            &HeaderValue::from_static("HIT")
        );

        CacheStatus::Fallback.stamp(&mut headers);
        assert_eq!(
            headers.get(header_names::X_CACHE_STATUS).unwrap(),
            &HeaderValue::from_static("FALLBACK")
        );
    }
}
