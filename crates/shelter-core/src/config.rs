//! Agent configuration.

use serde::{Deserialize, Serialize};

use crate::origin::Origin;

/// Ordered list of assets to pre-load at install.
///
/// Every path is attempted once; a missing asset is skipped, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manifest from an ordered list of paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut manifest = Self::new();
        for path in paths {
            manifest.ensure(&path.into());
        }
        manifest
    }

    /// Append a path, keeping the list free of duplicates.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.ensure(&path.into());
        self
    }

    /// Append a path unless it is already listed.
    pub fn ensure(&mut self, path: &str) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_string());
        }
    }

    /// The paths in install order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of listed assets.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Display defaults for alert notifications. Pure configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Notification title.
    pub title: String,
    /// Body used when a push carries no payload.
    pub default_body: String,
    /// Icon asset path.
    pub icon: Option<String>,
    /// Badge asset path.
    pub badge: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Emergency Alert".to_string(),
            default_body: "New emergency alert. Tap to view details.".to_string(),
            icon: Some("/icons/icon-192.png".to_string()),
            badge: Some("/icons/badge-72.png".to_string()),
        }
    }
}

/// Startup configuration handed to the coordinator.
///
/// The cache version is an explicit value here rather than process-wide
/// state; two coordinators with different versions can coexist.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Name of the active cache version.
    pub cache_version: String,
    /// Origin of the hosting application.
    pub origin: Origin,
    /// Assets to pre-load at install.
    pub precache: AssetManifest,
    /// Reserved key of the offline fallback page.
    pub offline_fallback: String,
    /// URL opened when a notification is activated with no client to focus.
    pub entry_url: String,
    /// Notification display defaults.
    pub notification: NotificationConfig,
}

impl AgentConfig {
    /// Create a configuration with the standard reserved paths.
    pub fn new(cache_version: impl Into<String>, origin: Origin) -> Self {
        Self {
            cache_version: cache_version.into(),
            origin,
            precache: AssetManifest::new(),
            offline_fallback: "/offline.html".to_string(),
            entry_url: "/?emergency=true".to_string(),
            notification: NotificationConfig::default(),
        }
    }

    /// Set the precache manifest.
    pub fn with_precache(mut self, precache: AssetManifest) -> Self {
        self.precache = precache;
        self
    }

    /// Set the offline fallback path.
    pub fn with_offline_fallback(mut self, path: impl Into<String>) -> Self {
        self.offline_fallback = path.into();
        self
    }

    /// Set the notification entry URL.
    pub fn with_entry_url(mut self, url: impl Into<String>) -> Self {
        self.entry_url = url.into();
        self
    }

    /// Set the notification defaults.
    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = notification;
        self
    }
}
