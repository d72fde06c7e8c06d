//! Sync trigger tags.

use shelter_cache::reserved;

/// Binding from a trigger tag to the reserved key it flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTag {
    /// Tag carried by the trigger.
    pub tag: String,
    /// Reserved key to flush.
    pub key: String,
    /// Whether the host should re-arm the trigger after a flush.
    pub periodic: bool,
}

/// Registry of known trigger tags.
#[derive(Debug, Clone, Default)]
pub struct SyncTags {
    tags: Vec<SyncTag>,
}

impl SyncTags {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard tags for the emergency application.
    pub fn standard() -> Self {
        Self::new()
            .with_tag("emergency-data-sync", reserved::EMERGENCY_DATA, false)
            .with_tag("student-scans-sync", reserved::STUDENT_SCANS, false)
            .with_tag("emergency-data-refresh", reserved::EMERGENCY_DATA, true)
    }

    /// Register a tag. A re-registration replaces the prior binding.
    pub fn with_tag(
        mut self,
        tag: impl Into<String>,
        key: impl Into<String>,
        periodic: bool,
    ) -> Self {
        let tag = tag.into();
        self.tags.retain(|t| t.tag != tag);
        self.tags.push(SyncTag {
            tag,
            key: key.into(),
            periodic,
        });
        self
    }

    /// Resolve a trigger tag.
    pub fn resolve(&self, tag: &str) -> Option<&SyncTag> {
        self.tags.iter().find(|t| t.tag == tag)
    }

    /// Tags the host should re-arm on a schedule.
    pub fn periodic(&self) -> impl Iterator<Item = &SyncTag> {
        self.tags.iter().filter(|t| t.periodic)
    }
}
