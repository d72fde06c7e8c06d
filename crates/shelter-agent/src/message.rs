//! Inbound application message protocol.

use serde::{Deserialize, Serialize};

/// Messages the application posts to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppMessage {
    /// Park an emergency payload for deferred transmission.
    #[serde(rename = "CACHE_EMERGENCY_DATA")]
    CacheEmergencyData { payload: serde_json::Value },

    /// Force immediate activation eligibility.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// Error type for message parsing.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Not JSON, or missing the `type` discriminator.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Known type with an invalid shape.
    #[error("invalid {kind} message: {reason}")]
    Invalid { kind: String, reason: String },
}

const KNOWN_TYPES: &[&str] = &["CACHE_EMERGENCY_DATA", "SKIP_WAITING"];

impl AppMessage {
    /// Parse a raw message.
    ///
    /// Messages with an unrecognized `type` yield `None`; they are not
    /// addressed to the agent and must not be treated as errors.
    pub fn parse(raw: &str) -> Result<Option<Self>, MessageError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| MessageError::Malformed(e.to_string()))?;

        let Some(kind) = value.get("type").and_then(|t| t.as_str()) else {
            return Err(MessageError::Malformed("missing type field".to_string()));
        };

        if !KNOWN_TYPES.contains(&kind) {
            return Ok(None);
        }

        let kind = kind.to_string();
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| MessageError::Invalid {
                kind,
                reason: e.to_string(),
            })
    }
}

/// What the host should do after the agent handled a message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// A payload was parked under a reserved key.
    Cached {
        /// The reserved key written.
        key: String,
    },
    /// The host should drive activation now.
    ActivationRequested,
    /// The message was not addressed to the agent.
    Ignored,
}
