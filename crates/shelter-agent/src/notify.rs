//! Push notifications and interaction routing.

use serde::{Deserialize, Serialize};
use shelter_core::NotificationConfig;

use crate::clients::ClientId;

/// Interactive actions attached to every alert notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    View,
    Dismiss,
}

impl std::fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Dismiss => write!(f, "dismiss"),
        }
    }
}

/// An action button on a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationButton {
    /// Action fired on click.
    pub action: NotificationAction,
    /// Button label.
    pub title: String,
}

/// A notification ready for the host to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Icon asset path.
    pub icon: Option<String>,
    /// Badge asset path.
    pub badge: Option<String>,
    /// Interactive actions, in display order.
    pub actions: Vec<NotificationButton>,
}

impl Notification {
    /// Build a notification from a push payload, falling back to the
    /// configured default body when the payload is absent or empty.
    pub fn from_push(config: &NotificationConfig, payload: Option<&str>) -> Self {
        let body = match payload {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => config.default_body.clone(),
        };

        Self {
            title: config.title.clone(),
            body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            actions: vec![
                NotificationButton {
                    action: NotificationAction::View,
                    title: "View Details".to_string(),
                },
                NotificationButton {
                    action: NotificationAction::Dismiss,
                    title: "Dismiss".to_string(),
                },
            ],
        }
    }
}

/// Where a notification interaction routed the user.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationRoute {
    /// An existing same-origin client was brought to the foreground.
    Focused(ClientId),
    /// A new client was opened at the entry URL.
    Opened(ClientId),
    /// The notification was closed with no navigation.
    Closed,
}
