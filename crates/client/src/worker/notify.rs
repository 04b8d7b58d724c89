//! Push display and notification-click routing.

use chrono::Utc;
use serde::Serialize;

use super::ServiceWorker;

pub const DEFAULT_PUSH_BODY: &str = "New drop available!";
const ICON: &str = "/assets/icons/icon-192x192.png";
const BADGE: &str = "/assets/icons/badge-72x72.png";
const VIBRATE: [u32; 3] = [100, 50, 100];

/// Page opened by the `explore` action.
pub const EXPLORE_TARGET: &str = "/#new-arrivals";
/// Page opened when the notification body is clicked.
pub const DEFAULT_TARGET: &str = "/";

#[derive(Debug, Clone, PartialEq, Serialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, schemars::JsonSchema)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification ready to be shown by the host.
#[derive(Debug, Clone, PartialEq, Serialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// What the host should do after a notification click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum ClickOutcome {
    OpenWindow(String),
    Dismiss,
}

fn action(action: &str, title: &str) -> NotificationAction {
    NotificationAction {
        action: action.to_string(),
        title: title.to_string(),
        icon: format!("/assets/icons/action-{action}.png"),
    }
}

impl ServiceWorker {
    /// Build the notification for a push; an absent or blank payload uses
    /// the default body.
    pub fn push(&self, payload: Option<&str>) -> Notification {
        let body = payload
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(DEFAULT_PUSH_BODY)
            .to_string();
        tracing::info!(%body, "push received");

        Notification {
            title: self.config.store_name.clone(),
            body,
            icon: ICON.to_string(),
            badge: BADGE.to_string(),
            vibrate: VIBRATE.to_vec(),
            data: NotificationData { date_of_arrival: Utc::now().timestamp_millis(), primary_key: 1 },
            actions: vec![action("explore", "See the drop"), action("close", "Close")],
        }
    }

    /// Route a notification click. The notification itself is always closed.
    pub fn notification_click(&self, action: Option<&str>) -> ClickOutcome {
        let outcome = match action {
            Some("explore") => ClickOutcome::OpenWindow(EXPLORE_TARGET.to_string()),
            Some("close") => ClickOutcome::Dismiss,
            _ => ClickOutcome::OpenWindow(DEFAULT_TARGET.to_string()),
        };
        tracing::debug!(?action, ?outcome, "notification clicked");
        outcome
    }
}
