use serde::{Deserialize, Serialize};
use url::Url;

use crate::guid::Guid;

/// Notification importance or priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationImportance {
    Min,
    Low,
    Default,
    High,
    Max,
}

impl NotificationImportance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Low => "low",
            Self::Default => "default",
            Self::High => "high",
            Self::Max => "max",
        }
    }

    pub fn from_label(s: &str) -> Self {
        match s {
            "min" => Self::Min,
            "low" => Self::Low,
            "high" => Self::High,
            "max" => Self::Max,
            _ => Self::Default,
        }
    }
}

/// Grouping metadata for notification channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannelGroup {
    pub id: String,
    pub name: String,
}

/// Channel metadata registered with the tray alongside each posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: NotificationImportance,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub badge: bool,
    /// Vibration pattern in milliseconds, if the channel vibrates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<Vec<u64>>,
    /// LED color, if the channel lights up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<NotificationChannelGroup>,
}

/// An action button attached to a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Url>,
    pub label: String,
}

/// Notification content as authored by the controller and persisted until
/// the entry is removed or terminally interacted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<Url>,
    pub title: String,
    pub message: String,
    pub channel: NotificationChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_complete: Option<NotificationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_incomplete: Option<NotificationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_snooze: Option<NotificationAction>,
}

/// Kinds of notification interaction delivered by the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifAction {
    /// Notification clicked. The tray has already cleared it and the record
    /// is deleted.
    Click,
    /// Notification dismissed. The tray has already cleared it and the
    /// record is deleted.
    Dismiss,
    /// Complete action button. The notification stays visible and the record
    /// is retained.
    ActionComplete,
    /// Incomplete action button. The record is retained.
    ActionIncomplete,
    /// Snooze action button. The record is retained.
    ActionSnooze,
}

impl NotifAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Dismiss => "dismiss",
            Self::ActionComplete => "action_complete",
            Self::ActionIncomplete => "action_incomplete",
            Self::ActionSnooze => "action_snooze",
        }
    }

    /// Parses an interaction label from a tray callback. Unknown labels are
    /// `None` so malformed callbacks can be dropped at the edge.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "click" => Some(Self::Click),
            "dismiss" => Some(Self::Dismiss),
            "action_complete" => Some(Self::ActionComplete),
            "action_incomplete" => Some(Self::ActionIncomplete),
            "action_snooze" => Some(Self::ActionSnooze),
            _ => None,
        }
    }

    /// Click and dismiss also clear the tray entry and delete the record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Click | Self::Dismiss)
    }
}

/// Event emitted for every notification interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifResponse {
    pub guid: Guid,
    /// Elapsed milliseconds between the show and the interaction.
    pub delay: i64,
    pub action: NotifAction,
}
