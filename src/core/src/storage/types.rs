use serde::{Deserialize, Serialize};

use crate::guid::Guid;
use crate::notif::model::Notification;

/// Persisted alarm entry. At most one live entry exists per guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub id: i64,
    pub guid: Guid,
    /// Absolute due time in epoch milliseconds.
    pub time: i64,
}

/// Persisted notification entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifRecord {
    pub id: i64,
    pub guid: Guid,
    /// When the notification was last shown, 0 while hidden.
    pub show_time: i64,
    pub visible: bool,
    pub notification: Notification,
}

/// Persisted reminder authored by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub id: i64,
    pub guid: Guid,
    pub created_time: i64,
    pub last_modified_time: i64,
    pub title: String,
    pub description: String,
    pub enabled: bool,
}

/// What happened to a reminder's notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Show,
    ReShow,
    Click,
    Dismiss,
    Complete,
    Incomplete,
    Snooze,
    Cancelled,
    Replaced,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::ReShow => "re_show",
            Self::Click => "click",
            Self::Dismiss => "dismiss",
            Self::Complete => "complete",
            Self::Incomplete => "incomplete",
            Self::Snooze => "snooze",
            Self::Cancelled => "cancelled",
            Self::Replaced => "replaced",
        }
    }

    pub fn from_label(s: &str) -> Self {
        match s {
            "re_show" => Self::ReShow,
            "click" => Self::Click,
            "dismiss" => Self::Dismiss,
            "complete" => Self::Complete,
            "incomplete" => Self::Incomplete,
            "snooze" => Self::Snooze,
            "cancelled" => Self::Cancelled,
            "replaced" => Self::Replaced,
            _ => Self::Show,
        }
    }
}

/// Persisted history entry for a reminder's notification lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub guid: Guid,
    pub time: i64,
    /// Milliseconds between the show and the recorded action, 0 when not
    /// interaction-driven.
    pub delay: i64,
    pub action: HistoryAction,
}
