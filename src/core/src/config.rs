use std::time::Duration;

use url::Url;

use crate::notif::model::{
    NotificationChannel, NotificationChannelGroup, NotificationImportance,
};

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Offset to the next regular occurrence after a regular firing.
    pub regular_repeat: Duration,
    /// Offset to the next snooze occurrence after a snooze firing.
    pub snooze_delay: Duration,
    /// Offset to the auto-snooze fallback re-alert.
    pub auto_snooze_delay: Duration,
    /// Channel metadata attached to reminder notifications.
    pub channel: NotificationChannel,
    /// Small icon for reminder notifications.
    pub small_icon: Option<Url>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            regular_repeat: Duration::from_secs(3 * 60 * 60),
            snooze_delay: Duration::from_secs(15 * 60),
            auto_snooze_delay: Duration::from_secs(5 * 60),
            channel: NotificationChannel {
                id: "reminders".into(),
                name: "Reminders".into(),
                importance: NotificationImportance::Default,
                description: String::new(),
                badge: false,
                vibration: None,
                lights: None,
                sound: None,
                group: Some(NotificationChannelGroup {
                    id: "reminders-group".into(),
                    name: "Reminders".into(),
                }),
            },
            small_icon: None,
        }
    }
}
