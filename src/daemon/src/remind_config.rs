use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use url::Url;

use remind_core::{
    ControllerConfig, NotificationChannel, NotificationChannelGroup, NotificationImportance,
};

use crate::paths::remind_config_path;

/// Daemon configuration, read from `~/.remind/config.toml` (override with
/// `REMIND_CONFIG`). Every section falls back to its defaults when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemindConfig {
    pub controller: ControllerSection,
    pub channel: ChannelSection,
    pub reminders: Vec<SeedReminder>,
}

impl Default for RemindConfig {
    fn default() -> Self {
        Self {
            controller: ControllerSection::default(),
            channel: ChannelSection::default(),
            reminders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    /// Seconds until the next regular occurrence after a regular firing.
    pub regular_repeat_secs: u64,
    /// Seconds until the next snooze occurrence after a snooze firing.
    pub snooze_delay_secs: u64,
    /// Seconds until the auto-snooze fallback re-alert.
    pub auto_snooze_delay_secs: u64,
    pub small_icon: Option<Url>,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            regular_repeat_secs: 3 * 60 * 60,
            snooze_delay_secs: 15 * 60,
            auto_snooze_delay_secs: 5 * 60,
            small_icon: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelSection {
    pub id: String,
    pub name: String,
    pub importance: String,
    pub description: String,
    pub sound: Option<Url>,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            id: "reminders".into(),
            name: "Reminders".into(),
            importance: "default".into(),
            description: String::new(),
            sound: None,
            group_id: None,
            group_name: None,
        }
    }
}

/// A reminder primed into the store at startup if not already present.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedReminder {
    pub guid: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// First regular fire, seconds after daemon start.
    #[serde(default)]
    pub first_fire_secs: Option<u64>,
    /// First regular fire as an absolute RFC 3339 time. Wins over the
    /// relative offset.
    #[serde(default)]
    pub first_fire_at: Option<String>,
}

impl SeedReminder {
    /// Resolves the first fire time against `now` (epoch milliseconds).
    pub fn first_fire_millis(&self, now: i64) -> Result<i64, String> {
        if let Some(at) = &self.first_fire_at {
            let parsed = DateTime::parse_from_rfc3339(at)
                .map_err(|e| format!("parse first_fire_at: {e}"))?;
            return Ok(parsed.timestamp_millis());
        }
        Ok(now + self.first_fire_secs.unwrap_or(30) as i64 * 1000)
    }
}

impl RemindConfig {
    pub fn load() -> Result<Self, String> {
        let path = remind_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw =
            std::fs::read_to_string(&path).map_err(|e| format!("read config.toml: {e}"))?;
        toml::from_str(&raw).map_err(|e| format!("parse config.toml: {e}"))
    }

    /// Maps the file sections onto the controller's configuration.
    pub fn controller(&self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        let group = match &self.channel.group_id {
            Some(id) => Some(NotificationChannelGroup {
                id: id.clone(),
                name: self.channel.group_name.clone().unwrap_or_else(|| id.clone()),
            }),
            None => defaults.channel.group,
        };

        ControllerConfig {
            regular_repeat: Duration::from_secs(self.controller.regular_repeat_secs),
            snooze_delay: Duration::from_secs(self.controller.snooze_delay_secs),
            auto_snooze_delay: Duration::from_secs(self.controller.auto_snooze_delay_secs),
            channel: NotificationChannel {
                id: self.channel.id.clone(),
                name: self.channel.name.clone(),
                importance: NotificationImportance::from_label(&self.channel.importance),
                description: self.channel.description.clone(),
                badge: false,
                vibration: None,
                lights: None,
                sound: self.channel.sound.clone(),
                group,
            },
            small_icon: self.controller.small_icon.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: RemindConfig = toml::from_str(
            r#"
            [controller]
            regular_repeat_secs = 60
            snooze_delay_secs = 30
            auto_snooze_delay_secs = 10

            [channel]
            id = "custom"
            name = "Custom"
            importance = "high"
            group_id = "custom-group"

            [[reminders]]
            guid = "1894d6cc-5128-4f59-9d5d-5f1781c1b118"
            title = "Pizza"
            description = "Pepperoni Pizza"
            first_fire_secs = 30
            "#,
        )
        .unwrap();

        let controller = config.controller();
        assert_eq!(controller.regular_repeat, Duration::from_secs(60));
        assert_eq!(controller.channel.id, "custom");
        assert_eq!(
            controller.channel.importance,
            NotificationImportance::High
        );
        assert_eq!(
            controller.channel.group.unwrap().name,
            "custom-group"
        );
        assert_eq!(config.reminders.len(), 1);
        assert_eq!(config.reminders[0].title, "Pizza");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: RemindConfig = toml::from_str("").unwrap();
        let controller = config.controller();
        assert_eq!(controller.regular_repeat, Duration::from_secs(3 * 60 * 60));
        assert_eq!(controller.channel.id, "reminders");
        assert!(config.reminders.is_empty());
    }

    #[test]
    fn seed_fire_time_relative_and_absolute() {
        let relative = SeedReminder {
            guid: "g".into(),
            title: "t".into(),
            description: String::new(),
            first_fire_secs: Some(60),
            first_fire_at: None,
        };
        assert_eq!(relative.first_fire_millis(1_000).unwrap(), 61_000);

        let absolute = SeedReminder {
            guid: "g".into(),
            title: "t".into(),
            description: String::new(),
            first_fire_secs: Some(60),
            first_fire_at: Some("1970-01-02T00:00:00Z".into()),
        };
        // The absolute time wins over the relative offset.
        assert_eq!(absolute.first_fire_millis(1_000).unwrap(), 86_400_000);

        let bad = SeedReminder {
            first_fire_at: Some("not a time".into()),
            ..absolute
        };
        assert!(bad.first_fire_millis(0).is_err());
    }
}
