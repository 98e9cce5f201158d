pub mod alarm;
pub mod config;
pub mod controller;
pub mod gate;
pub mod guid;
pub mod history;
pub mod notif;
pub mod platform;
pub mod prefs;
pub mod reminder;
pub mod storage;

pub use alarm::AlarmScheduler;
pub use config::ControllerConfig;
pub use controller::{AlarmGuidExt, AlarmKind, Controller, NoopPolicy, ReminderPolicy};
pub use gate::ReadyGate;
pub use guid::Guid;
pub use history::History;
pub use notif::model::{
    NotifAction, NotifResponse, Notification, NotificationAction, NotificationChannel,
    NotificationChannelGroup, NotificationImportance,
};
pub use notif::NotifManager;
pub use platform::{RenderedAction, RenderedNotification, TokioWakeTimer, Tray, WakeTimer};
pub use prefs::Prefs;
pub use reminder::ReminderStore;
pub use storage::{
    AlarmRecord, HistoryAction, HistoryRecord, NotifRecord, ReminderRecord, SqliteStore, Store,
};
