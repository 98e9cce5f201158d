mod timer;

pub use timer::TokioWakeTimer;

use url::Url;

use crate::notif::model::{NotifAction, NotificationImportance};

/// Exact wake-timer service.
///
/// Registrations survive process restarts when the service is system-level;
/// an in-process implementation loses them with the process. Either way the
/// service reports the instant its registrations were last lost through
/// `boot_time_millis`, and the alarm scheduler re-arms everything recorded
/// before that instant during initialization.
pub trait WakeTimer: Send + Sync + 'static {
    /// Arms a timer that fires at (or shortly after) the given absolute
    /// time, waking the device if asleep. Re-registering a tag replaces the
    /// previous registration.
    fn register(&self, tag: &str, at_millis: i64);

    /// Disarms the timer for a tag. Harmless if none is registered.
    fn cancel(&self, tag: &str);

    /// Instant (epoch milliseconds) after which previously registered timers
    /// are no longer armed.
    fn boot_time_millis(&self) -> i64;
}

/// Notification tray service.
///
/// The tray owns everything display-related: channel registration, layout,
/// sound and vibration. The notification manager only hands it a rendered
/// payload and keeps its own table in sync with what it believes is shown.
pub trait Tray: Send + Sync + 'static {
    /// Displays (or updates) the notification for a tag.
    fn post(&self, tag: &str, rendered: &RenderedNotification);

    /// Removes the notification for a tag. Harmless if not displayed.
    fn cancel(&self, tag: &str);
}

/// An action button on a rendered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAction {
    pub action: NotifAction,
    pub label: String,
    pub icon: Option<Url>,
}

/// Display payload handed to the tray.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNotification {
    pub title: String,
    pub message: String,
    pub importance: NotificationImportance,
    pub channel_id: String,
    pub channel_name: String,
    pub small_icon: Option<Url>,
    pub image: Option<Url>,
    pub sound: Option<Url>,
    pub actions: Vec<RenderedAction>,
}
