mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::{AlarmRecord, HistoryAction, HistoryRecord, NotifRecord, ReminderRecord};

use crate::guid::Guid;

/// Abstract storage interface for persistence.
///
/// All methods use `&self`; implementations must handle interior mutability
/// (e.g. `Mutex<Connection>` for sqlite). Each table is owned by exactly one
/// manager and nothing else touches it.
pub trait Store: Send + Sync + 'static {
    /// Insert a new alarm entry, returning its row id.
    fn insert_alarm(&self, rec: &AlarmRecord) -> Result<i64, String>;

    /// Get the alarm entry for a guid.
    fn get_alarm(&self, guid: &Guid) -> Result<Option<AlarmRecord>, String>;

    /// List all alarm entries, ordered by due time ascending.
    fn list_alarms(&self) -> Result<Vec<AlarmRecord>, String>;

    /// List alarm entries due at or before the given time.
    fn alarms_due_before(&self, time: i64) -> Result<Vec<AlarmRecord>, String>;

    /// Delete the alarm entry for a guid.
    fn delete_alarm(&self, guid: &Guid) -> Result<(), String>;

    /// Insert a new notification entry, returning its row id.
    fn insert_notif(&self, rec: &NotifRecord) -> Result<i64, String>;

    /// Get the notification entry for a guid.
    fn get_notif(&self, guid: &Guid) -> Result<Option<NotifRecord>, String>;

    /// List notification entries currently marked visible.
    fn list_visible_notifs(&self) -> Result<Vec<NotifRecord>, String>;

    /// Update the visibility flag and show time of a notification entry.
    fn update_notif_visibility(
        &self,
        guid: &Guid,
        visible: bool,
        show_time: i64,
    ) -> Result<(), String>;

    /// Delete the notification entry for a guid.
    fn delete_notif(&self, guid: &Guid) -> Result<(), String>;

    /// Insert a new reminder, returning its row id.
    fn insert_reminder(&self, rec: &ReminderRecord) -> Result<i64, String>;

    /// Get the reminder for a guid.
    fn get_reminder(&self, guid: &Guid) -> Result<Option<ReminderRecord>, String>;

    /// List all reminders, ordered by creation time descending.
    fn list_reminders(&self) -> Result<Vec<ReminderRecord>, String>;

    /// Delete the reminder for a guid.
    fn delete_reminder(&self, guid: &Guid) -> Result<(), String>;

    /// Append a history entry, returning its row id.
    fn insert_history(&self, rec: &HistoryRecord) -> Result<i64, String>;

    /// List history entries for a guid, newest first.
    fn list_history(&self, guid: &Guid, limit: Option<usize>) -> Result<Vec<HistoryRecord>, String>;

    /// Delete all history entries for a guid.
    fn delete_history(&self, guid: &Guid) -> Result<(), String>;

    /// Get a settings value.
    fn get_setting(&self, key: &str) -> Result<Option<String>, String>;

    /// Set (or overwrite) a settings value.
    fn set_setting(&self, key: &str, value: &str) -> Result<(), String>;

    /// Delete a settings value.
    fn delete_setting(&self, key: &str) -> Result<(), String>;
}
