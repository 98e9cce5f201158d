use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::guid::Guid;
use crate::storage::{ReminderRecord, Store};

/// Durable store of user-authored reminder content.
pub struct ReminderStore {
    store: Arc<dyn Store>,
    lock: Mutex<()>,
}

impl ReminderStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Adds a reminder, replacing any existing entry for its guid.
    pub async fn add(&self, reminder: &ReminderRecord) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        if let Some(existing) = self.store.get_reminder(&reminder.guid)? {
            self.store.delete_reminder(&existing.guid)?;
        }
        self.store.insert_reminder(reminder)?;
        debug!(guid = %reminder.guid, title = %reminder.title, "add");
        Ok(())
    }

    /// Returns the reminder for a guid, if any.
    pub async fn get(&self, guid: &Guid) -> Result<Option<ReminderRecord>, String> {
        let _guard = self.lock.lock().await;
        self.store.get_reminder(guid)
    }

    /// Returns every reminder, newest first.
    pub async fn list(&self) -> Result<Vec<ReminderRecord>, String> {
        let _guard = self.lock.lock().await;
        self.store.list_reminders()
    }

    /// Deletes the reminder for a guid. No-op if absent.
    pub async fn delete(&self, guid: &Guid) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        let Some(reminder) = self.store.get_reminder(guid)? else {
            return Ok(());
        };
        debug!(%guid, "delete");
        self.store.delete_reminder(&reminder.guid)
    }
}
