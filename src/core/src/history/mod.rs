use std::sync::Arc;

use tracing::debug;

use crate::guid::Guid;
use crate::storage::{HistoryAction, HistoryRecord, Store};

/// Append-only log of what happened to each reminder's notification.
pub struct History {
    store: Arc<dyn Store>,
}

impl History {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends an entry for the guid, stamped with the current time.
    pub fn add(&self, guid: &Guid, action: HistoryAction, delay: i64) -> Result<(), String> {
        debug!(%guid, action = action.as_str(), delay, "add");
        self.store.insert_history(&HistoryRecord {
            id: 0,
            guid: guid.clone(),
            time: now_millis(),
            delay,
            action,
        })?;
        Ok(())
    }

    /// Returns all entries for the guid, newest first.
    pub fn for_guid(&self, guid: &Guid) -> Result<Vec<HistoryRecord>, String> {
        self.store.list_history(guid, None)
    }

    /// Returns the last `limit` entries for the guid, newest first.
    pub fn last_for_guid(&self, guid: &Guid, limit: usize) -> Result<Vec<HistoryRecord>, String> {
        self.store.list_history(guid, Some(limit))
    }

    /// Deletes all entries for the guid.
    pub fn delete(&self, guid: &Guid) -> Result<(), String> {
        self.store.delete_history(guid)
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
