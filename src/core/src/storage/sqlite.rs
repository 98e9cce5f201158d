use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, types::Type, Connection};

use super::types::{AlarmRecord, HistoryAction, HistoryRecord, NotifRecord, ReminderRecord};
use super::Store;
use crate::guid::Guid;
use crate::notif::model::Notification;

/// SQLite-backed store for alarm, notification, reminder, history and
/// settings state.
///
/// Uses a `Mutex<Connection>` for thread-safe interior mutability. The
/// database is created/migrated on `open()`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a sqlite database at the given path.
    pub fn open(path: &Path) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| format!("sqlite open: {e}"))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| format!("sqlite open: {e}"))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS alarms (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                guid  TEXT NOT NULL UNIQUE,
                time  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_alarms_time
                ON alarms (time);

            CREATE TABLE IF NOT EXISTS notifs (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                guid         TEXT NOT NULL UNIQUE,
                show_time    INTEGER NOT NULL DEFAULT 0,
                visible      INTEGER NOT NULL DEFAULT 0,
                notification TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reminders (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                guid               TEXT NOT NULL UNIQUE,
                created_time       INTEGER NOT NULL,
                last_modified_time INTEGER NOT NULL,
                title              TEXT NOT NULL,
                description        TEXT NOT NULL,
                enabled            INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS history (
                id     INTEGER PRIMARY KEY AUTOINCREMENT,
                guid   TEXT NOT NULL,
                time   INTEGER NOT NULL,
                delay  INTEGER NOT NULL DEFAULT 0,
                action TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_guid
                ON history (guid, time DESC);

            CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| format!("migrate: {e}"))?;

        Ok(())
    }
}

impl Store for SqliteStore {
    fn insert_alarm(&self, rec: &AlarmRecord) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "INSERT INTO alarms (guid, time) VALUES (?1, ?2)",
            params![rec.guid.as_str(), rec.time],
        )
        .map_err(|e| format!("insert_alarm: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_alarm(&self, guid: &Guid) -> Result<Option<AlarmRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare("SELECT id, guid, time FROM alarms WHERE guid = ?1")
            .map_err(|e| format!("get_alarm prepare: {e}"))?;

        let mut rows = stmt
            .query_map(params![guid.as_str()], alarm_from_row)
            .map_err(|e| format!("get_alarm query: {e}"))?;

        match rows.next() {
            Some(Ok(rec)) => Ok(Some(rec)),
            Some(Err(e)) => Err(format!("get_alarm row: {e}")),
            None => Ok(None),
        }
    }

    fn list_alarms(&self) -> Result<Vec<AlarmRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare("SELECT id, guid, time FROM alarms ORDER BY time ASC")
            .map_err(|e| format!("list_alarms prepare: {e}"))?;

        let rows = stmt
            .query_map([], alarm_from_row)
            .map_err(|e| format!("list_alarms query: {e}"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("list_alarms collect: {e}"))
    }

    fn alarms_due_before(&self, time: i64) -> Result<Vec<AlarmRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare("SELECT id, guid, time FROM alarms WHERE time <= ?1 ORDER BY time ASC")
            .map_err(|e| format!("alarms_due_before prepare: {e}"))?;

        let rows = stmt
            .query_map(params![time], alarm_from_row)
            .map_err(|e| format!("alarms_due_before query: {e}"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("alarms_due_before collect: {e}"))
    }

    fn delete_alarm(&self, guid: &Guid) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute("DELETE FROM alarms WHERE guid = ?1", params![guid.as_str()])
            .map_err(|e| format!("delete_alarm: {e}"))?;
        Ok(())
    }

    fn insert_notif(&self, rec: &NotifRecord) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let notification = serialize_notification(&rec.notification)?;
        conn.execute(
            "INSERT INTO notifs (guid, show_time, visible, notification)
             VALUES (?1, ?2, ?3, ?4)",
            params![rec.guid.as_str(), rec.show_time, rec.visible, notification],
        )
        .map_err(|e| format!("insert_notif: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_notif(&self, guid: &Guid) -> Result<Option<NotifRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, guid, show_time, visible, notification
                 FROM notifs WHERE guid = ?1",
            )
            .map_err(|e| format!("get_notif prepare: {e}"))?;

        let mut rows = stmt
            .query_map(params![guid.as_str()], notif_from_row)
            .map_err(|e| format!("get_notif query: {e}"))?;

        match rows.next() {
            Some(Ok(rec)) => Ok(Some(rec)),
            Some(Err(e)) => Err(format!("get_notif row: {e}")),
            None => Ok(None),
        }
    }

    fn list_visible_notifs(&self) -> Result<Vec<NotifRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, guid, show_time, visible, notification
                 FROM notifs WHERE visible = 1 ORDER BY show_time ASC",
            )
            .map_err(|e| format!("list_visible_notifs prepare: {e}"))?;

        let rows = stmt
            .query_map([], notif_from_row)
            .map_err(|e| format!("list_visible_notifs query: {e}"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("list_visible_notifs collect: {e}"))
    }

    fn update_notif_visibility(
        &self,
        guid: &Guid,
        visible: bool,
        show_time: i64,
    ) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "UPDATE notifs SET visible = ?1, show_time = ?2 WHERE guid = ?3",
            params![visible, show_time, guid.as_str()],
        )
        .map_err(|e| format!("update_notif_visibility: {e}"))?;
        Ok(())
    }

    fn delete_notif(&self, guid: &Guid) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute("DELETE FROM notifs WHERE guid = ?1", params![guid.as_str()])
            .map_err(|e| format!("delete_notif: {e}"))?;
        Ok(())
    }

    fn insert_reminder(&self, rec: &ReminderRecord) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "INSERT INTO reminders
                (guid, created_time, last_modified_time, title, description, enabled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                rec.guid.as_str(),
                rec.created_time,
                rec.last_modified_time,
                rec.title,
                rec.description,
                rec.enabled,
            ],
        )
        .map_err(|e| format!("insert_reminder: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_reminder(&self, guid: &Guid) -> Result<Option<ReminderRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, guid, created_time, last_modified_time, title, description, enabled
                 FROM reminders WHERE guid = ?1",
            )
            .map_err(|e| format!("get_reminder prepare: {e}"))?;

        let mut rows = stmt
            .query_map(params![guid.as_str()], reminder_from_row)
            .map_err(|e| format!("get_reminder query: {e}"))?;

        match rows.next() {
            Some(Ok(rec)) => Ok(Some(rec)),
            Some(Err(e)) => Err(format!("get_reminder row: {e}")),
            None => Ok(None),
        }
    }

    fn list_reminders(&self) -> Result<Vec<ReminderRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, guid, created_time, last_modified_time, title, description, enabled
                 FROM reminders ORDER BY created_time DESC",
            )
            .map_err(|e| format!("list_reminders prepare: {e}"))?;

        let rows = stmt
            .query_map([], reminder_from_row)
            .map_err(|e| format!("list_reminders query: {e}"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("list_reminders collect: {e}"))
    }

    fn delete_reminder(&self, guid: &Guid) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "DELETE FROM reminders WHERE guid = ?1",
            params![guid.as_str()],
        )
        .map_err(|e| format!("delete_reminder: {e}"))?;
        Ok(())
    }

    fn insert_history(&self, rec: &HistoryRecord) -> Result<i64, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "INSERT INTO history (guid, time, delay, action) VALUES (?1, ?2, ?3, ?4)",
            params![rec.guid.as_str(), rec.time, rec.delay, rec.action.as_str()],
        )
        .map_err(|e| format!("insert_history: {e}"))?;
        Ok(conn.last_insert_rowid())
    }

    fn list_history(
        &self,
        guid: &Guid,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRecord>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, guid, time, delay, action
                 FROM history WHERE guid = ?1 ORDER BY time DESC, id DESC LIMIT ?2",
            )
            .map_err(|e| format!("list_history prepare: {e}"))?;

        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt
            .query_map(params![guid.as_str(), limit], history_from_row)
            .map_err(|e| format!("list_history query: {e}"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("list_history collect: {e}"))
    }

    fn delete_history(&self, guid: &Guid) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute("DELETE FROM history WHERE guid = ?1", params![guid.as_str()])
            .map_err(|e| format!("delete_history: {e}"))?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = ?1")
            .map_err(|e| format!("get_setting prepare: {e}"))?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .map_err(|e| format!("get_setting query: {e}"))?;

        match rows.next() {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(e)) => Err(format!("get_setting row: {e}")),
            None => Ok(None),
        }
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| format!("set_setting: {e}"))?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<(), String> {
        let conn = self.conn.lock().map_err(|e| format!("lock: {e}"))?;
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(|e| format!("delete_setting: {e}"))?;
        Ok(())
    }
}

fn alarm_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlarmRecord> {
    Ok(AlarmRecord {
        id: row.get(0)?,
        guid: Guid::from_string(row.get::<_, String>(1)?),
        time: row.get(2)?,
    })
}

fn notif_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotifRecord> {
    Ok(NotifRecord {
        id: row.get(0)?,
        guid: Guid::from_string(row.get::<_, String>(1)?),
        show_time: row.get(2)?,
        visible: row.get(3)?,
        notification: parse_notification_json(row.get(4)?)?,
    })
}

fn reminder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReminderRecord> {
    Ok(ReminderRecord {
        id: row.get(0)?,
        guid: Guid::from_string(row.get::<_, String>(1)?),
        created_time: row.get(2)?,
        last_modified_time: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        enabled: row.get(6)?,
    })
}

fn history_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        guid: Guid::from_string(row.get::<_, String>(1)?),
        time: row.get(2)?,
        delay: row.get(3)?,
        action: HistoryAction::from_label(&row.get::<_, String>(4)?),
    })
}

fn serialize_notification(notification: &Notification) -> Result<String, String> {
    serde_json::to_string(notification).map_err(|e| format!("serialize notification: {e}"))
}

fn parse_notification_json(raw: String) -> rusqlite::Result<Notification> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}
