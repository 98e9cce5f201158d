use std::sync::Arc;

use crate::storage::Store;

/// Namespaced typed view over the settings table.
///
/// Each component builds its own `Prefs` with a distinct namespace so keys
/// never collide ("alarm.time_last_launch" etc.).
pub struct Prefs {
    store: Arc<dyn Store>,
    namespace: String,
}

impl Prefs {
    pub fn new(store: Arc<dyn Store>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}.{}", self.namespace, key)
    }

    /// Returns whether the given key exists.
    pub fn has(&self, key: &str) -> Result<bool, String> {
        Ok(self.store.get_setting(&self.key(key))?.is_some())
    }

    /// Removes the value with the given key.
    pub fn remove(&self, key: &str) -> Result<(), String> {
        self.store.delete_setting(&self.key(key))
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), String> {
        self.store.set_setting(&self.key(key), value)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, String> {
        self.store.get_setting(&self.key(key))
    }

    pub fn set_i64(&self, key: &str, value: i64) -> Result<(), String> {
        self.store.set_setting(&self.key(key), &value.to_string())
    }

    /// Returns the value, or `None` if it is absent or not an integer.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, String> {
        Ok(self
            .store
            .get_setting(&self.key(key))?
            .and_then(|v| v.parse().ok()))
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<(), String> {
        self.store
            .set_setting(&self.key(key), if value { "true" } else { "false" })
    }

    /// Returns the value, or `None` if it is absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, String> {
        Ok(self
            .store
            .get_setting(&self.key(key))?
            .and_then(|v| match v.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    fn make_prefs(namespace: &str) -> Prefs {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        Prefs::new(store, namespace)
    }

    #[test]
    fn i64_round_trip_and_overwrite() {
        let prefs = make_prefs("alarm");
        assert_eq!(prefs.get_i64("time_last_launch").unwrap(), None);

        prefs.set_i64("time_last_launch", 123).unwrap();
        assert_eq!(prefs.get_i64("time_last_launch").unwrap(), Some(123));

        prefs.set_i64("time_last_launch", -7).unwrap();
        assert_eq!(prefs.get_i64("time_last_launch").unwrap(), Some(-7));
    }

    #[test]
    fn string_and_bool_round_trip() {
        let prefs = make_prefs("test");
        prefs.set_string("name", "remind").unwrap();
        assert_eq!(prefs.get_string("name").unwrap().as_deref(), Some("remind"));

        prefs.set_bool("flag", true).unwrap();
        assert_eq!(prefs.get_bool("flag").unwrap(), Some(true));
    }

    #[test]
    fn wrong_type_reads_as_none() {
        let prefs = make_prefs("test");
        prefs.set_string("value", "not a number").unwrap();
        assert_eq!(prefs.get_i64("value").unwrap(), None);
        assert_eq!(prefs.get_bool("value").unwrap(), None);
    }

    #[test]
    fn namespaces_are_disjoint() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let alarm = Prefs::new(store.clone(), "alarm");
        let notif = Prefs::new(store, "notif");

        alarm.set_i64("time_last_launch", 1).unwrap();
        assert_eq!(notif.get_i64("time_last_launch").unwrap(), None);
        assert!(alarm.has("time_last_launch").unwrap());
        assert!(!notif.has("time_last_launch").unwrap());
    }

    #[test]
    fn remove_deletes_the_key() {
        let prefs = make_prefs("test");
        prefs.set_i64("value", 5).unwrap();
        prefs.remove("value").unwrap();
        assert!(!prefs.has("value").unwrap());
        prefs.remove("value").unwrap();
    }
}
