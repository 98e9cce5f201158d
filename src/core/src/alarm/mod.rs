use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::gate::ReadyGate;
use crate::guid::Guid;
use crate::platform::WakeTimer;
use crate::prefs::Prefs;
use crate::storage::{AlarmRecord, Store};

/// Capacity of the fired-alarm subscription channel. Sends block when the
/// buffer is full; nothing is dropped.
pub const SUBSCRIPTION_BUFFER: usize = 50;

const KEY_LAST_LAUNCH: &str = "time_last_launch";

/// Durable alarm scheduler.
///
/// Pending wake-ups live in the alarms table and are mirrored into the
/// wake-timer service. `initialize` reconciles the two after a process
/// restart or reboot; every other operation waits for it behind the ready
/// gate. All operations are serialized by a single lock so no two callers
/// interleave their read-modify-write of an entry.
pub struct AlarmScheduler {
    store: Arc<dyn Store>,
    timer: Arc<dyn WakeTimer>,
    prefs: Prefs,
    fired_tx: mpsc::Sender<Guid>,
    ready: ReadyGate,
    lock: Mutex<()>,
}

impl AlarmScheduler {
    /// The fired-guid sender is handed in by the caller; the matching
    /// receiver is the subscription the controller drains.
    pub fn new(
        store: Arc<dyn Store>,
        timer: Arc<dyn WakeTimer>,
        fired_tx: mpsc::Sender<Guid>,
    ) -> Self {
        let prefs = Prefs::new(store.clone(), "alarm");
        Self {
            store,
            timer,
            prefs,
            fired_tx,
            ready: ReadyGate::new(),
            lock: Mutex::new(()),
        }
    }

    /// Initializes the scheduler. Call once during application startup;
    /// concurrent calls after the first are no-ops.
    ///
    /// Fires and clears every entry already past due, re-registers the
    /// remaining entries when the wake-timer service lost its registrations
    /// since the last recorded launch, and stamps the new launch marker.
    pub async fn initialize(&self) -> Result<(), String> {
        info!("initialize");
        let _guard = self.lock.lock().await;
        if self.ready.is_open() {
            return Ok(());
        }

        let time_last_launch = self.prefs.get_i64(KEY_LAST_LAUNCH)?.unwrap_or(0);

        self.notify_past_due().await?;

        // A reboot cleared every platform-level registration even though the
        // table survived.
        if time_last_launch < self.timer.boot_time_millis() {
            self.apply_all()?;
        }

        self.prefs.set_i64(KEY_LAST_LAUNCH, now_millis())?;

        self.ready.open();
        Ok(())
    }

    /// Schedules an alarm with the given unique guid at the given time,
    /// replacing any existing entry for that guid.
    pub async fn add(&self, guid: &Guid, time: i64) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        if let Some(existing) = self.store.get_alarm(guid)? {
            self.store.delete_alarm(&existing.guid)?;
            self.timer.cancel(existing.guid.as_str());
        }

        let mut alarm = AlarmRecord {
            id: 0,
            guid: guid.clone(),
            time,
        };
        alarm.id = self.store.insert_alarm(&alarm)?;
        debug!(%guid, time, "add");
        self.timer.register(alarm.guid.as_str(), alarm.time);
        Ok(())
    }

    /// Cancels a previously scheduled alarm. No-op if absent.
    pub async fn remove(&self, guid: &Guid) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(alarm) = self.store.get_alarm(guid)? else {
            return Ok(());
        };
        debug!(%guid, "remove");
        self.store.delete_alarm(&alarm.guid)?;
        self.timer.cancel(alarm.guid.as_str());
        Ok(())
    }

    /// Called when a registered wake timer fires.
    ///
    /// The firing is one-shot: the entry is deleted and the guid emitted.
    /// Re-arming, if any, is the subscriber's business. No-op when the entry
    /// is already gone, which guards duplicate and late callbacks.
    pub async fn on_receive(&self, guid: &Guid) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(alarm) = self.store.get_alarm(guid)? else {
            return Ok(());
        };
        debug!(%guid, "on_receive");
        self.store.delete_alarm(&alarm.guid)?;
        self.notify(alarm.guid).await;
        Ok(())
    }

    /// Fires every alarm due up to now. Runs during initialization.
    async fn notify_past_due(&self) -> Result<(), String> {
        for alarm in self.store.alarms_due_before(now_millis())? {
            debug!(guid = %alarm.guid, time = alarm.time, "past due");
            self.store.delete_alarm(&alarm.guid)?;
            self.notify(alarm.guid).await;
        }
        Ok(())
    }

    /// Re-registers every stored alarm with the wake-timer service.
    fn apply_all(&self) -> Result<(), String> {
        debug!("apply_all");
        for alarm in self.store.list_alarms()? {
            self.timer.register(alarm.guid.as_str(), alarm.time);
        }
        Ok(())
    }

    /// Emits a fired guid on the subscription channel. Blocks when the
    /// buffer is full; a slow subscriber throttles the scheduler.
    async fn notify(&self, guid: Guid) {
        if self.fired_tx.send(guid).await.is_err() {
            warn!("fired-alarm subscriber gone");
        }
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use super::*;
    use crate::storage::SqliteStore;

    struct FakeTimer {
        boot_time: i64,
        registered: StdMutex<Vec<(String, i64)>>,
        cancelled: StdMutex<Vec<String>>,
    }

    impl FakeTimer {
        fn new(boot_time: i64) -> Arc<Self> {
            Arc::new(Self {
                boot_time,
                registered: StdMutex::new(Vec::new()),
                cancelled: StdMutex::new(Vec::new()),
            })
        }

        fn registered(&self) -> Vec<(String, i64)> {
            self.registered.lock().unwrap().clone()
        }

        fn cancelled(&self) -> Vec<String> {
            self.cancelled.lock().unwrap().clone()
        }
    }

    impl WakeTimer for FakeTimer {
        fn register(&self, tag: &str, at_millis: i64) {
            self.registered
                .lock()
                .unwrap()
                .push((tag.to_string(), at_millis));
        }

        fn cancel(&self, tag: &str) {
            self.cancelled.lock().unwrap().push(tag.to_string());
        }

        fn boot_time_millis(&self) -> i64 {
            self.boot_time
        }
    }

    struct TestBed {
        store: Arc<SqliteStore>,
        timer: Arc<FakeTimer>,
        scheduler: AlarmScheduler,
        rx: mpsc::Receiver<Guid>,
    }

    fn make(boot_time: i64) -> TestBed {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let timer = FakeTimer::new(boot_time);
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let scheduler = AlarmScheduler::new(store.clone(), timer.clone(), tx);
        TestBed {
            store,
            timer,
            scheduler,
            rx,
        }
    }

    #[tokio::test]
    async fn add_registers_entry_and_timer() {
        let bed = make(0);
        bed.scheduler.initialize().await.unwrap();

        let guid = Guid::generate();
        bed.scheduler.add(&guid, 12_345).await.unwrap();

        let stored = bed.store.get_alarm(&guid).unwrap().unwrap();
        assert_eq!(stored.time, 12_345);
        assert_eq!(bed.timer.registered(), vec![(guid.to_string(), 12_345)]);
    }

    #[tokio::test]
    async fn add_replaces_existing_entry() {
        let bed = make(0);
        bed.scheduler.initialize().await.unwrap();

        let guid = Guid::generate();
        bed.scheduler.add(&guid, 1_000).await.unwrap();
        bed.scheduler.add(&guid, 2_000).await.unwrap();

        let all = bed.store.list_alarms().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].time, 2_000);
        assert_eq!(bed.timer.cancelled(), vec![guid.to_string()]);
        assert_eq!(bed.timer.registered().len(), 2);
    }

    #[tokio::test]
    async fn remove_deletes_entry_and_cancels_timer() {
        let bed = make(0);
        bed.scheduler.initialize().await.unwrap();

        let guid = Guid::generate();
        bed.scheduler.add(&guid, 1_000).await.unwrap();
        bed.scheduler.remove(&guid).await.unwrap();

        assert!(bed.store.get_alarm(&guid).unwrap().is_none());
        assert_eq!(bed.timer.cancelled(), vec![guid.to_string()]);
    }

    #[tokio::test]
    async fn remove_absent_is_noop() {
        let bed = make(0);
        bed.scheduler.initialize().await.unwrap();

        bed.scheduler.remove(&Guid::generate()).await.unwrap();
        assert!(bed.timer.cancelled().is_empty());
    }

    #[tokio::test]
    async fn on_receive_deletes_and_emits_exactly_once() {
        let mut bed = make(0);
        bed.scheduler.initialize().await.unwrap();

        let guid = Guid::generate();
        bed.scheduler.add(&guid, now_millis() + 1_000).await.unwrap();

        bed.scheduler.on_receive(&guid).await.unwrap();
        assert_eq!(bed.rx.recv().await.unwrap(), guid);
        assert!(bed.store.get_alarm(&guid).unwrap().is_none());

        // Duplicate or late callback is a no-op.
        bed.scheduler.on_receive(&guid).await.unwrap();
        assert!(bed.rx.try_recv().is_err());

        // As is removing an already-fired alarm.
        bed.scheduler.remove(&guid).await.unwrap();
    }

    #[tokio::test]
    async fn initialize_fires_past_due_entries() {
        let mut bed = make(0);

        let past = Guid::generate();
        let future = Guid::generate();
        let now = now_millis();
        bed.store
            .insert_alarm(&AlarmRecord {
                id: 0,
                guid: past.clone(),
                time: now - 1_000,
            })
            .unwrap();
        bed.store
            .insert_alarm(&AlarmRecord {
                id: 0,
                guid: future.clone(),
                time: now + 60_000,
            })
            .unwrap();

        bed.scheduler.initialize().await.unwrap();

        assert_eq!(bed.rx.recv().await.unwrap(), past);
        assert!(bed.rx.try_recv().is_err());
        assert!(bed.store.get_alarm(&past).unwrap().is_none());
        assert!(bed.store.get_alarm(&future).unwrap().is_some());
    }

    #[tokio::test]
    async fn initialize_reapplies_timers_after_reboot() {
        let boot_time = now_millis() - 1_000;
        let bed = make(boot_time);

        // Launched long before this boot.
        bed.store
            .set_setting("alarm.time_last_launch", &(boot_time - 500_000).to_string())
            .unwrap();
        let guid = Guid::generate();
        bed.store
            .insert_alarm(&AlarmRecord {
                id: 0,
                guid: guid.clone(),
                time: now_millis() + 60_000,
            })
            .unwrap();

        bed.scheduler.initialize().await.unwrap();

        assert_eq!(bed.timer.registered().len(), 1);
        assert_eq!(bed.timer.registered()[0].0, guid.to_string());
    }

    #[tokio::test]
    async fn initialize_skips_reapply_without_reboot() {
        let bed = make(0);

        // Last launch is after the timer service came up.
        bed.store
            .set_setting("alarm.time_last_launch", &now_millis().to_string())
            .unwrap();
        bed.store
            .insert_alarm(&AlarmRecord {
                id: 0,
                guid: Guid::generate(),
                time: now_millis() + 60_000,
            })
            .unwrap();

        bed.scheduler.initialize().await.unwrap();
        assert!(bed.timer.registered().is_empty());
    }

    #[tokio::test]
    async fn initialize_records_launch_marker() {
        let bed = make(0);
        let before = now_millis();
        bed.scheduler.initialize().await.unwrap();

        let marker = bed.scheduler.prefs.get_i64(KEY_LAST_LAUNCH).unwrap().unwrap();
        assert!(marker >= before);
    }

    #[tokio::test]
    async fn second_initialize_is_noop() {
        let mut bed = make(now_millis());
        bed.scheduler.initialize().await.unwrap();

        let guid = Guid::generate();
        bed.scheduler.add(&guid, now_millis() - 1_000).await.unwrap();

        // Already initialized: no past-due sweep runs again.
        bed.scheduler.initialize().await.unwrap();
        assert!(bed.rx.try_recv().is_err());
        assert!(bed.store.get_alarm(&guid).unwrap().is_some());
    }

    #[tokio::test]
    async fn operations_block_until_initialized() {
        let bed = make(0);
        let scheduler = Arc::new(bed.scheduler);

        let pending = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                scheduler.add(&Guid::generate(), 1_000).await.unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        scheduler.initialize().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("add released after initialize")
            .unwrap();
    }
}
