use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use remind_core::{
    alarm, notif, AlarmGuidExt, AlarmScheduler, Controller, ControllerConfig, Guid, History,
    HistoryAction, NoopPolicy, NotifManager, ReminderRecord, ReminderStore, RenderedNotification,
    SqliteStore, Store, TokioWakeTimer, Tray,
};

struct RecordingTray {
    posted: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
}

impl RecordingTray {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            posted: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        })
    }
}

impl Tray for RecordingTray {
    fn post(&self, tag: &str, _rendered: &RenderedNotification) {
        self.posted.lock().unwrap().push(tag.to_string());
    }

    fn cancel(&self, tag: &str) {
        self.cancelled.lock().unwrap().push(tag.to_string());
    }
}

struct Stack {
    store: Arc<SqliteStore>,
    tray: Arc<RecordingTray>,
    alarm: Arc<AlarmScheduler>,
    notif: Arc<NotifManager>,
    reminders: Arc<ReminderStore>,
    history: Arc<History>,
}

/// Builds and initializes the full stack the way the daemon wires it: a real
/// in-process wake timer delivering fired tags into the scheduler, and the
/// controller loops draining both subscriptions.
async fn start(store: Arc<SqliteStore>) -> Stack {
    let tray = RecordingTray::new();

    let (fired_tx, mut fired_rx) = mpsc::channel::<String>(alarm::SUBSCRIPTION_BUFFER);
    let timer = Arc::new(TokioWakeTimer::new(fired_tx));

    let (alarm_tx, alarm_rx) = mpsc::channel(alarm::SUBSCRIPTION_BUFFER);
    let (notif_tx, notif_rx) = mpsc::channel(notif::SUBSCRIPTION_BUFFER);

    let alarm = Arc::new(AlarmScheduler::new(store.clone(), timer, alarm_tx));
    let notif = Arc::new(NotifManager::new(store.clone(), tray.clone(), notif_tx));
    let reminders = Arc::new(ReminderStore::new(store.clone()));
    let history = Arc::new(History::new(store.clone()));

    let controller = Arc::new(Controller::new(
        ControllerConfig::default(),
        alarm.clone(),
        notif.clone(),
        reminders.clone(),
        history.clone(),
        Arc::new(NoopPolicy),
    ));
    controller.spawn(alarm_rx, notif_rx);

    {
        let alarm = alarm.clone();
        tokio::spawn(async move {
            while let Some(tag) = fired_rx.recv().await {
                let _ = alarm.on_receive(&Guid::from_string(tag)).await;
            }
        });
    }

    alarm.initialize().await.unwrap();
    notif.initialize().await.unwrap();

    Stack {
        store,
        tray,
        alarm,
        notif,
        reminders,
        history,
    }
}

async fn seed_reminder(stack: &Stack, guid: &Guid) {
    stack
        .reminders
        .add(&ReminderRecord {
            id: 0,
            guid: guid.clone(),
            created_time: now_millis(),
            last_modified_time: now_millis(),
            title: "Pizza".into(),
            description: "Pepperoni Pizza".into(),
            enabled: true,
        })
        .await
        .unwrap();
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[tokio::test(start_paused = true)]
async fn scheduled_alarm_fires_once_and_drives_the_notification() {
    let stack = start(Arc::new(SqliteStore::open_memory().unwrap())).await;

    let base = Guid::generate();
    seed_reminder(&stack, &base).await;

    let regular = base.with_regular();
    stack
        .alarm
        .add(&regular, now_millis() + 1_000)
        .await
        .unwrap();

    // The wake timer fires, the scheduler emits, the controller shows the
    // notification and schedules the follow-ups.
    let mut shown = false;
    for _ in 0..500 {
        if stack.notif.is_visible(&base).await.unwrap() {
            shown = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(shown, "notification shown after the alarm fired");

    // The firing consumed the entry; what remains are the follow-ups the
    // controller scheduled (next regular + auto-snooze fallback).
    let followups = stack.store.list_alarms().unwrap();
    assert_eq!(followups.len(), 2);
    assert!(stack.store.get_alarm(&regular).unwrap().is_some());
    assert!(stack
        .store
        .get_alarm(&base.with_auto_snooze())
        .unwrap()
        .is_some());

    // Fired and shown exactly once.
    assert_eq!(stack.tray.posted.lock().unwrap().len(), 1);
    let entries = stack.history.for_guid(&base).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, HistoryAction::Show);

    // Removing something that never got scheduled is a harmless no-op.
    stack.alarm.remove(&base.with_snooze()).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn restart_replays_visible_notifications() {
    let store = Arc::new(SqliteStore::open_memory().unwrap());

    let base = Guid::generate();
    {
        let stack = start(store.clone()).await;
        seed_reminder(&stack, &base).await;

        stack
            .alarm
            .add(&base.with_regular(), now_millis() + 1_000)
            .await
            .unwrap();

        let mut shown = false;
        for _ in 0..500 {
            if stack.notif.is_visible(&base).await.unwrap() {
                shown = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(shown);
    }

    // A new process over the same database re-posts what was visible.
    let restarted = start(store).await;
    assert_eq!(
        restarted.tray.posted.lock().unwrap().as_slice(),
        [base.to_string()]
    );
    assert!(restarted.tray.cancelled.lock().unwrap().is_empty());
    assert!(restarted.notif.is_visible(&base).await.unwrap());
}
