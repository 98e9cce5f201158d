mod guid_ext;

pub use guid_ext::{AlarmGuidExt, AlarmKind};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::alarm::AlarmScheduler;
use crate::config::ControllerConfig;
use crate::guid::Guid;
use crate::history::History;
use crate::notif::model::{
    NotifAction, NotifResponse, Notification, NotificationAction,
};
use crate::notif::NotifManager;
use crate::reminder::ReminderStore;
use crate::storage::{HistoryAction, ReminderRecord};

/// Reminder-specific bookkeeping for notification interactions.
///
/// The routing itself (base-guid resolution, reminder lookup, history
/// logging) is fixed; what an interaction does to the reminder is policy and
/// lives behind this seam.
pub trait ReminderPolicy: Send + Sync + 'static {
    fn on_interaction(&self, reminder: &ReminderRecord, response: &NotifResponse);
}

/// Policy that leaves reminder state untouched.
pub struct NoopPolicy;

impl ReminderPolicy for NoopPolicy {
    fn on_interaction(&self, _reminder: &ReminderRecord, _response: &NotifResponse) {}
}

/// Routes fired alarms and notification interactions into reminder
/// scheduling.
///
/// Owns no durable state of its own; it only drives the managers.
pub struct Controller {
    config: ControllerConfig,
    alarm: Arc<AlarmScheduler>,
    notif: Arc<NotifManager>,
    reminders: Arc<ReminderStore>,
    history: Arc<History>,
    policy: Arc<dyn ReminderPolicy>,
}

impl Controller {
    pub fn new(
        config: ControllerConfig,
        alarm: Arc<AlarmScheduler>,
        notif: Arc<NotifManager>,
        reminders: Arc<ReminderStore>,
        history: Arc<History>,
        policy: Arc<dyn ReminderPolicy>,
    ) -> Self {
        Self {
            config,
            alarm,
            notif,
            reminders,
            history,
            policy,
        }
    }

    /// Spawns the two subscription loops. They run independently; there is
    /// no ordering between an alarm event and an interaction event beyond
    /// what each manager's own lock already imposes.
    pub fn spawn(
        self: Arc<Self>,
        mut alarm_rx: mpsc::Receiver<Guid>,
        mut notif_rx: mpsc::Receiver<NotifResponse>,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        let this = self.clone();
        let alarms = tokio::spawn(async move {
            while let Some(guid) = alarm_rx.recv().await {
                if let Err(err) = this.on_alarm(&guid).await {
                    warn!(error = %err, %guid, "alarm handling failed");
                }
            }
        });

        let this = self;
        let notifs = tokio::spawn(async move {
            while let Some(response) = notif_rx.recv().await {
                if let Err(err) = this.on_notif(&response).await {
                    warn!(error = %err, guid = %response.guid, "interaction handling failed");
                }
            }
        });

        (alarms, notifs)
    }

    /// An alarm fired: show the reminder's notification and schedule the
    /// follow-up occurrences for whichever variant fired.
    async fn on_alarm(&self, guid: &Guid) -> Result<(), String> {
        debug!(%guid, "alarm fired");

        let base = guid.base();
        let regular = guid.with_regular();
        let snooze = guid.with_snooze();
        let auto_snooze = guid.with_auto_snooze();

        // Any firing supersedes pending snooze follow-ups.
        self.alarm.remove(&snooze).await?;
        self.alarm.remove(&auto_snooze).await?;

        let Some(reminder) = self.reminders.get(&base).await? else {
            // Reminder deleted after the alarm was scheduled.
            debug!(%base, "no reminder for fired alarm");
            return Ok(());
        };

        let Some(kind) = AlarmKind::decode(guid) else {
            warn!(%guid, "fired alarm carries no known modifier");
            return Ok(());
        };

        let now = now_millis();
        match kind {
            AlarmKind::Regular => {
                self.notif
                    .add(&base, self.build_notification(&reminder))
                    .await?;
                self.notif.show(&base).await?;
                self.history.add(&base, HistoryAction::Show, 0)?;

                self.alarm
                    .add(&regular, now + millis(self.config.regular_repeat))
                    .await?;
                self.alarm
                    .add(&auto_snooze, now + millis(self.config.auto_snooze_delay))
                    .await?;
            }
            AlarmKind::Snooze => {
                self.notif.show(&base).await?;
                self.history.add(&base, HistoryAction::ReShow, 0)?;

                self.alarm
                    .add(&snooze, now + millis(self.config.snooze_delay))
                    .await?;
            }
            AlarmKind::AutoSnooze => {
                // Hide first so the re-post alerts again.
                self.notif.hide(&base).await?;
                self.notif.show(&base).await?;
                self.history.add(&base, HistoryAction::ReShow, 0)?;

                self.alarm
                    .add(&auto_snooze, now + millis(self.config.auto_snooze_delay))
                    .await?;
            }
        }
        Ok(())
    }

    /// A notification was interacted with: log it and hand the event to the
    /// policy.
    async fn on_notif(&self, response: &NotifResponse) -> Result<(), String> {
        debug!(guid = %response.guid, action = response.action.as_str(), "interaction");

        let base = response.guid.base();
        let Some(reminder) = self.reminders.get(&base).await? else {
            debug!(%base, "no reminder for interaction");
            return Ok(());
        };

        self.history
            .add(&base, history_action(response.action), response.delay)?;
        self.policy.on_interaction(&reminder, response);
        Ok(())
    }

    fn build_notification(&self, reminder: &ReminderRecord) -> Notification {
        Notification {
            small_icon: self.config.small_icon.clone(),
            title: reminder.title.clone(),
            message: reminder.description.clone(),
            channel: self.config.channel.clone(),
            image: None,
            action_complete: Some(NotificationAction {
                icon: None,
                label: "Complete".into(),
            }),
            action_incomplete: Some(NotificationAction {
                icon: None,
                label: "Incomplete".into(),
            }),
            action_snooze: Some(NotificationAction {
                icon: None,
                label: "Snooze".into(),
            }),
        }
    }
}

fn history_action(action: NotifAction) -> HistoryAction {
    match action {
        NotifAction::Click => HistoryAction::Click,
        NotifAction::Dismiss => HistoryAction::Dismiss,
        NotifAction::ActionComplete => HistoryAction::Complete,
        NotifAction::ActionIncomplete => HistoryAction::Incomplete,
        NotifAction::ActionSnooze => HistoryAction::Snooze,
    }
}

fn millis(duration: Duration) -> i64 {
    duration.as_millis() as i64
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
