pub mod model;

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::gate::ReadyGate;
use crate::guid::Guid;
use crate::platform::{RenderedAction, RenderedNotification, Tray};
use crate::storage::{NotifRecord, Store};

use model::{NotifAction, NotifResponse, Notification};

/// Capacity of the interaction subscription channel. Sends block when the
/// buffer is full; nothing is dropped.
pub const SUBSCRIPTION_BUFFER: usize = 50;

/// Notification manager.
///
/// Keeps the notifs table consistent with what it believes the tray is
/// displaying, and replays that belief after a restart. Rendering and
/// channel registration are the tray's business.
pub struct NotifManager {
    store: Arc<dyn Store>,
    tray: Arc<dyn Tray>,
    response_tx: mpsc::Sender<NotifResponse>,
    ready: ReadyGate,
    lock: Mutex<()>,
}

impl NotifManager {
    /// The response sender is handed in by the caller; the matching receiver
    /// is the subscription the controller drains.
    pub fn new(
        store: Arc<dyn Store>,
        tray: Arc<dyn Tray>,
        response_tx: mpsc::Sender<NotifResponse>,
    ) -> Self {
        Self {
            store,
            tray,
            response_tx,
            ready: ReadyGate::new(),
            lock: Mutex::new(()),
        }
    }

    /// Initializes the manager. Call once during application startup;
    /// concurrent calls after the first are no-ops.
    ///
    /// Re-posts every entry marked visible, since a process restart may
    /// have taken the tray's contents with it.
    pub async fn initialize(&self) -> Result<(), String> {
        info!("initialize");
        let _guard = self.lock.lock().await;
        if self.ready.is_open() {
            return Ok(());
        }

        for rec in self.store.list_visible_notifs()? {
            debug!(guid = %rec.guid, "replay");
            self.tray.post(rec.guid.as_str(), &render(&rec));
        }

        self.ready.open();
        Ok(())
    }

    /// Creates a new notification but does not show it. Replaces any
    /// existing entry for the guid, cancelling its tray presence.
    pub async fn add(&self, guid: &Guid, notification: Notification) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        if let Some(existing) = self.store.get_notif(guid)? {
            self.store.delete_notif(&existing.guid)?;
            self.tray.cancel(existing.guid.as_str());
        }

        let mut rec = NotifRecord {
            id: 0,
            guid: guid.clone(),
            show_time: 0,
            visible: false,
            notification,
        };
        rec.id = self.store.insert_notif(&rec)?;
        debug!(%guid, "add");
        Ok(())
    }

    /// Removes a notification, cancelling its tray presence. No-op if
    /// absent.
    pub async fn remove(&self, guid: &Guid) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(rec) = self.store.get_notif(guid)? else {
            return Ok(());
        };
        debug!(%guid, "remove");
        self.store.delete_notif(&rec.guid)?;
        self.tray.cancel(rec.guid.as_str());
        Ok(())
    }

    /// Returns whether a notification exists.
    pub async fn has(&self, guid: &Guid) -> Result<bool, String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;
        Ok(self.store.get_notif(guid)?.is_some())
    }

    /// Shows an existing notification. Showing an already-visible entry
    /// posts it again, which refreshes its content.
    ///
    /// Returns whether the notification exists.
    pub async fn show(&self, guid: &Guid) -> Result<bool, String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(mut rec) = self.store.get_notif(guid)? else {
            return Ok(false);
        };
        rec.show_time = now_millis();
        rec.visible = true;
        self.store
            .update_notif_visibility(&rec.guid, rec.visible, rec.show_time)?;
        self.tray.post(rec.guid.as_str(), &render(&rec));
        debug!(%guid, "show");
        Ok(true)
    }

    /// Hides an existing notification.
    ///
    /// Returns whether the notification exists.
    pub async fn hide(&self, guid: &Guid) -> Result<bool, String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(rec) = self.store.get_notif(guid)? else {
            return Ok(false);
        };
        self.store.update_notif_visibility(&rec.guid, false, 0)?;
        self.tray.cancel(rec.guid.as_str());
        debug!(%guid, "hide");
        Ok(true)
    }

    /// Returns whether an existing notification is currently visible.
    pub async fn is_visible(&self, guid: &Guid) -> Result<bool, String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;
        Ok(self
            .store
            .get_notif(guid)?
            .map(|rec| rec.visible)
            .unwrap_or(false))
    }

    /// Called when the tray delivers an interaction.
    ///
    /// Click and dismiss delete the entry; the tray has already cleared it.
    /// The remaining action kinds keep the record around so the notification
    /// survives to be redisplayed. Every interaction is emitted on the
    /// subscription channel. No-op when the entry is already gone.
    pub async fn on_receive(&self, guid: &Guid, action: NotifAction) -> Result<(), String> {
        self.ready.wait().await;
        let _guard = self.lock.lock().await;

        let Some(rec) = self.store.get_notif(guid)? else {
            return Ok(());
        };
        debug!(%guid, action = action.as_str(), "on_receive");
        if action.is_terminal() {
            self.store.delete_notif(&rec.guid)?;
        }

        let response = NotifResponse {
            guid: rec.guid,
            delay: now_millis() - rec.show_time,
            action,
        };
        if self.response_tx.send(response).await.is_err() {
            warn!("interaction subscriber gone");
        }
        Ok(())
    }
}

/// Builds the tray payload for a stored notification entry.
fn render(rec: &NotifRecord) -> RenderedNotification {
    let notification = &rec.notification;
    let mut actions = Vec::new();
    if let Some(action) = &notification.action_complete {
        actions.push(RenderedAction {
            action: NotifAction::ActionComplete,
            label: action.label.clone(),
            icon: action.icon.clone(),
        });
    }
    if let Some(action) = &notification.action_incomplete {
        actions.push(RenderedAction {
            action: NotifAction::ActionIncomplete,
            label: action.label.clone(),
            icon: action.icon.clone(),
        });
    }
    if let Some(action) = &notification.action_snooze {
        actions.push(RenderedAction {
            action: NotifAction::ActionSnooze,
            label: action.label.clone(),
            icon: action.icon.clone(),
        });
    }

    RenderedNotification {
        title: notification.title.clone(),
        message: notification.message.clone(),
        importance: notification.channel.importance,
        channel_id: notification.channel.id.clone(),
        channel_name: notification.channel.name.clone(),
        small_icon: notification.small_icon.clone(),
        image: notification.image.clone(),
        sound: notification.channel.sound.clone(),
        actions,
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
