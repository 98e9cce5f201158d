use remind_core::{RenderedNotification, Tray};
use tracing::info;

/// Tray that renders notifications into the structured log.
///
/// The daemon has no OS tray to drive; posts and cancels are logged so the
/// notification lifecycle stays observable.
pub struct LogTray;

impl Tray for LogTray {
    fn post(&self, tag: &str, rendered: &RenderedNotification) {
        info!(
            tag,
            title = %rendered.title,
            message = %rendered.message,
            channel = %rendered.channel_id,
            importance = rendered.importance.as_str(),
            actions = rendered.actions.len(),
            "notification posted"
        );
    }

    fn cancel(&self, tag: &str) {
        info!(tag, "notification cancelled");
    }
}
