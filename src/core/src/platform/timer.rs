use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::WakeTimer;

/// In-process wake timer over tokio sleep tasks.
///
/// Fired tags are delivered on the channel handed to `new`; the process glue
/// forwards them into `AlarmScheduler::on_receive`. Registrations die with
/// the process, so `boot_time_millis` is the construction instant and the
/// scheduler re-arms everything on every launch.
pub struct TokioWakeTimer {
    fired_tx: mpsc::Sender<String>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    started_at: i64,
}

impl TokioWakeTimer {
    pub fn new(fired_tx: mpsc::Sender<String>) -> Self {
        Self {
            fired_tx,
            tasks: Mutex::new(HashMap::new()),
            started_at: now_millis(),
        }
    }
}

impl WakeTimer for TokioWakeTimer {
    fn register(&self, tag: &str, at_millis: i64) {
        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "wake timer lock poisoned");
                return;
            }
        };
        tasks.retain(|_, handle| !handle.is_finished());
        if let Some(old) = tasks.remove(tag) {
            old.abort();
        }

        let delay = (at_millis - now_millis()).max(0) as u64;
        let fired_tx = self.fired_tx.clone();
        let fired_tag = tag.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if fired_tx.send(fired_tag).await.is_err() {
                warn!("wake timer subscriber gone");
            }
        });
        tasks.insert(tag.to_string(), handle);
    }

    fn cancel(&self, tag: &str) {
        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "wake timer lock poisoned");
                return;
            }
        };
        if let Some(handle) = tasks.remove(tag) {
            handle.abort();
        }
    }

    fn boot_time_millis(&self) -> i64 {
        self.started_at
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
