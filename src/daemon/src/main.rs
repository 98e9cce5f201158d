mod paths;
mod remind_config;
mod tray;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use remind_core::{
    alarm, notif, AlarmGuidExt, AlarmScheduler, Controller, Guid, History, NoopPolicy,
    NotifManager, ReminderRecord, ReminderStore, SqliteStore, TokioWakeTimer,
};

use remind_config::RemindConfig;
use tray::LogTray;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_filter())
        .init();

    let config = RemindConfig::load()?;

    let db_path = match env::var("REMIND_DB_PATH") {
        Ok(v) => PathBuf::from(v),
        Err(_) => paths::remind_home_dir()?.join("remind.db"),
    };
    let store = Arc::new(SqliteStore::open(&db_path)?);
    info!(path = %db_path.display(), "store open");

    let (fired_tx, mut fired_rx) = mpsc::channel(alarm::SUBSCRIPTION_BUFFER);
    let timer = Arc::new(TokioWakeTimer::new(fired_tx));
    let tray = Arc::new(LogTray);

    let (alarm_tx, alarm_rx) = mpsc::channel(alarm::SUBSCRIPTION_BUFFER);
    let (notif_tx, notif_rx) = mpsc::channel(notif::SUBSCRIPTION_BUFFER);

    let alarm = Arc::new(AlarmScheduler::new(store.clone(), timer, alarm_tx));
    let notif = Arc::new(NotifManager::new(store.clone(), tray, notif_tx));
    let reminders = Arc::new(ReminderStore::new(store.clone()));
    let history = Arc::new(History::new(store.clone()));

    let controller = Arc::new(Controller::new(
        config.controller(),
        alarm.clone(),
        notif.clone(),
        reminders.clone(),
        history,
        Arc::new(NoopPolicy),
    ));
    controller.spawn(alarm_rx, notif_rx);

    // Deliver fired wake-timer tags into the scheduler, dropping anything
    // malformed at the edge.
    {
        let alarm = alarm.clone();
        tokio::spawn(async move {
            while let Some(tag) = fired_rx.recv().await {
                if tag.trim().is_empty() {
                    warn!("fired callback with blank tag");
                    continue;
                }
                if let Err(err) = alarm.on_receive(&Guid::from_string(tag)).await {
                    warn!(error = %err, "alarm receive failed");
                }
            }
        });
    }

    let (alarm_init, notif_init) = tokio::join!(alarm.initialize(), notif.initialize());
    alarm_init?;
    notif_init?;

    seed_reminders(&config, &reminders, &alarm).await?;

    info!("remindd running");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}

/// Primes the reminder store from the config file and schedules the first
/// regular alarm for every reminder not already present.
async fn seed_reminders(
    config: &RemindConfig,
    reminders: &ReminderStore,
    alarm: &AlarmScheduler,
) -> Result<(), String> {
    for seed in &config.reminders {
        if seed.guid.trim().is_empty() {
            warn!(title = %seed.title, "seed reminder without guid skipped");
            continue;
        }
        let guid = Guid::from_string(seed.guid.clone());
        if reminders.get(&guid).await?.is_some() {
            continue;
        }

        let now = now_millis();
        reminders
            .add(&ReminderRecord {
                id: 0,
                guid: guid.clone(),
                created_time: now,
                last_modified_time: now,
                title: seed.title.clone(),
                description: seed.description.clone(),
                enabled: true,
            })
            .await?;

        let fire_at = seed.first_fire_millis(now)?;
        alarm.add(&guid.with_regular(), fire_at).await?;
        info!(%guid, title = %seed.title, fire_at = %format_millis(fire_at), "seeded reminder");
    }
    Ok(())
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn tracing_filter() -> tracing_subscriber::EnvFilter {
    let explicit = env::var("REMIND_LOG").or_else(|_| env::var("RUST_LOG")).ok();
    if let Some(filter) = explicit {
        return tracing_subscriber::EnvFilter::new(filter);
    }
    if matches!(
        env::var("REMIND_DEBUG").as_deref(),
        Ok("1" | "true" | "TRUE" | "yes" | "YES")
    ) {
        return tracing_subscriber::EnvFilter::new("debug");
    }
    tracing_subscriber::EnvFilter::new("info")
}
