use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, TimeDelta};
use tracing::info;

use tori2telegram::config::AppConfig;
use tori2telegram::engine;
use tori2telegram::fetch::HttpFetcher;
use tori2telegram::logging;
use tori2telegram::notify::TelegramNotifier;
use tori2telegram::state::WatchState;
use tori2telegram::{
    LISTING_URL, LOG_FILE_PATH, MAX_ARCHIVED_LOGS, MAX_LOG_BYTES, TIME_FRAME_MINUTES,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Rotate before opening the file for appending
    let log_path = Path::new(LOG_FILE_PATH);
    let rotated = logging::rotate_log_file(log_path, MAX_LOG_BYTES, MAX_ARCHIVED_LOGS)?;

    // Missing TELEGRAM_TOKEN/USER_ID aborts here, before the loop
    let config = AppConfig::from_env()?;
    logging::init(&config.log_level, log_path)?;

    if let Some(archived) = rotated {
        info!("Rotated log file to {}", archived.display());
    }

    info!(
        "Starting tori2telegram — user={} time_frame={TIME_FRAME_MINUTES}min poll={}s",
        config.user_id, config.sleep_interval_secs,
    );

    let fetcher = HttpFetcher::new();
    let notifier = TelegramNotifier::new(&config.telegram_token, &config.user_id);
    let mut state = WatchState::new();

    let time_frame = TimeDelta::minutes(TIME_FRAME_MINUTES);
    let sleep_interval = Duration::from_secs(config.sleep_interval_secs);

    loop {
        let now = Local::now().naive_local();
        let report =
            engine::run_cycle(&fetcher, &notifier, &mut state, LISTING_URL, now, time_frame)
                .await;
        info!(
            "Cycle done — parsed={} fresh={} notified={} failed={} (seen: {} ids)",
            report.parsed,
            report.fresh,
            report.notified,
            report.failed,
            state.seen_count(),
        );

        info!("Sleeping for {}s", config.sleep_interval_secs);
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(sleep_interval) => {}
        }
    }

    info!(
        "Exiting — {} cycle(s), {} notification(s) sent, {} send failure(s)",
        state.cycles, state.notified, state.send_failures,
    );
    Ok(())
}
