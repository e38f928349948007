use std::time::Duration;
use tracing::info;

const STORE_POLL_PERIOD: Duration = Duration::from_secs(2);

/// Run the coordinator loop until interrupted.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut coordinator, store) = super::open_coordinator()?;
    let settings = coordinator.install()?;
    info!(
        interval = settings.interval,
        start = %settings.start_time,
        end = %settings.end_time,
        alert = %settings.alert_type,
        "coordinator running"
    );

    let _handle = coordinator.spawn();
    // Surface settings edits made by one-shot commands while we run.
    let _watch = store.watch(STORE_POLL_PERIOD);
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
