use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use weight_tracker::{
    load_data,
    reminder::{LocalNotificationCenter, ReminderScheduler},
    router, AppState, Config,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    // A store that cannot be read stops startup instead of being replaced.
    let data = load_data(&config.data_path).await?;

    let center = Arc::new(LocalNotificationCenter::new(config.reminder_permission));
    let reminders = ReminderScheduler::new(center, config.reminder_time);
    let state = AppState::new(config.data_path.clone(), data, reminders);
    let app = router(state);

    let addr = config.listen_addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
