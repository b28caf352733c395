// File: tracker/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tracker::config::ConfigManager;
use tracker::constants::notifications::DASHBOARD_PATH;
use tracker::database::Database;
use tracker::scheduler::SweepScheduler;
use tracker::services::{FcmPushClient, NotificationDispatcher, ResendEmailClient, SweepService};
use tracker::sweep_tracker::SweepTracker;
use tracker::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("tracker=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting Oil Change Tracker");

    let config_manager = ConfigManager::new("config").await?;
    let config = config_manager.get_current_config();

    let database = Arc::new(Database::new(&config.database_path).await?);
    info!("Database initialized");

    let email = ResendEmailClient::new(&config.email, &config.secrets.email_api_key)?;
    if !email.is_configured() {
        warn!("Email provider not configured, email notifications will fail");
    }

    let push = FcmPushClient::new(
        &config.push,
        &config.secrets.push_access_token,
        format!("{}{}", config.dashboard_url.trim_end_matches('/'), DASHBOARD_PATH),
    )?;
    if !push.is_configured() {
        warn!("Push provider not configured, push notifications will fail");
    }

    let dispatcher = Arc::new(NotificationDispatcher::new(
        email,
        push,
        config.dashboard_url.clone(),
    ));

    let sweep_service = Arc::new(SweepService::new(
        database.clone(),
        dispatcher.clone(),
        SweepTracker::new(),
        config.require_current_mileage,
    ));
    info!("Sweep service initialized");

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match config.sweep_schedule.as_deref() {
        Some(schedule) => {
            let scheduler = SweepScheduler::new().await?;
            scheduler.start(schedule, sweep_service.clone()).await?;
            Some(scheduler)
        }
        None => {
            info!("No sweep_schedule configured, waiting for the external scheduler");
            None
        }
    };

    let state = AppState::new(config, database, sweep_service, dispatcher);
    start_web_server(state).await?;

    Ok(())
}
