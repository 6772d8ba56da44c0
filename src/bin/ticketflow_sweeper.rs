//! Runs the expiry sweeper against the `PostgreSQL` store until interrupted.
//!
//! Usage:
//!
//! ```text
//! TICKETFLOW__DATABASE__URL=postgres://localhost/ticketflow ticketflow-sweeper
//! ```
//!
//! Settings are read from an optional `ticketflow.toml` and `TICKETFLOW__*`
//! environment variables; see [`ticketflow::config`]. The process exits on
//! Ctrl-C after the in-flight sweep finishes.

use mockable::DefaultClock;
use secrecy::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;
use ticketflow::config::Settings;
use ticketflow::identity::adapters::postgres::PostgresUserRepository;
use ticketflow::notification::adapters::postgres::PostgresNotificationService;
use ticketflow::persistence::build_pool;
use ticketflow::task::adapters::postgres::PostgresTaskRepository;
use ticketflow::task::services::ExpirySweeper;
use ticketflow::telemetry::{self, TelemetryError};
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the sweeper process.
#[derive(Debug, Error)]
enum SweeperProcessError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to connect to the database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to wait for the shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
    #[error("sweeper task ended abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    run().await.map_err(Into::into)
}

async fn run() -> Result<(), SweeperProcessError> {
    let settings = Settings::load()?;
    telemetry::init(&settings.telemetry)?;

    if !settings.sweeper.enabled {
        warn!("expiry sweeper disabled by configuration; exiting");
        return Ok(());
    }

    let pool = build_pool(
        settings.database.url.expose_secret(),
        settings.database.pool_size,
    )?;
    let timeout = settings.persistence.request_timeout();
    let clock = Arc::new(DefaultClock);
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()).with_timeout(timeout));
    let users = Arc::new(PostgresUserRepository::new(pool.clone()).with_timeout(timeout));
    let notifications = Arc::new(
        PostgresNotificationService::new(pool, Arc::clone(&clock)).with_timeout(timeout),
    );

    let sweeper = Arc::new(ExpirySweeper::new(tasks, users, notifications, clock));
    let handle = sweeper.start(settings.sweeper.interval());
    info!(interval = ?settings.sweeper.interval(), "expiry sweeper running");

    tokio::signal::ctrl_c()
        .await
        .map_err(SweeperProcessError::Signal)?;
    info!("shutdown requested");
    handle.stop().await?;
    Ok(())
}
