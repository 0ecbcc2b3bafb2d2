use anyhow::Result;
use doctrack_monitor::{MonitorError, SlaMonitor};
use doctrack_sla::{BusinessCalendar, RuleTable};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("doctrack=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/doctrack.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        ServerConfig::load(&config_path)?
    } else {
        tracing::info!(path = %config_path, "Config file not found, using defaults");
        ServerConfig::default()
    };

    let zone: chrono_tz::Tz = config
        .timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {e}", config.timezone))?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let rules = RuleTable::builtin().with_env_overrides();
    let monitor = SlaMonitor::new(db, rules, BusinessCalendar::new(zone));

    tracing::info!(
        interval_secs = config.check_interval_secs,
        timezone = %config.timezone,
        "SLA monitor scheduler started"
    );

    let mut tick = interval(Duration::from_secs(config.check_interval_secs));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                match monitor.run_sla_checks().await {
                    Ok(summary) => {
                        tracing::debug!(total_alerts = summary.total_alerts(), "Pass finished");
                    }
                    Err(MonitorError::PassInProgress) => {
                        tracing::warn!("Skipping tick: previous pass still running");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Monitor pass failed");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
