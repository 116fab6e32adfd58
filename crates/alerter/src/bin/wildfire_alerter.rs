use std::sync::Arc;

use alerter::{AlerterConfig, Scanner, Scheduler, Transport};
use database::{Database, SqliteRegionStore, SqliteRiskEventStore};
use mailer::{MailerConfig, SmtpMailer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(version = alerter::version(), "Starting wildfire-alerter");

    let config = AlerterConfig::from_env()?;
    let mailer_config = MailerConfig::from_env()?;

    // Both stores must be reachable before the first sweep
    let region_db = Database::connect(&config.region_db_url()).await?;
    region_db.migrate().await?;

    let risk_db = if config.risk_db_url() == config.region_db_url() {
        region_db.clone()
    } else {
        let db = Database::connect(&config.risk_db_url()).await?;
        db.migrate().await?;
        db
    };

    let mailer = SmtpMailer::new(mailer_config)?;
    Transport::check(&mailer).await?;
    info!("SMTP relay reachable");

    let scanner = Scanner::new(
        Arc::new(SqliteRegionStore::new(region_db.clone())),
        Arc::new(SqliteRiskEventStore::new(risk_db.clone())),
        Arc::new(mailer),
        config.scan_config(),
    );

    let scheduler = Scheduler::new(scanner, config.poll_interval)?;
    let sweeps = scheduler.run_until_stopped().await?;

    region_db.close().await;
    risk_db.close().await;

    info!(sweeps, "wildfire-alerter stopped");
    Ok(())
}
