//! Wildfire risk alerting loop.
//!
//! On a fixed interval this crate sweeps every user region, finds the risk
//! points above the probability threshold that fall inside it, and emails
//! the region's owner one alert listing them. One region's failure never
//! stops the sweep, and one sweep's failure never stops the loop.
//!
//! The pieces, leaves first:
//! - [`SpatialMatcher`] - risk points inside one region
//! - [`Dispatcher`] - one bounded send attempt per alert
//! - [`Scanner`] - one sweep over every region, with a per-region error boundary
//! - [`Scheduler`] - the interval loop with graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use alerter::{AlerterConfig, Scanner, Scheduler};
//! use database::{Database, SqliteRegionStore, SqliteRiskEventStore};
//! use mailer::{MailerConfig, SmtpMailer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AlerterConfig::from_env()?;
//! let db = Database::connect(&config.region_db_url()).await?;
//! db.migrate().await?;
//!
//! let scanner = Scanner::new(
//!     Arc::new(SqliteRegionStore::new(db.clone())),
//!     Arc::new(SqliteRiskEventStore::new(db.clone())),
//!     Arc::new(SmtpMailer::new(MailerConfig::from_env()?)?),
//!     config.scan_config(),
//! );
//!
//! Scheduler::new(scanner, config.poll_interval)?
//!     .run_until_stopped()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod matcher;
pub mod policy;
pub mod scanner;
pub mod scheduler;

pub use config::{AlerterConfig, ConfigError};
pub use dispatcher::Dispatcher;
pub use matcher::SpatialMatcher;
pub use policy::{AlertLedger, AlertPolicy};
pub use scanner::{RegionOutcome, ScanConfig, Scanner, StopFlag, SweepReport};
pub use scheduler::{Scheduler, SchedulerError};

// Re-export core types for convenience
pub use risk_core::{AlertError, Notification, Region, RegionStore, RiskEvent, RiskEventStore, Transport};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
