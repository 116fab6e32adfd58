//! SQLite persistence for the wildfire alerting engine.
//!
//! This crate stores region owners, their drawn regions and the risk points
//! produced by the inference pipeline, using SQLx with SQLite. It also
//! provides [`SqliteRegionStore`] and [`SqliteRiskEventStore`], the store
//! implementations the scanner reads from.
//!
//! # Example
//!
//! ```no_run
//! use database::{region, user, Database};
//! use risk_core::Polygon;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:data/regions.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a region for a user
//!     let owner = user::find_or_create_user(db.pool(), "owner@example.com").await?;
//!     let polygon = Polygon::from_wkt("POLYGON((-118.3 34.0, -118.2 34.0, -118.2 34.1, -118.3 34.1, -118.3 34.0))")?;
//!     region::create_region(db.pool(), owner.id, "Downtown", &polygon).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod region;
pub mod risk_event;
pub mod store;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{NewRiskEvent, RegionRow, RiskEventRow, User};
pub use store::{SqliteRegionStore, SqliteRiskEventStore};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Pool sized for the scanner's concurrent region workers sharing one store.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// How long a query waits for a free connection or a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to a SQLite database. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url`, e.g. `sqlite:data/regions.db`.
    ///
    /// Foreign keys are enforced so deleting a user removes their regions.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, DEFAULT_POOL_SIZE).await
    }

    /// [`connect`](Self::connect) with an explicit pool size.
    ///
    /// In-memory databases (`sqlite::memory:`) need a size of 1, since every
    /// connection would otherwise see its own empty database.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Opened SQLite pool");
        Ok(Self { pool })
    }

    /// Apply any pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection; later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Turn a plain file path into a SQLite URL; URLs pass through unchanged.
pub fn sqlite_url_from_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}
