//! SQLite-backed implementations of the engine's store traits.

use risk_core::{async_trait, AlertError, Polygon, Region, RegionStore, RiskEvent, RiskEventStore};

use crate::{region, risk_event, Database};

/// Region snapshot source backed by the `regions` and `users` tables.
#[derive(Debug, Clone)]
pub struct SqliteRegionStore {
    db: Database,
}

impl SqliteRegionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RegionStore for SqliteRegionStore {
    async fn list_regions(&self) -> Result<Vec<Region>, AlertError> {
        let rows = region::list_regions(self.db.pool()).await?;
        Ok(rows.into_iter().map(Region::from).collect())
    }

    fn name(&self) -> &str {
        "SqliteRegionStore"
    }
}

/// Risk event source backed by the `regional_fire_risk` table.
#[derive(Debug, Clone)]
pub struct SqliteRiskEventStore {
    db: Database,
}

impl SqliteRiskEventStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RiskEventStore for SqliteRiskEventStore {
    async fn find_contained(
        &self,
        polygon: &Polygon,
        threshold: f64,
    ) -> Result<Vec<RiskEvent>, AlertError> {
        Ok(risk_event::find_contained(self.db.pool(), polygon, threshold).await?)
    }

    fn name(&self) -> &str {
        "SqliteRiskEventStore"
    }
}
