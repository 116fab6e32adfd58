//! Database models.

use chrono::{DateTime, Utc};
use risk_core::{Region, RiskEvent};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A region owner, keyed by email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// A region joined with its owner's email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RegionRow {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    /// WGS84 polygon as WKT.
    pub geometry: String,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Region {
            id: row.id,
            owner: row.email,
            name: row.name,
            geometry: row.geometry,
        }
    }
}

/// A row of `regional_fire_risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RiskEventRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub probability: f64,
}

impl From<RiskEventRow> for RiskEvent {
    fn from(row: RiskEventRow) -> Self {
        RiskEvent {
            id: row.id,
            observed_at: row.timestamp,
            latitude: row.latitude,
            longitude: row.longitude,
            probability: row.probability,
        }
    }
}

/// A risk observation to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRiskEvent {
    pub observed_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub probability: f64,
}
