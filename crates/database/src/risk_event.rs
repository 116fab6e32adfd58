//! Risk event operations over `regional_fire_risk`.

use risk_core::{Polygon, RiskEvent};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{NewRiskEvent, RiskEventRow};
use crate::validation::validate_observation;

/// Padding applied to the bounding-box prefilter so boundary points that
/// the polygon test accepts are never dropped by SQL.
const BBOX_PAD: f64 = 1e-9;

/// Upper bound for [`top_by_probability`].
pub const MAX_TOP_LIMIT: i64 = 100;

/// Append a risk observation. Returns the new row id.
pub async fn insert_risk_event(pool: &SqlitePool, event: &NewRiskEvent) -> Result<i64> {
    validate_observation(event.latitude, event.longitude, event.probability)?;

    let result = sqlx::query(
        r#"
        INSERT INTO regional_fire_risk (timestamp, latitude, longitude, probability)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(event.observed_at)
    .bind(event.latitude)
    .bind(event.longitude)
    .bind(event.probability)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Every event with `probability >= threshold` inside or on `polygon`,
/// ordered by id.
///
/// SQLite filters on probability and the polygon's bounding box; the exact
/// containment test runs here.
pub async fn find_contained(
    pool: &SqlitePool,
    polygon: &Polygon,
    threshold: f64,
) -> Result<Vec<RiskEvent>> {
    let bbox = polygon.bounding_box();

    let candidates = sqlx::query_as::<_, RiskEventRow>(
        r#"
        SELECT id, timestamp, latitude, longitude, probability
        FROM regional_fire_risk
        WHERE probability >= ?
          AND longitude BETWEEN ? AND ?
          AND latitude BETWEEN ? AND ?
        ORDER BY id
        "#,
    )
    .bind(threshold)
    .bind(bbox.min_lon - BBOX_PAD)
    .bind(bbox.max_lon + BBOX_PAD)
    .bind(bbox.min_lat - BBOX_PAD)
    .bind(bbox.max_lat + BBOX_PAD)
    .fetch_all(pool)
    .await?;

    let candidate_count = candidates.len();
    let matches: Vec<RiskEvent> = candidates
        .into_iter()
        .map(RiskEvent::from)
        .filter(|event| event.is_match(polygon, threshold))
        .collect();

    tracing::debug!(
        candidates = candidate_count,
        matches = matches.len(),
        "Filtered risk events by polygon"
    );

    Ok(matches)
}

/// The highest-probability events, at most `limit` (clamped to 1..=100).
pub async fn top_by_probability(pool: &SqlitePool, limit: i64) -> Result<Vec<RiskEvent>> {
    let limit = limit.clamp(1, MAX_TOP_LIMIT);

    let rows = sqlx::query_as::<_, RiskEventRow>(
        r#"
        SELECT id, timestamp, latitude, longitude, probability
        FROM regional_fire_risk
        ORDER BY probability DESC, id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RiskEvent::from).collect())
}
