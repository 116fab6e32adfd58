//! Region operations.

use risk_core::Polygon;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::RegionRow;
use crate::user::find_or_create_user;
use crate::validation::validate_region_name;

/// Store a region for an existing user. Returns the new region id.
pub async fn create_region(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    polygon: &Polygon,
) -> Result<i64> {
    validate_region_name(name)?;
    let bbox = polygon.bounding_box();

    let result = sqlx::query(
        r#"
        INSERT INTO regions (user_id, name, geometry, min_lon, min_lat, max_lon, max_lat)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(name.trim())
    .bind(polygon.to_wkt())
    .bind(bbox.min_lon)
    .bind(bbox.min_lat)
    .bind(bbox.max_lon)
    .bind(bbox.max_lat)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(region_id = id, user_id, "Created region");
    Ok(id)
}

/// Store a region drawn by `email`, given as GeoJSON.
///
/// The owner is created on first use. Accepts either a bare `Polygon`
/// geometry or a `Feature` wrapping one.
pub async fn create_region_from_geojson(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    geojson: &Value,
) -> Result<i64> {
    let polygon = Polygon::from_geojson(geojson).map_err(DatabaseError::Geometry)?;
    let user = find_or_create_user(pool, email).await?;
    create_region(pool, user.id, name, &polygon).await
}

/// Snapshot of every region with its owner's email, ordered by id.
pub async fn list_regions(pool: &SqlitePool) -> Result<Vec<RegionRow>> {
    let regions = sqlx::query_as::<_, RegionRow>(
        r#"
        SELECT r.id, r.user_id, u.email, r.name, r.geometry
        FROM regions r
        INNER JOIN users u ON u.id = r.user_id
        ORDER BY r.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(regions)
}

/// All regions owned by one user.
pub async fn get_regions_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<RegionRow>> {
    let regions = sqlx::query_as::<_, RegionRow>(
        r#"
        SELECT r.id, r.user_id, u.email, r.name, r.geometry
        FROM regions r
        INNER JOIN users u ON u.id = r.user_id
        WHERE r.user_id = ?
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(regions)
}

/// Delete a region, but only if `user_id` owns it.
pub async fn delete_region(pool: &SqlitePool, region_id: i64, user_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM regions
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(region_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Region",
            id: format!("{} (user {})", region_id, user_id),
        });
    }

    tracing::info!(region_id, user_id, "Deleted region");
    Ok(())
}
