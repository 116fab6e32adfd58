//! Spatial matcher: risk points inside one region above a threshold.

use std::sync::Arc;
use std::time::Duration;

use risk_core::{AlertError, Polygon, Region, RiskEvent, RiskEventStore};
use tokio::time::timeout;
use tracing::debug;

/// Finds the risk events that fall inside a region.
pub struct SpatialMatcher<E: RiskEventStore> {
    store: Arc<E>,
    store_timeout: Duration,
}

impl<E: RiskEventStore> SpatialMatcher<E> {
    pub fn new(store: Arc<E>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Get a reference to the event store.
    pub fn store(&self) -> &E {
        &self.store
    }

    /// Every event with `probability >= threshold` inside or on the region's polygon.
    ///
    /// Events are returned in store order. A malformed geometry fails with
    /// `InvalidGeometry` before the store is touched; a query that fails or
    /// outlives the store timeout fails with `StoreUnavailable`.
    pub async fn find_matches(
        &self,
        region: &Region,
        threshold: f64,
    ) -> Result<Vec<RiskEvent>, AlertError> {
        let polygon: Polygon = Polygon::from_wkt(&region.geometry)?;

        let events = match timeout(self.store_timeout, self.store.find_contained(&polygon, threshold)).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(AlertError::StoreUnavailable(format!(
                    "{} query timed out after {:?}",
                    self.store.name(),
                    self.store_timeout
                )))
            }
        };

        debug!(
            region_id = region.id,
            matches = events.len(),
            threshold,
            "Region matched"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mock_stores::{DelayedRiskEventStore, InMemoryRiskEventStore};

    fn region(geometry: &str) -> Region {
        Region {
            id: 1,
            owner: "owner@example.com".to_string(),
            name: "Downtown".to_string(),
            geometry: geometry.to_string(),
        }
    }

    fn event(id: i64, lat: f64, lon: f64, probability: f64) -> RiskEvent {
        RiskEvent {
            id,
            observed_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            latitude: lat,
            longitude: lon,
            probability,
        }
    }

    const DOWNTOWN: &str =
        "POLYGON((-118.30 34.00, -118.20 34.00, -118.20 34.10, -118.30 34.10, -118.30 34.00))";

    #[tokio::test]
    async fn test_downtown_example() {
        let store = Arc::new(InMemoryRiskEventStore::new(vec![
            event(1, 34.05, -118.25, 0.5),
            event(2, 35.00, -118.25, 0.9),
        ]));
        let matcher = SpatialMatcher::new(store, Duration::from_secs(5));

        let matches = matcher.find_matches(&region(DOWNTOWN), 0.21).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1);
    }

    #[tokio::test]
    async fn test_below_threshold_is_empty() {
        let store = Arc::new(InMemoryRiskEventStore::new(vec![event(1, 34.05, -118.25, 0.25)]));
        let matcher = SpatialMatcher::new(store, Duration::from_secs(5));

        let matches = matcher.find_matches(&region(DOWNTOWN), 0.3).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_geometry_skips_store() {
        let store = Arc::new(InMemoryRiskEventStore::default());
        let matcher = SpatialMatcher::new(store.clone(), Duration::from_secs(5));

        let result = matcher.find_matches(&region("POLYGON((0 0, 1 1))"), 0.21).await;
        assert!(matches!(result, Err(AlertError::InvalidGeometry(_))));
        assert_eq!(store.queries(), 0);
    }

    #[tokio::test]
    async fn test_store_error_passes_through() {
        let store = Arc::new(InMemoryRiskEventStore::default());
        store.set_offline(true);
        let matcher = SpatialMatcher::new(store, Duration::from_secs(5));

        let result = matcher.find_matches(&region(DOWNTOWN), 0.21).await;
        assert!(matches!(result, Err(AlertError::StoreUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let store = Arc::new(DelayedRiskEventStore::new(
            InMemoryRiskEventStore::new(vec![event(1, 34.05, -118.25, 0.5)]),
            Duration::from_secs(60),
        ));
        let matcher = SpatialMatcher::new(store, Duration::from_secs(30));

        let result = matcher.find_matches(&region(DOWNTOWN), 0.21).await;
        match result {
            Err(AlertError::StoreUnavailable(message)) => assert!(message.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
