//! In-memory risk event store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use risk_core::{async_trait, AlertError, Polygon, RiskEvent, RiskEventStore};

/// A risk event store over a vector, filtered with [`RiskEvent::is_match`].
///
/// Results keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRiskEventStore {
    events: Mutex<Vec<RiskEvent>>,
    offline: AtomicBool,
    queries: AtomicUsize,
}

impl InMemoryRiskEventStore {
    pub fn new(events: Vec<RiskEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    /// Append an event.
    pub fn push(&self, event: RiskEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    /// Make every query fail with `StoreUnavailable` until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `find_contained` calls so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskEventStore for InMemoryRiskEventStore {
    async fn find_contained(
        &self,
        polygon: &Polygon,
        threshold: f64,
    ) -> Result<Vec<RiskEvent>, AlertError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(AlertError::StoreUnavailable(
                "risk event store offline".to_string(),
            ));
        }

        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        Ok(events
            .iter()
            .filter(|event| event.is_match(polygon, threshold))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "InMemoryRiskEventStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: i64, lat: f64, lon: f64, probability: f64) -> RiskEvent {
        RiskEvent {
            id,
            observed_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            latitude: lat,
            longitude: lon,
            probability,
        }
    }

    #[tokio::test]
    async fn test_filters_by_polygon_and_threshold() {
        let store = InMemoryRiskEventStore::new(vec![
            event(1, 0.5, 0.5, 0.9),
            event(2, 5.0, 5.0, 0.9),
            event(3, 0.6, 0.6, 0.1),
        ]);
        store.push(event(4, 0.2, 0.2, 0.4));

        let square = Polygon::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        let found = store.find_contained(&square, 0.21).await.unwrap();

        let ids: Vec<i64> = found.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(store.queries(), 1);
    }

    #[tokio::test]
    async fn test_offline() {
        let store = InMemoryRiskEventStore::default();
        let square = Polygon::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();

        store.set_offline(true);
        assert!(store.find_contained(&square, 0.0).await.is_err());

        store.set_offline(false);
        assert!(store.find_contained(&square, 0.0).await.unwrap().is_empty());
    }
}
