//! In-memory region stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use risk_core::{async_trait, AlertError, Region, RegionStore};

/// A region store serving whatever snapshot it currently holds.
#[derive(Debug, Default)]
pub struct InMemoryRegionStore {
    regions: Mutex<Vec<Region>>,
    listings: AtomicUsize,
}

impl InMemoryRegionStore {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions: Mutex::new(regions),
            listings: AtomicUsize::new(0),
        }
    }

    /// Replace the snapshot returned by later listings.
    pub fn set_regions(&self, regions: Vec<Region>) {
        *self.regions.lock().unwrap_or_else(|e| e.into_inner()) = regions;
    }

    /// Number of times `list_regions` has been called.
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegionStore for InMemoryRegionStore {
    async fn list_regions(&self) -> Result<Vec<Region>, AlertError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.regions.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn name(&self) -> &str {
        "InMemoryRegionStore"
    }
}

/// A region store that fails its first `failures` listings.
#[derive(Debug)]
pub struct FlakyRegionStore {
    inner: InMemoryRegionStore,
    failures_left: AtomicUsize,
}

impl FlakyRegionStore {
    pub fn new(regions: Vec<Region>, failures: usize) -> Self {
        Self {
            inner: InMemoryRegionStore::new(regions),
            failures_left: AtomicUsize::new(failures),
        }
    }

    /// A store whose every listing fails.
    pub fn always_failing() -> Self {
        Self::new(Vec::new(), usize::MAX)
    }

    /// Number of times `list_regions` has been called, failed or not.
    pub fn listings(&self) -> usize {
        self.inner.listings()
    }
}

#[async_trait]
impl RegionStore for FlakyRegionStore {
    async fn list_regions(&self) -> Result<Vec<Region>, AlertError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if failing {
            self.inner.listings.fetch_add(1, Ordering::SeqCst);
            return Err(AlertError::StoreUnavailable(
                "region store offline".to_string(),
            ));
        }

        self.inner.list_regions().await
    }

    fn name(&self) -> &str {
        "FlakyRegionStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: i64) -> Region {
        Region {
            id,
            owner: format!("owner{}@example.com", id),
            name: format!("Region {}", id),
            geometry: "POLYGON((0 0, 1 0, 1 1, 0 0))".to_string(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_listing() {
        let store = InMemoryRegionStore::new(vec![region(1), region(2)]);
        assert_eq!(store.list_regions().await.unwrap().len(), 2);

        store.set_regions(vec![region(3)]);
        let regions = store.list_regions().await.unwrap();
        assert_eq!(regions[0].id, 3);
        assert_eq!(store.listings(), 2);
    }

    #[tokio::test]
    async fn test_flaky_store_recovers() {
        let store = FlakyRegionStore::new(vec![region(1)], 2);

        assert!(store.list_regions().await.is_err());
        assert!(store.list_regions().await.is_err());
        assert_eq!(store.list_regions().await.unwrap().len(), 1);
        assert_eq!(store.listings(), 3);
    }

    #[tokio::test]
    async fn test_always_failing() {
        let store = FlakyRegionStore::always_failing();
        for _ in 0..3 {
            assert!(matches!(
                store.list_regions().await,
                Err(AlertError::StoreUnavailable(_))
            ));
        }
    }
}
