//! Collaborator traits for the alerting pipeline.
//!
//! The engine only reads from the two stores and only writes through the
//! transport. All three are shared across concurrent region workers, so
//! implementations must be `Send + Sync` and safe to call concurrently.

use async_trait::async_trait;

use crate::error::AlertError;
use crate::geometry::Polygon;
use crate::model::{Region, RiskEvent};

/// Read-only source of user regions.
#[async_trait]
pub trait RegionStore: Send + Sync {
    /// Snapshot of every region with its owner's address.
    async fn list_regions(&self) -> Result<Vec<Region>, AlertError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Read-only source of risk events.
#[async_trait]
pub trait RiskEventStore: Send + Sync {
    /// Every event with `probability >= threshold` inside or on `polygon`.
    ///
    /// The order of the result must be stable for one call; callers render
    /// matches in the order returned.
    async fn find_contained(
        &self,
        polygon: &Polygon,
        threshold: f64,
    ) -> Result<Vec<RiskEvent>, AlertError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Outbound notification transport (e.g. SMTP).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt to deliver one message. No retries.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AlertError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Verify the transport is reachable.
    ///
    /// Called once at startup. Default implementation always succeeds.
    async fn check(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), AlertError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "NullTransport"
        }
    }

    #[tokio::test]
    async fn test_default_check_succeeds() {
        let transport = NullTransport;
        assert!(transport.check().await.is_ok());
        assert!(transport.send("a@example.com", "s", "b").await.is_ok());
    }

    #[tokio::test]
    async fn test_traits_are_object_safe() {
        let transport: Box<dyn Transport> = Box::new(NullTransport);
        assert_eq!(transport.name(), "NullTransport");
    }
}
