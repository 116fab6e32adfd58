//! Delayed wrappers - add artificial latency to another implementation.

use std::time::Duration;

use risk_core::{async_trait, AlertError, Polygon, RiskEvent, RiskEventStore, Transport};
use tokio::time::sleep;

/// A transport that waits before delegating each send.
///
/// Useful for testing send timeouts and concurrent dispatch.
pub struct DelayedTransport<T: Transport> {
    inner: T,
    delay: Duration,
}

impl<T: Transport> DelayedTransport<T> {
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for DelayedTransport<T> {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        sleep(self.delay).await;
        self.inner.send(to, subject, body).await
    }

    fn name(&self) -> &str {
        "DelayedTransport"
    }

    async fn check(&self) -> Result<(), AlertError> {
        self.inner.check().await
    }
}

/// A risk event store that waits before delegating each query.
pub struct DelayedRiskEventStore<S: RiskEventStore> {
    inner: S,
    delay: Duration,
}

impl<S: RiskEventStore> DelayedRiskEventStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RiskEventStore> RiskEventStore for DelayedRiskEventStore<S> {
    async fn find_contained(
        &self,
        polygon: &Polygon,
        threshold: f64,
    ) -> Result<Vec<RiskEvent>, AlertError> {
        sleep(self.delay).await;
        self.inner.find_contained(polygon, threshold).await
    }

    fn name(&self) -> &str {
        "DelayedRiskEventStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingTransport;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_delayed_transport() {
        let transport = DelayedTransport::new(RecordingTransport::new(), Duration::from_secs(5));

        let start = Instant::now();
        transport.send("a@example.com", "s", "b").await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(transport.inner().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_name() {
        let transport = DelayedTransport::new(RecordingTransport::new(), Duration::ZERO);
        assert_eq!(transport.name(), "DelayedTransport");
    }
}
