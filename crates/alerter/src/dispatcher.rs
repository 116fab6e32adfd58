//! Notification dispatcher: one bounded send attempt per notification.

use std::sync::Arc;
use std::time::Duration;

use risk_core::{AlertError, Notification, Transport};
use tokio::time::timeout;
use tracing::info;

/// Hands notifications to a transport.
///
/// There are no retries. A failed or timed-out send is returned to the
/// caller as `DeliveryFailure`.
pub struct Dispatcher<T: Transport> {
    transport: Arc<T>,
    send_timeout: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: Arc<T>, send_timeout: Duration) -> Self {
        Self {
            transport,
            send_timeout,
        }
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one notification to its recipient.
    pub async fn send(&self, notification: &Notification) -> Result<(), AlertError> {
        let attempt = self.transport.send(
            &notification.recipient,
            &notification.subject,
            &notification.body,
        );

        match timeout(self.send_timeout, attempt).await {
            Ok(Ok(())) => {
                info!(
                    recipient = %notification.recipient,
                    region_id = ?notification.region_id(),
                    matches = notification.matches.len(),
                    transport = self.transport.name(),
                    "Alert sent"
                );
                Ok(())
            }
            Ok(Err(AlertError::DeliveryFailure { reason })) => Err(AlertError::DeliveryFailure { reason }),
            Ok(Err(other)) => Err(AlertError::delivery(other.to_string())),
            Err(_elapsed) => Err(AlertError::delivery(format!(
                "send to {} timed out after {:?}",
                notification.recipient, self.send_timeout
            ))),
        }
    }
}
