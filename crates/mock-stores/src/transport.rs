//! Recording transport.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use risk_core::{async_trait, AlertError, Transport};

/// A message accepted by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A transport that records what it is asked to send.
///
/// Sends to recipients registered with [`failing_for`](Self::failing_for),
/// or every send after [`set_failing`](Self::set_failing), return
/// `DeliveryFailure` and are not recorded as sent.
#[derive(Debug)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing_recipients: HashSet<String>,
    fail_all: AtomicBool,
    attempts: AtomicUsize,
    reachable: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_recipients: HashSet::new(),
            fail_all: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            reachable: true,
        }
    }

    /// Reject every send to `recipient`.
    pub fn failing_for(mut self, recipient: impl Into<String>) -> Self {
        self.failing_recipients.insert(recipient.into());
        self
    }

    /// Make `check` fail, as an unreachable relay would.
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Reject (or stop rejecting) every send.
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Messages successfully "delivered", in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages delivered to one recipient.
    pub fn sent_to(&self, recipient: &str) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|message| message.to == recipient)
            .collect()
    }

    /// Total send attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_all.load(Ordering::SeqCst) || self.failing_recipients.contains(to) {
            return Err(AlertError::delivery(format!("rejected recipient {}", to)));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingTransport"
    }

    async fn check(&self) -> Result<(), AlertError> {
        if self.reachable {
            Ok(())
        } else {
            Err(AlertError::delivery("transport unreachable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sends() {
        let transport = RecordingTransport::new();
        transport.send("a@example.com", "s1", "b1").await.unwrap();
        transport.send("b@example.com", "s2", "b2").await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@example.com");
        assert_eq!(transport.sent_to("b@example.com")[0].subject, "s2");
        assert!(transport.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_recipient() {
        let transport = RecordingTransport::new().failing_for("bounce@example.com");

        let result = transport.send("bounce@example.com", "s", "b").await;
        assert!(matches!(result, Err(AlertError::DeliveryFailure { .. })));
        assert!(transport.sent().is_empty());
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_fail_all_toggle() {
        let transport = RecordingTransport::new();
        transport.set_failing(true);
        assert!(transport.send("a@example.com", "s", "b").await.is_err());
        transport.set_failing(false);
        assert!(transport.send("a@example.com", "s", "b").await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable() {
        let transport = RecordingTransport::new().unreachable();
        assert!(transport.check().await.is_err());
    }
}
