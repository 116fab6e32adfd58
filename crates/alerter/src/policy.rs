//! Re-alert suppression.
//!
//! By default every sweep that finds matches for a region sends an alert,
//! even when the matches are the same points as last time. A cooldown policy
//! suppresses repeats for a window unless a point not previously alerted on
//! shows up.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// When a region with matches should be alerted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPolicy {
    /// Alert on every sweep that finds matches.
    #[default]
    EveryCycle,
    /// After a delivered alert, stay quiet for `window` unless new points appear.
    Cooldown { window: Duration },
}

#[derive(Debug)]
struct LastAlert {
    sent_at: Instant,
    event_ids: HashSet<i64>,
}

/// Per-region memory of the last delivered alert.
///
/// Kept in memory only; a restart forgets everything.
#[derive(Debug, Default)]
pub struct AlertLedger {
    policy: AlertPolicy,
    last: Mutex<HashMap<i64, LastAlert>>,
}

impl AlertLedger {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            last: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Whether a region whose current match set has `event_ids` should be alerted.
    pub fn should_alert<I>(&self, region_id: i64, event_ids: I) -> bool
    where
        I: IntoIterator<Item = i64>,
    {
        let window = match self.policy {
            AlertPolicy::EveryCycle => return true,
            AlertPolicy::Cooldown { window } => window,
        };

        let last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match last.get(&region_id) {
            None => true,
            Some(previous) if previous.sent_at.elapsed() >= window => true,
            Some(previous) => event_ids
                .into_iter()
                .any(|id| !previous.event_ids.contains(&id)),
        }
    }

    /// Remember a delivered alert.
    pub fn record<I>(&self, region_id: i64, event_ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        if self.policy == AlertPolicy::EveryCycle {
            return;
        }

        self.last.lock().unwrap_or_else(|e| e.into_inner()).insert(
            region_id,
            LastAlert {
                sent_at: Instant::now(),
                event_ids: event_ids.into_iter().collect(),
            },
        );
    }

    /// Forget regions that are no longer in the store.
    pub fn retain_regions(&self, live: &HashSet<i64>) {
        self.last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|region_id, _| live.contains(region_id));
    }

    /// Number of regions currently remembered.
    pub fn len(&self) -> usize {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cycle_never_suppresses() {
        let ledger = AlertLedger::new(AlertPolicy::EveryCycle);
        ledger.record(1, [10, 11]);

        assert!(ledger.should_alert(1, [10, 11]));
        assert!(ledger.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_suppresses_same_points() {
        let ledger = AlertLedger::new(AlertPolicy::Cooldown {
            window: Duration::from_secs(600),
        });

        assert!(ledger.should_alert(1, [10, 11]));
        ledger.record(1, [10, 11]);

        assert!(!ledger.should_alert(1, [10, 11]));
        assert!(!ledger.should_alert(1, [11]));
        // Other regions are independent
        assert!(ledger.should_alert(2, [10, 11]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_new_point_breaks_through() {
        let ledger = AlertLedger::new(AlertPolicy::Cooldown {
            window: Duration::from_secs(600),
        });
        ledger.record(1, [10]);

        assert!(ledger.should_alert(1, [10, 12]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expires() {
        let ledger = AlertLedger::new(AlertPolicy::Cooldown {
            window: Duration::from_secs(600),
        });
        ledger.record(1, [10]);

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(!ledger.should_alert(1, [10]));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(ledger.should_alert(1, [10]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retain_regions() {
        let ledger = AlertLedger::new(AlertPolicy::Cooldown {
            window: Duration::from_secs(600),
        });
        ledger.record(1, [10]);
        ledger.record(2, [20]);

        ledger.retain_regions(&HashSet::from([2]));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.should_alert(1, [10]));
        assert!(!ledger.should_alert(2, [20]));
    }
}
