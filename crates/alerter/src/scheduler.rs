//! Fixed-interval sweep loop with graceful shutdown.

use std::future::Future;
use std::time::Duration;

use risk_core::{RegionStore, RiskEventStore, Transport};
use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::scanner::{Scanner, StopFlag};

/// Errors from running the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A zero poll interval would sweep in a busy loop.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// The shutdown signal handler could not be installed.
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Drives sweeps: one immediately, then one every `poll_interval`.
///
/// Sweeps never overlap. A sweep that outlasts the interval is followed
/// by the next one as soon as it finishes, and the period restarts from
/// there, so sweep N+1 starts at `max(start(N) + interval, end(N))`.
pub struct Scheduler<R: RegionStore, E: RiskEventStore, T: Transport> {
    scanner: Scanner<R, E, T>,
    poll_interval: Duration,
}

impl<R: RegionStore, E: RiskEventStore, T: Transport> Scheduler<R, E, T> {
    pub fn new(scanner: Scanner<R, E, T>, poll_interval: Duration) -> Result<Self, SchedulerError> {
        if poll_interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        Ok(Self {
            scanner,
            poll_interval,
        })
    }

    /// Get a reference to the scanner.
    pub fn scanner(&self) -> &Scanner<R, E, T> {
        &self.scanner
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run forever.
    pub async fn run(self) {
        self.run_with_shutdown(std::future::pending::<()>()).await;
    }

    /// Run until `shutdown_signal` completes, returning the number of sweeps started.
    ///
    /// A signal between sweeps stops the loop before the next one. A signal
    /// during a sweep lets regions already in flight finish, skips the rest,
    /// then stops.
    pub async fn run_with_shutdown<S>(self, shutdown_signal: S) -> u64
    where
        S: Future<Output = ()> + Send,
    {
        info!(
            poll_interval = ?self.poll_interval,
            threshold = self.scanner.config().probability_threshold,
            collaborators = %self.scanner.describe(),
            "Starting scan scheduler"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = StopFlag::new();
        let mut sweeps: u64 = 0;

        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!(sweeps, "Shutdown signal received, stopping scheduler");
                    return sweeps;
                }

                _ = ticker.tick() => {}
            }

            sweeps += 1;
            let started = Instant::now();
            let sweep = self.scanner.scan(&stop);
            tokio::pin!(sweep);

            let finished = tokio::select! {
                biased;

                result = &mut sweep => Some(result),
                () = &mut shutdown_signal => None,
            };

            let result = match finished {
                Some(result) => result,
                None => {
                    info!(sweep = sweeps, "Shutdown signal received, finishing in-flight regions");
                    stop.stop();
                    sweep.await
                }
            };

            match result {
                Ok(report) => report.log(started.elapsed()),
                Err(e) => error!(
                    sweep = sweeps,
                    kind = e.kind(),
                    error = %e,
                    "Sweep abandoned, retrying next tick"
                ),
            }

            if stop.is_stopped() {
                info!(sweeps, "Scheduler stopped");
                return sweeps;
            }
        }
    }

    /// Run until Ctrl+C is pressed.
    ///
    /// Convenience wrapper around [`run_with_shutdown`](Self::run_with_shutdown).
    #[cfg(feature = "signal")]
    pub async fn run_until_stopped(self) -> Result<u64, SchedulerError> {
        let mut signal_error = None;
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                signal_error = Some(e);
            }
        };

        let sweeps = self.run_with_shutdown(shutdown).await;

        match signal_error {
            Some(e) => Err(SchedulerError::Signal(e)),
            None => Ok(sweeps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanConfig;
    use chrono::{TimeZone, Utc};
    use mock_stores::{
        DelayedRiskEventStore, FlakyRegionStore, InMemoryRegionStore, InMemoryRiskEventStore,
        RecordingTransport,
    };
    use risk_core::{Region, RiskEvent};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn unit_square_region() -> Region {
        Region {
            id: 1,
            owner: "owner@example.com".to_string(),
            name: "Square".to_string(),
            geometry: "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))".to_string(),
        }
    }

    fn hot_point() -> RiskEvent {
        RiskEvent {
            id: 1,
            observed_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            latitude: 0.5,
            longitude: 0.5,
            probability: 0.9,
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let scanner = Scanner::with_defaults(
            Arc::new(InMemoryRegionStore::default()),
            Arc::new(InMemoryRiskEventStore::default()),
            Arc::new(RecordingTransport::new()),
        );
        let result = Scheduler::new(scanner, Duration::ZERO);
        assert!(matches!(result, Err(SchedulerError::ZeroInterval)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_sweep_immediate_then_periodic() {
        let regions = Arc::new(InMemoryRegionStore::new(vec![unit_square_region()]));
        let scanner = Scanner::with_defaults(
            regions.clone(),
            Arc::new(InMemoryRiskEventStore::default()),
            Arc::new(RecordingTransport::new()),
        );
        let scheduler = Scheduler::new(scanner, Duration::from_secs(60)).unwrap();

        // Sweeps at 0s, 60s and 120s
        let sweeps = scheduler.run_with_shutdown(sleep(Duration::from_secs(150))).await;

        assert_eq!(sweeps, 3);
        assert_eq!(regions.listings(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_sweep() {
        let regions = Arc::new(InMemoryRegionStore::default());
        let scanner = Scanner::with_defaults(
            regions.clone(),
            Arc::new(InMemoryRiskEventStore::default()),
            Arc::new(RecordingTransport::new()),
        );
        let scheduler = Scheduler::new(scanner, Duration::from_secs(60)).unwrap();

        let sweeps = scheduler.run_with_shutdown(std::future::ready(())).await;

        assert_eq!(sweeps, 0);
        assert_eq!(regions.listings(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_region_store_failure_does_not_stop_loop() {
        let regions = Arc::new(FlakyRegionStore::new(vec![unit_square_region()], 1));
        let transport = Arc::new(RecordingTransport::new());
        let scanner = Scanner::with_defaults(
            regions.clone(),
            Arc::new(InMemoryRiskEventStore::new(vec![hot_point()])),
            transport.clone(),
        );
        let scheduler = Scheduler::new(scanner, Duration::from_secs(60)).unwrap();

        let sweeps = scheduler.run_with_shutdown(sleep(Duration::from_secs(90))).await;

        assert_eq!(sweeps, 2);
        assert_eq!(regions.listings(), 2);
        // Only the second sweep reached the transport
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_sweep_delays_next_without_overlap() {
        let events = Arc::new(DelayedRiskEventStore::new(
            InMemoryRiskEventStore::default(),
            Duration::from_secs(90),
        ));
        let config = ScanConfig::default()
            .with_timeouts(Duration::from_secs(120), Duration::from_secs(30));
        let scanner = Scanner::new(
            Arc::new(InMemoryRegionStore::new(vec![unit_square_region()])),
            events.clone(),
            Arc::new(RecordingTransport::new()),
            config,
        );
        let scheduler = Scheduler::new(scanner, Duration::from_secs(60)).unwrap();

        let start = Instant::now();
        // Sweep 1 runs 0s-90s, sweep 2 starts at 90s (not 60s) and is
        // interrupted at 100s, finishing its in-flight region at 180s.
        let sweeps = scheduler.run_with_shutdown(sleep(Duration::from_secs(100))).await;

        assert_eq!(sweeps, 2);
        assert_eq!(events.inner().queries(), 2);
        assert!(start.elapsed() >= Duration::from_secs(180));
    }
}
