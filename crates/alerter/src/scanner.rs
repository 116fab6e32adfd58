//! One sweep over every region: match, format, dispatch.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use risk_core::{
    format_alert, AlertError, Region, RegionStore, RiskEventStore, Transport,
    DEFAULT_PROBABILITY_THRESHOLD,
};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{DEFAULT_MAX_CONCURRENT_REGIONS, DEFAULT_SEND_TIMEOUT, DEFAULT_STORE_TIMEOUT};
use crate::dispatcher::Dispatcher;
use crate::matcher::SpatialMatcher;
use crate::policy::{AlertLedger, AlertPolicy};

/// Settings for each sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Minimum probability for a risk point to alert.
    pub probability_threshold: f64,
    /// Bound on the region listing and each risk point query.
    pub store_timeout: Duration,
    /// Bound on each send.
    pub send_timeout: Duration,
    /// Regions processed at once. 1 processes them one after another.
    pub max_concurrent_regions: usize,
    /// Re-alert suppression.
    pub policy: AlertPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probability_threshold: DEFAULT_PROBABILITY_THRESHOLD,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            max_concurrent_regions: DEFAULT_MAX_CONCURRENT_REGIONS,
            policy: AlertPolicy::EveryCycle,
        }
    }
}

impl ScanConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.probability_threshold = threshold;
        self
    }

    pub fn with_max_concurrent_regions(mut self, max: usize) -> Self {
        self.max_concurrent_regions = max;
        self
    }

    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeouts(mut self, store_timeout: Duration, send_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self.send_timeout = send_timeout;
        self
    }
}

/// Cooperative stop signal shared between the scheduler and a running sweep.
///
/// Once set, a sweep starts no new regions; regions already in flight finish.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one region during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionOutcome {
    /// An alert with `matches` lines was delivered.
    Notified { matches: usize },
    /// Nothing above the threshold inside the region.
    NoMatches,
    /// Matches found but the alert policy held the alert back.
    Suppressed { matches: usize },
    /// Matching, formatting or delivery failed.
    Failed(AlertError),
    /// Not started because a stop was requested.
    Skipped,
}

/// Tally of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Regions in the snapshot.
    pub regions: usize,
    /// Regions that were started (everything except `skipped`).
    pub attempted: usize,
    pub notified: usize,
    pub no_matches: usize,
    pub suppressed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: &RegionOutcome) {
        match outcome {
            RegionOutcome::Notified { .. } => self.notified += 1,
            RegionOutcome::NoMatches => self.no_matches += 1,
            RegionOutcome::Suppressed { .. } => self.suppressed += 1,
            RegionOutcome::Failed(_) => self.failed += 1,
            RegionOutcome::Skipped => {
                self.skipped += 1;
                return;
            }
        }
        self.attempted += 1;
    }

    /// Log the tally at info level.
    pub fn log(&self, elapsed: Duration) {
        info!(
            regions = self.regions,
            attempted = self.attempted,
            notified = self.notified,
            no_matches = self.no_matches,
            suppressed = self.suppressed,
            failed = self.failed,
            skipped = self.skipped,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Sweep complete"
        );
    }
}

/// Runs sweeps: list regions, then match, format and dispatch each one.
pub struct Scanner<R: RegionStore, E: RiskEventStore, T: Transport> {
    regions: Arc<R>,
    matcher: SpatialMatcher<E>,
    dispatcher: Dispatcher<T>,
    ledger: AlertLedger,
    config: ScanConfig,
}

impl<R: RegionStore, E: RiskEventStore, T: Transport> Scanner<R, E, T> {
    pub fn new(regions: Arc<R>, events: Arc<E>, transport: Arc<T>, config: ScanConfig) -> Self {
        Self {
            regions,
            matcher: SpatialMatcher::new(events, config.store_timeout),
            dispatcher: Dispatcher::new(transport, config.send_timeout),
            ledger: AlertLedger::new(config.policy),
            config,
        }
    }

    /// Create a scanner with default settings.
    pub fn with_defaults(regions: Arc<R>, events: Arc<E>, transport: Arc<T>) -> Self {
        Self::new(regions, events, transport, ScanConfig::default())
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn ledger(&self) -> &AlertLedger {
        &self.ledger
    }

    /// Short description of the collaborators, for logging.
    pub fn describe(&self) -> String {
        format!(
            "regions={} events={} transport={}",
            self.regions.name(),
            self.matcher.store().name(),
            self.dispatcher.transport().name()
        )
    }

    /// Run one sweep.
    ///
    /// Fails only when the region snapshot cannot be fetched; every
    /// per-region failure is logged and counted in the report instead.
    pub async fn scan(&self, stop: &StopFlag) -> Result<SweepReport, AlertError> {
        let regions = match timeout(self.config.store_timeout, self.regions.list_regions()).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(AlertError::StoreUnavailable(format!(
                    "{} listing timed out after {:?}",
                    self.regions.name(),
                    self.config.store_timeout
                )))
            }
        };

        let live: HashSet<i64> = regions.iter().map(|region| region.id).collect();
        self.ledger.retain_regions(&live);

        let mut report = SweepReport {
            regions: regions.len(),
            ..Default::default()
        };

        let workers = self.config.max_concurrent_regions.max(1);
        let mut outcomes = stream::iter(regions)
            .map(|region| self.process_region(region, stop))
            .buffer_unordered(workers);

        while let Some(outcome) = outcomes.next().await {
            report.record(&outcome);
        }

        Ok(report)
    }

    /// Match, format and dispatch one region. Never fails; errors become outcomes.
    pub async fn process_region(&self, region: Region, stop: &StopFlag) -> RegionOutcome {
        if stop.is_stopped() {
            debug!(region_id = region.id, "Stop requested, skipping region");
            return RegionOutcome::Skipped;
        }

        let events = match self
            .matcher
            .find_matches(&region, self.config.probability_threshold)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                warn!(region_id = region.id, kind = e.kind(), error = %e, "Failed to match region");
                return RegionOutcome::Failed(e);
            }
        };

        if events.is_empty() {
            return RegionOutcome::NoMatches;
        }

        let matches = events.len();
        if !self.ledger.should_alert(region.id, events.iter().map(|event| event.id)) {
            debug!(region_id = region.id, matches, "Alert suppressed by cooldown");
            return RegionOutcome::Suppressed { matches };
        }

        let notification = match format_alert(&region, events) {
            Ok(notification) => notification,
            Err(e) => {
                error!(region_id = region.id, error = %e, "Failed to format alert");
                return RegionOutcome::Failed(e);
            }
        };

        match self.dispatcher.send(&notification).await {
            Ok(()) => {
                self.ledger
                    .record(region.id, notification.matches.iter().map(|m| m.event.id));
                RegionOutcome::Notified { matches }
            }
            Err(e) => {
                error!(
                    region_id = region.id,
                    recipient = %region.owner,
                    error = %e,
                    "Failed to send alert"
                );
                RegionOutcome::Failed(e)
            }
        }
    }
}
