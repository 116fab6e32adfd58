//! Data contracts shared by stores, matcher, formatter and dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{Coord, Polygon};

/// Probability at or above which a risk event is alert-worthy.
pub const DEFAULT_PROBABILITY_THRESHOLD: f64 = 0.21;

/// A user-owned named polygon of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Store-assigned identifier.
    pub id: i64,
    /// Recipient address of the owner (an email address, treated as opaque).
    pub owner: String,
    /// Human-readable name chosen by the owner.
    pub name: String,
    /// Polygon in WGS84 lon/lat, as well-known text.
    pub geometry: String,
}

/// A timestamped, geolocated hazard probability observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub id: i64,
    pub observed_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

impl RiskEvent {
    /// The event location as a lon/lat coordinate.
    pub fn coord(&self) -> Coord {
        Coord::new(self.longitude, self.latitude)
    }

    /// The alerting predicate: probability at or above `threshold` and the
    /// point inside or on the boundary of `polygon`.
    pub fn is_match(&self, polygon: &Polygon, threshold: f64) -> bool {
        self.probability >= threshold && polygon.contains(self.coord())
    }
}

/// A risk event found inside a region during one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub region_id: i64,
    pub event: RiskEvent,
}

/// A formatted alert for one region/recipient pair.
///
/// Only ever built from a non-empty match set; see [`crate::format_alert`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Matches in the order the matcher returned them.
    pub matches: Vec<Match>,
}

impl Notification {
    /// Identifier of the region this notification was built for.
    pub fn region_id(&self) -> Option<i64> {
        self.matches.first().map(|m| m.region_id)
    }
}

/// Check that a probability threshold is a finite value in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<f64, String> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(format!(
            "probability threshold must be within [0, 1], got {}",
            threshold
        ));
    }
    Ok(threshold)
}
