//! Alert formatting.

use crate::error::AlertError;
use crate::model::{Match, Notification, Region, RiskEvent};

const SIGNATURE: &str = "-- Cloud Wildfire Monitoring Platform";

/// Render one risk event as a single alert line.
///
/// Times are always rendered in UTC so the output does not depend on the
/// host locale or time zone.
pub fn format_match_line(event: &RiskEvent) -> String {
    format!(
        "- Time: {}, Latitude: {:.2}, Longitude: {:.2}, Probability: {:.2}%",
        event.observed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        event.latitude,
        event.longitude,
        event.probability * 100.0
    )
}

/// Build the notification for a region and its matched risk events.
///
/// Lines appear in the order `events` are given. Fails with
/// [`AlertError::EmptyMatchSet`] when there is nothing to report.
pub fn format_alert(region: &Region, events: Vec<RiskEvent>) -> Result<Notification, AlertError> {
    if events.is_empty() {
        return Err(AlertError::EmptyMatchSet);
    }

    let subject = format!(
        "Wildfire Risk Alert: high-risk fire points detected in your region \"{}\"",
        region.name
    );

    let lines: Vec<String> = events.iter().map(format_match_line).collect();

    let body = format!(
        "Hello,\n\n\
         We have detected predicted fire points with the following details within your defined region \"{}\" (ID: {}):\n\n\
         {}\n\n\
         Please pay immediate attention to this area and take necessary safety precautions.\n\n\
         {}",
        region.name,
        region.id,
        lines.join("\n"),
        SIGNATURE
    );

    let matches = events
        .into_iter()
        .map(|event| Match {
            region_id: region.id,
            event,
        })
        .collect();

    Ok(Notification {
        recipient: region.owner.clone(),
        subject,
        body,
        matches,
    })
}
