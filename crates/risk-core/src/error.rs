//! Error taxonomy for the alerting pipeline.

use thiserror::Error;

/// Errors raised by stores, the matcher, the formatter and the dispatcher.
///
/// None of these are fatal to a sweep: callers catch them at the smallest
/// enclosing scope (one region, one send) and log them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    /// A region or risk event store could not be queried (including timeouts).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A region polygon is malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The notification transport rejected or failed to send a message.
    #[error("delivery failure: {reason}")]
    DeliveryFailure { reason: String },

    /// An alert was requested for an empty match set.
    #[error("cannot format an alert with no matches")]
    EmptyMatchSet,
}

impl AlertError {
    /// Convenience constructor for [`AlertError::DeliveryFailure`].
    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::DeliveryFailure {
            reason: reason.into(),
        }
    }

    /// Short machine-friendly label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertError::StoreUnavailable(_) => "store_unavailable",
            AlertError::InvalidGeometry(_) => "invalid_geometry",
            AlertError::DeliveryFailure { .. } => "delivery_failure",
            AlertError::EmptyMatchSet => "empty_match_set",
        }
    }
}
