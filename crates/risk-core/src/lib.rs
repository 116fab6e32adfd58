//! Core types and traits for the wildfire alerting engine.
//!
//! This crate holds everything the alerting pipeline shares and that does no
//! I/O of its own:
//!
//! - [`Region`], [`RiskEvent`], [`Match`], [`Notification`] - the data contracts
//! - [`Polygon`] - WGS84 polygon parsing (WKT / GeoJSON) and closed containment
//! - [`format_alert`] - turns a region's matches into a notification
//! - [`RegionStore`], [`RiskEventStore`], [`Transport`] - the collaborator seams
//! - [`AlertError`] - the error taxonomy shared by every component
//!
//! # Example
//!
//! ```rust
//! use risk_core::{format_alert, Polygon, Region, RiskEvent};
//! use chrono::{TimeZone, Utc};
//!
//! let region = Region {
//!     id: 1,
//!     owner: "owner@example.com".to_string(),
//!     name: "Downtown".to_string(),
//!     geometry: "POLYGON((-118.30 34.00, -118.20 34.00, -118.20 34.10, -118.30 34.10, -118.30 34.00))".to_string(),
//! };
//! let polygon = Polygon::from_wkt(&region.geometry).unwrap();
//!
//! let event = RiskEvent {
//!     id: 7,
//!     observed_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
//!     latitude: 34.05,
//!     longitude: -118.25,
//!     probability: 0.5,
//! };
//! assert!(event.is_match(&polygon, 0.21));
//!
//! let notification = format_alert(&region, vec![event]).unwrap();
//! assert_eq!(notification.recipient, "owner@example.com");
//! ```

mod error;
mod format;
mod geometry;
mod model;
mod trait_def;

pub use error::AlertError;
pub use format::{format_alert, format_match_line};
pub use geometry::{BoundingBox, Coord, Polygon};
pub use model::{validate_threshold, Match, Notification, Region, RiskEvent, DEFAULT_PROBABILITY_THRESHOLD};
pub use trait_def::{RegionStore, RiskEventStore, Transport};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
