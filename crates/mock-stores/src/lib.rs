//! In-memory collaborators for testing the alerting engine.
//!
//! This crate provides fake implementations of the `risk-core` traits:
//! - `InMemoryRegionStore` - a fixed (but replaceable) region snapshot
//! - `FlakyRegionStore` - fails a configurable number of listings
//! - `InMemoryRiskEventStore` - filters a vector of events with the real predicate
//! - `RecordingTransport` - records sends, optionally failing some recipients
//! - `DelayedTransport` / `DelayedRiskEventStore` - add artificial latency
//!
//! # Example
//!
//! ```rust
//! use mock_stores::{RecordingTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = RecordingTransport::new().failing_for("bounce@example.com");
//!
//!     transport.send("owner@example.com", "Alert", "Body").await.unwrap();
//!     assert!(transport.send("bounce@example.com", "Alert", "Body").await.is_err());
//!
//!     assert_eq!(transport.sent().len(), 1);
//!     assert_eq!(transport.attempts(), 2);
//! }
//! ```

mod delayed;
mod event_store;
mod region_store;
mod transport;

// Re-export risk-core types for convenience
pub use risk_core::{async_trait, AlertError, RegionStore, RiskEventStore, Transport};

pub use delayed::{DelayedRiskEventStore, DelayedTransport};
pub use event_store::InMemoryRiskEventStore;
pub use region_store::{FlakyRegionStore, InMemoryRegionStore};
pub use transport::{RecordingTransport, SentMessage};
