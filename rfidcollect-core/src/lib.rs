//! Delivery core for RFIDCollect units
//!
//! Takes "tag observed" events from an RFID reader and gets them to the
//! collection server: repeats are suppressed, each new tag is POSTed with
//! bounded retries, and whatever cannot be delivered waits in a fixed-size
//! offline buffer until the network returns.
//!
//! Key constraints:
//! - Runs on a single-core MCU (ESP32 class)
//! - Fixed-size records, no heap growth while buffering
//! - Every collaborator (radio, HTTP, clock) injected through a trait
//!
//! ```no_run
//! use rfidcollect_core::{DeliveryConfig, DeliveryEngine};
//! use rfidcollect_core::diagnostics::NullSink;
//! use rfidcollect_core::time::{FixedClock, NoDelay};
//! # use rfidcollect_core::traits::{NetworkStatus, ResponseCode, Session, Transport};
//! # struct Offline;
//! # struct NoSession;
//! # impl Session for NoSession {
//! #     fn add_header(&mut self, _: &str, _: &str) {}
//! #     fn post(&mut self, _: &[u8]) -> ResponseCode { ResponseCode::NOT_CONNECTED }
//! #     fn end(self) {}
//! # }
//! # impl Transport for Offline {
//! #     type Session<'a> = NoSession;
//! #     type Error = ();
//! #     fn begin_session(&mut self, _: &str) -> Result<NoSession, ()> { Err(()) }
//! # }
//! # impl NetworkStatus for Offline {
//! #     fn is_connected(&self) -> bool { false }
//! # }
//!
//! let config = DeliveryConfig::new("http://10.14.11.141:3000/api/data").unwrap();
//! let mut engine: DeliveryEngine<_, _, _, _> =
//!     DeliveryEngine::new(config, Offline, FixedClock::unavailable(), NoDelay, NullSink);
//!
//! // No network: parked in the offline buffer
//! let delivery = engine.send("04A1B2C3", None).unwrap();
//! assert!(!delivery.is_sent());
//! assert_eq!(engine.pending(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod buffer;
pub mod collector;
pub mod constants;
pub mod dedup;
pub mod delivery;
pub mod diagnostics;
pub mod errors;
pub mod observation;
pub mod retry;
pub mod time;
pub mod traits;

// Public API
pub use buffer::OfflineBuffer;
pub use collector::{Collector, CollectorConfig, PollReport, TagOutcome};
pub use dedup::Deduplicator;
pub use delivery::{Delivery, DeliveryConfig, DeliveryEngine, DeliveryStats};
pub use diagnostics::{DeliveryEvent, DiagnosticSink};
pub use errors::{DeliveryError, DeliveryResult};
pub use observation::{Observation, TagId};
pub use retry::RetryPolicy;
pub use time::Timestamp;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
