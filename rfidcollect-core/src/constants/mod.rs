//! Constants for RFIDCollect Core
//!
//! Centralized defaults for the delivery subsystem. Everything tunable at
//! runtime (endpoint, retry policy, drain cadence) starts from a value
//! defined here, so a firmware build can see its full memory and timing
//! footprint in one place.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Buffers**: Slot counts and inline string capacities
//! - **Time**: Retry delays, poll cadence, timestamp formatting
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include units in names (`_MS`, `_SECS`, `_LEN`)
//! 3. Document the source of a value when it comes from hardware or the server

/// Slot counts and inline string capacities sized for a 32-bit MCU.
pub mod buffers;

/// Retry, polling and timestamp constants.
pub mod time;

// Re-export commonly used constants for convenience
pub use buffers::{
    OFFLINE_BUFFER_CAPACITY, MAX_TAG_ID_LEN, MAX_TIMESTAMP_LEN,
    MAX_ENDPOINT_LEN, MAX_COLLECTION_ID_LEN,
};

pub use time::{
    MAX_RETRY_ATTEMPTS, RETRY_DELAY_MS, READ_DELAY_MS,
    DRAIN_INTERVAL_MS, DEDUP_COOLDOWN_MS, SESSION_TIMEOUT_MS,
    TIMESTAMP_FORMAT, UNSYNCED_TIMESTAMP,
};
