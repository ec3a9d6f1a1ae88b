//! Time-Related Constants
//!
//! Retry timing, reader cadence and the wall-clock format sent to the
//! collection server. Delays are in milliseconds (`u32`) to match the
//! blocking delay primitives available on microcontrollers.

// ===== RETRY =====

/// Attempts per first-time send before falling back to the offline buffer.
pub const MAX_RETRY_ATTEMPTS: u8 = 3;

/// Fixed delay between delivery attempts.
///
/// Long enough for a WiFi stack to recover from a dropped association,
/// short enough that three attempts finish before the next bin is read.
pub const RETRY_DELAY_MS: u32 = 2_000;

/// Connect/response deadline for one transport session.
pub const SESSION_TIMEOUT_MS: u32 = 5_000;

// ===== COLLECTION LOOP =====

/// Pause between reader polls in the main loop.
pub const READ_DELAY_MS: u32 = 1_000;

/// Minimum spacing between two drains of the offline buffer.
pub const DRAIN_INTERVAL_MS: u64 = 30_000;

/// Time after the last accepted tag before the same tag is accepted again.
///
/// A bin is lifted, emptied and put down in well under a minute; reading
/// the same bin again after that is a new collection.
pub const DEDUP_COOLDOWN_MS: u64 = 60_000;

// ===== WALL CLOCK =====

/// strftime pattern for `CollectedAt`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Stamp used when no wall-clock time could be obtained at all.
pub const UNSYNCED_TIMESTAMP: &str = "1970-01-01T00:00:00";

/// Standard time offset from UTC for the deployment region (EET).
pub const UTC_OFFSET_SECS: i32 = 7_200;

/// Additional daylight-saving offset applied by the NTP client.
pub const DST_OFFSET_SECS: i32 = 3_600;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::buffers::MAX_TIMESTAMP_LEN;

    #[test]
    fn unsynced_stamp_matches_format_width() {
        assert_eq!(UNSYNCED_TIMESTAMP.len(), 19);
        assert!(UNSYNCED_TIMESTAMP.len() <= MAX_TIMESTAMP_LEN);
    }

    #[test]
    fn full_retry_cycle_is_bounded() {
        let worst = MAX_RETRY_ATTEMPTS as u32 * SESSION_TIMEOUT_MS
            + (MAX_RETRY_ATTEMPTS as u32 - 1) * RETRY_DELAY_MS;
        assert!(worst < DRAIN_INTERVAL_MS as u32);
    }
}
