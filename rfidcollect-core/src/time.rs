//! Time management for collection units
//!
//! Provides the timestamp type sent as `CollectedAt` and the clock/delay
//! implementations used on hosts and in tests:
//! - System clock (when std and a synced wall clock are available)
//! - Fixed clock (for tests and replay)
//! - Blocking delays

use heapless::String;

use crate::constants::{MAX_TIMESTAMP_LEN, UNSYNCED_TIMESTAMP};
use crate::errors::{DeliveryError, DeliveryResult};
use crate::traits::{Clock, Delay};

/// Formatted wall-clock time, `%Y-%m-%dT%H:%M:%S`
pub type Timestamp = String<MAX_TIMESTAMP_LEN>;

/// Store a timestamp string inline
pub fn timestamp(raw: &str) -> DeliveryResult<Timestamp> {
    let mut stamp = Timestamp::new();
    stamp.push_str(raw).map_err(|_| DeliveryError::TimestampTooLong {
        len: raw.len(),
        max: MAX_TIMESTAMP_LEN,
    })?;
    Ok(stamp)
}

const _: () = assert!(UNSYNCED_TIMESTAMP.len() <= MAX_TIMESTAMP_LEN);

/// Placeholder stamp for observations buffered before any time sync
pub fn unsynced() -> Timestamp {
    Timestamp::try_from(UNSYNCED_TIMESTAMP).unwrap_or_default()
}

/// Fixed clock for testing
///
/// Holds a stamp that only changes when told to. `None` simulates a device
/// that has not synced time yet.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    stamp: Option<Timestamp>,
}

impl FixedClock {
    /// Clock that always reports `stamp`
    pub fn new(stamp: &str) -> Self {
        Self { stamp: timestamp(stamp).ok() }
    }

    /// Clock that has never obtained time
    pub fn unavailable() -> Self {
        Self { stamp: None }
    }

    /// Change the reported stamp
    pub fn set(&mut self, stamp: &str) {
        self.stamp = timestamp(stamp).ok();
    }

    /// Lose time sync
    pub fn fail(&mut self) {
        self.stamp = None;
    }
}

impl Clock for FixedClock {
    fn formatted_time(&self) -> Option<Timestamp> {
        self.stamp.clone()
    }
}

/// System wall clock (requires std)
///
/// Formats local time, or time at a fixed UTC offset when one is given
/// (the same gmt + dst offset an SNTP client would apply).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    offset: Option<chrono::FixedOffset>,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Clock in the host's local time zone
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Clock at a fixed offset east of UTC
    ///
    /// Offsets outside ±24h fall back to local time.
    pub fn with_utc_offset_secs(secs: i32) -> Self {
        Self { offset: chrono::FixedOffset::east_opt(secs) }
    }

    /// Clock using the deployment's standard + daylight offsets
    pub fn deployment() -> Self {
        use crate::constants::time::{DST_OFFSET_SECS, UTC_OFFSET_SECS};
        Self::with_utc_offset_secs(UTC_OFFSET_SECS + DST_OFFSET_SECS)
    }

    fn render<Tz>(now: chrono::DateTime<Tz>) -> Option<Timestamp>
    where
        Tz: chrono::TimeZone,
        Tz::Offset: core::fmt::Display,
    {
        use core::fmt::Write;
        use crate::constants::TIMESTAMP_FORMAT;

        let mut stamp = Timestamp::new();
        write!(stamp, "{}", now.format(TIMESTAMP_FORMAT)).ok()?;
        Some(stamp)
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn formatted_time(&self) -> Option<Timestamp> {
        match self.offset {
            Some(offset) => Self::render(chrono::Utc::now().with_timezone(&offset)),
            None => Self::render(chrono::Local::now()),
        }
    }
}

/// Delay that returns immediately
///
/// Used for drains and host tests where waiting adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// Blocking delay through `std::thread::sleep` (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
