//! Wall-Clock and Delay Abstractions
//!
//! The delivery engine needs two things from the platform that it must not
//! reach for directly: a formatted wall-clock time for `CollectedAt`, and a
//! way to wait between retries. Both are injected so the engine runs the
//! same on an ESP32 (SNTP + busy-wait delay), on Linux (`chrono` +
//! `thread::sleep`) and in tests (fixed stamp + recorded delays).
//!
//! ## Common Implementations
//!
//! - `SystemClock`: local time through `chrono` (std)
//! - `FixedClock`: controllable stamp for testing
//! - `StdDelay`: `std::thread::sleep`
//! - `NoDelay`: returns immediately

use crate::time::Timestamp;

/// Source of formatted wall-clock time
///
/// ## Implementation Requirements
///
/// - The format must be stable and lexically sortable
///   (`%Y-%m-%dT%H:%M:%S`, see [`TIMESTAMP_FORMAT`](crate::constants::TIMESTAMP_FORMAT))
/// - Must not block indefinitely; bound any time-sync wait internally
/// - Return `None` when time has not been obtained yet (no NTP sync)
///
/// ## Example Implementation
///
/// ```rust
/// use rfidcollect_core::traits::Clock;
/// use rfidcollect_core::time::{self, Timestamp};
///
/// struct RtcClock {
///     // ... RTC peripheral
/// }
///
/// impl Clock for RtcClock {
///     fn formatted_time(&self) -> Option<Timestamp> {
///         // Read the RTC and format it
///         time::timestamp("2025-04-09T16:31:22").ok()
///     }
/// }
/// ```
pub trait Clock {
    /// Current wall-clock time, or `None` if unknown
    fn formatted_time(&self) -> Option<Timestamp>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn formatted_time(&self) -> Option<Timestamp> {
        (**self).formatted_time()
    }
}

/// Blocking delay between retry attempts
///
/// Delays block the calling context; there is no background delivery.
pub trait Delay {
    /// Pause for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
