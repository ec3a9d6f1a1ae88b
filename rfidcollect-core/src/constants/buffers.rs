//! Buffer Sizes and Memory Constraints
//!
//! Every string in the delivery path is stored inline (`heapless::String`),
//! so these capacities fix the size of an `Observation` and therefore of
//! the whole offline buffer.

// ===== OFFLINE BUFFER =====

/// Number of observation slots in the offline buffer.
///
/// Sized for an ESP8266/ESP32 collection unit:
/// - 20 slots × ~48 bytes/observation ≈ 1KB
/// - Covers a full street of bins collected while out of WiFi range
///
/// Source: collection-truck deployment, one bin every 20-40 seconds
pub const OFFLINE_BUFFER_CAPACITY: usize = 20;

// ===== INLINE STRING CAPACITIES =====

/// Maximum tag identifier length in characters.
///
/// MIFARE UIDs are 4, 7 or 10 bytes; two hex digits per byte gives at
/// most 20 characters.
pub const MAX_TAG_ID_LEN: usize = 20;

/// Maximum timestamp length in characters.
///
/// `%Y-%m-%dT%H:%M:%S` renders as 19 characters; the firmware reserves a
/// 25 byte buffer for it.
pub const MAX_TIMESTAMP_LEN: usize = 25;

/// Maximum endpoint URL length.
pub const MAX_ENDPOINT_LEN: usize = 128;

/// Maximum collection-session identifier length.
pub const MAX_COLLECTION_ID_LEN: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_fits_tag_id() {
        // 10 byte UID, two hex digits per byte
        assert!(10 * 2 <= MAX_TAG_ID_LEN);
    }
}
