//! Error Types for the Delivery Subsystem
//!
//! ## Design Philosophy
//!
//! Almost nothing in the delivery path is an error. Connection failures,
//! missing sessions and exhausted retries are absorbed by the engine
//! (retry, then buffer) and reported to the diagnostic sink instead. What
//! remains here is:
//!
//! 1. **Hard delivery failure**: the network is unusable *and* the offline
//!    buffer is full, so the observation is lost.
//! 2. **Malformed input**: a tag id or timestamp that cannot be stored in
//!    the fixed-size observation record.
//! 3. **Configuration**: an endpoint that does not fit the inline buffer.
//!
//! Errors stay `Copy` and allocation-free so they can be returned from the
//! hot path on a microcontroller.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use rfidcollect_core::{DeliveryError, Delivery};
//!
//! fn signal(result: Result<Delivery, DeliveryError>) {
//!     match result {
//!         Ok(Delivery::Sent { .. }) => {
//!             // green LED
//!         }
//!         Ok(Delivery::Buffered { .. }) => {
//!             // amber LED, will be drained later
//!         }
//!         Err(DeliveryError::BufferFull { .. }) => {
//!             // red LED, observation lost
//!         }
//!         Err(_) => {
//!             // reader produced garbage, ignore
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for delivery operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Delivery errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Offline buffer has no free slot; the observation was dropped
    #[error("Offline buffer full ({capacity} slots)")]
    BufferFull {
        /// Number of slots in the buffer
        capacity: usize,
    },

    /// Tag identifier is empty or contains non-printable characters
    #[error("Invalid tag id")]
    InvalidTagId,

    /// Tag identifier does not fit the inline record
    #[error("Tag id length {len} exceeds {max}")]
    TagIdTooLong {
        /// Length of the rejected identifier
        len: usize,
        /// Maximum supported length
        max: usize,
    },

    /// Timestamp does not fit the inline record
    #[error("Timestamp length {len} exceeds {max}")]
    TimestampTooLong {
        /// Length of the rejected timestamp
        len: usize,
        /// Maximum supported length
        max: usize,
    },

    /// Endpoint URL does not fit the inline configuration
    #[error("Endpoint length {len} exceeds {max}")]
    EndpointTooLong {
        /// Length of the rejected URL
        len: usize,
        /// Maximum supported length
        max: usize,
    },

    /// Collection-session identifier does not fit the inline configuration
    #[error("Collection id length {len} exceeds {max}")]
    CollectionIdTooLong {
        /// Length of the rejected identifier
        len: usize,
        /// Maximum supported length
        max: usize,
    },

    /// Payload could not be serialized
    #[error("Payload serialization failed")]
    Serialization,
}

impl DeliveryError {
    /// True when the observation was lost because nothing could hold it.
    pub const fn is_data_loss(&self) -> bool {
        matches!(self, Self::BufferFull { .. })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeliveryError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::BufferFull { capacity } =>
                defmt::write!(fmt, "Buffer full ({} slots)", capacity),
            Self::InvalidTagId =>
                defmt::write!(fmt, "Invalid tag id"),
            Self::TagIdTooLong { len, max } =>
                defmt::write!(fmt, "Tag id {} > {}", len, max),
            Self::TimestampTooLong { len, max } =>
                defmt::write!(fmt, "Timestamp {} > {}", len, max),
            Self::EndpointTooLong { len, max } =>
                defmt::write!(fmt, "Endpoint {} > {}", len, max),
            Self::CollectionIdTooLong { len, max } =>
                defmt::write!(fmt, "Collection id {} > {}", len, max),
            Self::Serialization =>
                defmt::write!(fmt, "Serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_buffer_full_is_data_loss() {
        assert!(DeliveryError::BufferFull { capacity: 20 }.is_data_loss());
        assert!(!DeliveryError::InvalidTagId.is_data_loss());
        assert!(!DeliveryError::Serialization.is_data_loss());
    }

    #[cfg(feature = "std")]
    #[test]
    fn messages_carry_context() {
        let err = DeliveryError::TagIdTooLong { len: 32, max: 20 };
        assert_eq!(err.to_string(), "Tag id length 32 exceeds 20");

        let err = DeliveryError::BufferFull { capacity: 20 };
        assert_eq!(err.to_string(), "Offline buffer full (20 slots)");
    }
}
