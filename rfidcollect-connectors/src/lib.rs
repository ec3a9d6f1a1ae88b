//! Host-Side Collaborators for the RFIDCollect Delivery Core
//!
//! ## Overview
//!
//! `rfidcollect-core` never touches a network stack or a radio. It talks to
//! three narrow contracts (`Transport`, `NetworkStatus`, `TagReader`), and
//! this crate provides implementations of them for machines with an OS:
//! a gateway PC, a Raspberry Pi bridging a USB reader, or a test bench
//! replaying recorded reads.
//!
//! ### HTTP uplink (`http` feature)
//!
//! [`http::HttpUplink`] is one capability object implementing both
//! `Transport` and `NetworkStatus` over a blocking `ureq` agent:
//!
//! - Each session gets the configured deadline (connect + response)
//! - Any HTTP status, 2xx through 5xx, is reported as a received response
//! - Transport failures are reported with the negative codes the embedded
//!   HTTP client uses, so diagnostics read the same on both builds
//! - Availability is a shared flag ([`http::LinkHandle`]) flipped by
//!   whatever supervises the link, so the check never blocks
//!
//! ### Channel reader
//!
//! [`reader::ChannelTagReader`] turns raw identifiers arriving on an
//! `std::sync::mpsc` channel (a serial bridge thread, stdin, a replay file)
//! into `TagReader` polls.
//!
//! ## Resource Usage
//!
//! | Component        | Threads | Heap                          |
//! |------------------|---------|-------------------------------|
//! | HttpUplink       | 0       | agent pool + one request      |
//! | ChannelTagReader | 0       | channel queue (producer side) |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rfidcollect_connectors::http::{HttpConfig, HttpUplink};
//! use rfidcollect_core::{DeliveryConfig, DeliveryEngine};
//! use rfidcollect_core::diagnostics::LogSink;
//! use rfidcollect_core::time::{StdDelay, SystemClock};
//!
//! let http = HttpConfig::new("http://10.14.11.141:3000/api/data").timeout_ms(5_000);
//! let uplink = HttpUplink::new(http)?;
//! let link = uplink.link();
//!
//! let config = DeliveryConfig::new("http://10.14.11.141:3000/api/data")
//!     .map_err(|e| rfidcollect_connectors::ConnectorError::ConfigError(e.to_string()))?;
//! let mut engine: DeliveryEngine<_, _, _, _> =
//!     DeliveryEngine::new(config, uplink, SystemClock::deployment(), StdDelay, LogSink);
//!
//! // Link supervisor reports the network gone: sends go straight to the buffer
//! link.set_down();
//! engine.send("04A1B2C3", None).ok();
//! # Ok::<(), rfidcollect_connectors::ConnectorError>(())
//! ```

#[cfg(feature = "http")]
pub mod http;

pub mod reader;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpUplink, LinkHandle};
pub use reader::ChannelTagReader;

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    /// No network path, or the producer side of a channel hung up
    #[error("Not connected")]
    NotConnected,

    /// Peer sent something that is not a valid tag read
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Connection statistics kept by the HTTP uplink
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Requests that received a response (any status)
    pub messages_sent: u64,
    /// Requests that failed at the transport level
    pub messages_failed: u64,
    /// Request body bytes handed to the transport
    pub bytes_sent: u64,
    /// Last transport error message
    pub last_error: Option<String>,
}
