//! Transport and Network-Availability Contracts
//!
//! The engine never touches the WiFi stack or an HTTP client directly. It
//! talks to one injected capability object that implements both
//! [`Transport`] and [`NetworkStatus`], which is what makes the retry and
//! buffering logic testable with a scripted fake.
//!
//! ## Session Lifecycle
//!
//! ```text
//! begin_session(url) ──fail──→ (attempt consumed, retry)
//!        │
//!        ↓ ok
//! add_header("Content-Type", "application/json")
//!        ↓
//! post(body) → ResponseCode
//!        ↓
//! end()            ← always called, whatever post returned
//! ```
//!
//! ## Response Codes
//!
//! A [`ResponseCode`] greater than zero means a response was received from
//! the server, whatever its HTTP class. Zero or negative means the request
//! never produced a response (refused, lost, timed out). The negative
//! constants follow the codes reported by embedded HTTP clients so that
//! firmware transports can pass them through unchanged.

use core::fmt;

/// Outcome of one POST
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseCode(pub i32);

impl ResponseCode {
    /// Server refused the TCP connection
    pub const CONNECTION_REFUSED: Self = Self(-1);
    /// Request line or headers could not be written
    pub const SEND_HEADER_FAILED: Self = Self(-2);
    /// Body could not be written
    pub const SEND_PAYLOAD_FAILED: Self = Self(-3);
    /// No network path when the request was issued
    pub const NOT_CONNECTED: Self = Self(-4);
    /// Connection dropped mid-request
    pub const CONNECTION_LOST: Self = Self(-5);
    /// No stream available
    pub const NO_STREAM: Self = Self(-6);
    /// Peer did not speak HTTP
    pub const NO_HTTP_SERVER: Self = Self(-7);
    /// Not enough memory for the request
    pub const TOO_LESS_RAM: Self = Self(-8);
    /// Unsupported transfer encoding
    pub const ENCODING: Self = Self(-9);
    /// Writing the response stream failed
    pub const STREAM_WRITE: Self = Self(-10);
    /// No response within the session deadline
    pub const READ_TIMEOUT: Self = Self(-11);

    /// True when the server answered (any HTTP status)
    pub const fn is_received(self) -> bool {
        self.0 > 0
    }

    /// HTTP status if a response was received
    pub fn status(self) -> Option<u16> {
        if self.is_received() {
            u16::try_from(self.0).ok()
        } else {
            None
        }
    }

    /// Short human-readable description
    pub const fn describe(self) -> &'static str {
        match self.0 {
            -1 => "connection refused",
            -2 => "send header failed",
            -3 => "send payload failed",
            -4 => "not connected",
            -5 => "connection lost",
            -6 => "no stream",
            -7 => "no HTTP server",
            -8 => "too less ram",
            -9 => "transfer encoding error",
            -10 => "stream write error",
            -11 => "read timeout",
            code if code > 0 => "response received",
            _ => "unknown transport error",
        }
    }
}

impl From<u16> for ResponseCode {
    fn from(status: u16) -> Self {
        Self(i32::from(status))
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_received() {
            write!(f, "HTTP {}", self.0)
        } else {
            write!(f, "{} ({})", self.describe(), self.0)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ResponseCode {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} ({=str})", self.0, self.describe())
    }
}

/// One open HTTP connection: headers, a single POST, then close
pub trait Session {
    /// Add a request header
    fn add_header(&mut self, name: &str, value: &str);

    /// Issue the POST with `body`
    fn post(&mut self, body: &[u8]) -> ResponseCode;

    /// Release the session
    fn end(self);
}

/// Opens transport sessions to the collection endpoint
pub trait Transport {
    /// Session type borrowed from the transport
    type Session<'a>: Session
    where
        Self: 'a;

    /// Why a session could not be opened
    type Error: fmt::Debug;

    /// Open a session to `endpoint`
    fn begin_session(&mut self, endpoint: &str) -> Result<Self::Session<'_>, Self::Error>;
}

/// Cheap, non-blocking network availability check
pub trait NetworkStatus {
    /// True if a network path is currently up
    fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_http_status_counts_as_received() {
        assert!(ResponseCode(200).is_received());
        assert!(ResponseCode(404).is_received());
        assert!(ResponseCode(503).is_received());
        assert!(!ResponseCode(0).is_received());
        assert!(!ResponseCode::READ_TIMEOUT.is_received());
    }

    #[test]
    fn status_only_for_received() {
        assert_eq!(ResponseCode::from(201).status(), Some(201));
        assert_eq!(ResponseCode::CONNECTION_LOST.status(), None);
    }

    #[test]
    fn describes_transport_codes() {
        assert_eq!(ResponseCode::CONNECTION_REFUSED.describe(), "connection refused");
        assert_eq!(ResponseCode::READ_TIMEOUT.describe(), "read timeout");
        assert_eq!(ResponseCode(-42).describe(), "unknown transport error");
    }
}
