//! HTTP Uplink for the Delivery Engine
//!
//! ## Overview
//!
//! Implements the core's `Transport` and `NetworkStatus` contracts with a
//! blocking `ureq` agent. One session is one POST:
//!
//! ```text
//! begin_session(url)   link down?  → Err(NotConnected)
//!                      bad scheme? → Err(ConfigError)
//!       ↓
//! add_header(..)       collected, applied at post time
//!       ↓
//! post(body)           2xx..5xx      → ResponseCode(status)
//!                      refused / DNS → CONNECTION_REFUSED
//!                      timed out     → READ_TIMEOUT
//!                      dropped       → CONNECTION_LOST
//!                      not HTTP      → NO_HTTP_SERVER
//!       ↓
//! end()                connection goes back to the agent's pool
//! ```
//!
//! ## Design Decisions
//!
//! ### No retries here
//!
//! The delivery engine owns the retry schedule. This uplink makes exactly
//! one request per session and reports what happened, so attempt counts in
//! diagnostics match what went over the wire.
//!
//! ### Status classes are not interpreted
//!
//! `ureq` turns 4xx/5xx into `Error::Status`. Those still mean the server
//! answered, so they are reported as positive response codes like 2xx.
//!
//! ### Availability is a flag
//!
//! `is_connected` must be cheap and non-blocking. The uplink reads a shared
//! [`LinkHandle`]; a supervisor (NetworkManager hook, ping thread, test)
//! flips it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rfidcollect_connectors::http::{HttpConfig, HttpUplink};
//!
//! let config = HttpConfig::new("http://10.14.11.141:3000/api/data")
//!     .timeout_ms(5_000)
//!     .header("X-Unit", "truck-07");
//!
//! let uplink = HttpUplink::new(config)?;
//! let link = uplink.link();
//! std::thread::spawn(move || {
//!     // ... watch the interface, call link.set_down() / link.set_up()
//!     # let _ = link;
//! });
//! # Ok::<(), rfidcollect_connectors::ConnectorError>(())
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rfidcollect_core::constants::SESSION_TIMEOUT_MS;
use rfidcollect_core::traits::{NetworkStatus, ResponseCode, Session, Transport};

use crate::{ConnectionStats, ConnectorError};

/// Environment variable holding the collection endpoint
pub const ENV_ENDPOINT: &str = "RFIDCOLLECT_ENDPOINT";

/// Environment variable holding the per-session timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "RFIDCOLLECT_TIMEOUT_MS";

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Collection endpoint URL
    pub endpoint: String,
    /// Connect + response deadline for one session
    pub timeout: Duration,
    /// Custom headers sent with every request
    pub headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create new configuration for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(u64::from(SESSION_TIMEOUT_MS)),
            headers: HashMap::new(),
            user_agent: format!("RFIDCollect/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Configuration from `RFIDCOLLECT_ENDPOINT` and optional
    /// `RFIDCOLLECT_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, ConnectorError> {
        let endpoint = std::env::var(ENV_ENDPOINT)
            .map_err(|_| ConnectorError::ConfigError(format!("{} is not set", ENV_ENDPOINT)))?;

        let mut config = Self::new(endpoint);
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                ConnectorError::ConfigError(format!("{} must be milliseconds, got {:?}", ENV_TIMEOUT_MS, raw))
            })?;
            config = config.timeout_ms(ms);
        }

        Ok(config)
    }

    /// Set the session deadline in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

fn validate_url(url: &str) -> Result<(), ConnectorError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConnectorError::ConfigError(format!(
            "Endpoint must start with http:// or https://, got {:?}",
            url
        )))
    }
}

/// Shared network-availability flag
#[derive(Debug, Clone)]
pub struct LinkHandle(Arc<AtomicBool>);

impl LinkHandle {
    /// New handle in the given state
    pub fn new(up: bool) -> Self {
        Self(Arc::new(AtomicBool::new(up)))
    }

    /// Mark the network available
    pub fn set_up(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Mark the network unavailable
    pub fn set_down(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Current state
    pub fn is_up(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for LinkHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Blocking HTTP uplink using the lightweight ureq client
pub struct HttpUplink {
    config: HttpConfig,
    agent: ureq::Agent,
    link: LinkHandle,
    stats: ConnectionStats,
}

impl HttpUplink {
    /// Create new uplink; the link starts up
    pub fn new(config: HttpConfig) -> Result<Self, ConnectorError> {
        Self::with_link(config, LinkHandle::default())
    }

    /// Create new uplink sharing an existing availability flag
    pub fn with_link(config: HttpConfig, link: LinkHandle) -> Result<Self, ConnectorError> {
        validate_url(&config.endpoint)?;

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            link,
            stats: ConnectionStats::default(),
        })
    }

    /// Handle for flipping network availability
    pub fn link(&self) -> LinkHandle {
        self.link.clone()
    }

    /// Active configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Request statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}

/// One POST over the uplink's agent
pub struct HttpSession<'a> {
    agent: &'a ureq::Agent,
    defaults: &'a HashMap<String, String>,
    stats: &'a mut ConnectionStats,
    endpoint: String,
    headers: Vec<(String, String)>,
}

impl Session for HttpSession<'_> {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn post(&mut self, body: &[u8]) -> ResponseCode {
        let mut request = self.agent.post(&self.endpoint);
        for (name, value) in self.defaults.iter() {
            request = request.set(name, value);
        }
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }

        self.stats.bytes_sent += body.len() as u64;

        let code = match request.send_bytes(body) {
            Ok(response) => ResponseCode::from(response.status()),
            Err(ureq::Error::Status(status, _)) => ResponseCode::from(status),
            Err(ureq::Error::Transport(transport)) => {
                self.stats.last_error = Some(transport.to_string());
                transport_code(&transport)
            }
        };

        if code.is_received() {
            self.stats.messages_sent += 1;
        } else {
            self.stats.messages_failed += 1;
        }
        code
    }

    fn end(self) {}
}

impl Transport for HttpUplink {
    type Session<'a> = HttpSession<'a>;
    type Error = ConnectorError;

    fn begin_session(&mut self, endpoint: &str) -> Result<Self::Session<'_>, Self::Error> {
        if !self.link.is_up() {
            return Err(ConnectorError::NotConnected);
        }
        validate_url(endpoint)?;

        Ok(HttpSession {
            agent: &self.agent,
            defaults: &self.config.headers,
            stats: &mut self.stats,
            endpoint: endpoint.to_string(),
            headers: Vec::new(),
        })
    }
}

impl NetworkStatus for HttpUplink {
    fn is_connected(&self) -> bool {
        self.link.is_up()
    }
}

/// Map a transport failure to the embedded client's negative codes
fn transport_code(transport: &ureq::Transport) -> ResponseCode {
    let timed_out = std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .map(|io| matches!(io.kind(), std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock))
        .unwrap_or(false);

    kind_code(transport.kind(), timed_out)
}

fn kind_code(kind: ureq::ErrorKind, timed_out: bool) -> ResponseCode {
    use ureq::ErrorKind;

    match kind {
        _ if timed_out => ResponseCode::READ_TIMEOUT,
        ErrorKind::Dns | ErrorKind::ConnectionFailed | ErrorKind::ProxyConnect => {
            ResponseCode::CONNECTION_REFUSED
        }
        ErrorKind::BadStatus | ErrorKind::BadHeader => ResponseCode::NO_HTTP_SERVER,
        ErrorKind::Io => ResponseCode::CONNECTION_LOST,
        _ => ResponseCode::SEND_HEADER_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpConfig::new("https://collector.example.com/api/data")
            .timeout_ms(2_500)
            .user_agent("bench/1")
            .header("X-Unit", "truck-07");

        assert_eq!(config.endpoint, "https://collector.example.com/api/data");
        assert_eq!(config.timeout, Duration::from_millis(2_500));
        assert_eq!(config.user_agent, "bench/1");
        assert_eq!(config.headers.get("X-Unit").map(String::as_str), Some("truck-07"));
    }

    #[test]
    fn test_default_timeout_is_session_deadline() {
        let config = HttpConfig::new("http://10.14.11.141:3000/api/data");
        assert_eq!(config.timeout, Duration::from_millis(u64::from(SESSION_TIMEOUT_MS)));
        assert!(config.user_agent.starts_with("RFIDCollect/"));
    }

    #[test]
    fn test_url_validation() {
        let result = HttpUplink::new(HttpConfig::new("not-a-url"));
        assert!(matches!(result, Err(ConnectorError::ConfigError(_))));

        let result = HttpUplink::new(HttpConfig::new("https://valid.url/api"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_link_gates_sessions() {
        let mut uplink = HttpUplink::new(HttpConfig::new("http://127.0.0.1:9/api")).unwrap();
        let link = uplink.link();
        assert!(uplink.is_connected());

        link.set_down();
        assert!(!uplink.is_connected());
        assert!(matches!(
            uplink.begin_session("http://127.0.0.1:9/api"),
            Err(ConnectorError::NotConnected)
        ));

        link.set_up();
        assert!(uplink.begin_session("http://127.0.0.1:9/api").is_ok());
        assert!(matches!(
            uplink.begin_session("ftp://127.0.0.1/api"),
            Err(ConnectorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_transport_kinds_map_to_negative_codes() {
        use ureq::ErrorKind;

        assert_eq!(kind_code(ErrorKind::ConnectionFailed, false), ResponseCode::CONNECTION_REFUSED);
        assert_eq!(kind_code(ErrorKind::Dns, false), ResponseCode::CONNECTION_REFUSED);
        assert_eq!(kind_code(ErrorKind::Io, false), ResponseCode::CONNECTION_LOST);
        assert_eq!(kind_code(ErrorKind::Io, true), ResponseCode::READ_TIMEOUT);
        assert_eq!(kind_code(ErrorKind::BadStatus, false), ResponseCode::NO_HTTP_SERVER);

        for kind in [ErrorKind::ConnectionFailed, ErrorKind::Io, ErrorKind::InvalidUrl] {
            assert!(!kind_code(kind, false).is_received());
        }
    }
}
