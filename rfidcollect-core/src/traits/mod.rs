//! Collaborator Contracts for the Delivery Core
//!
//! Everything the core does not own (radio, WiFi, HTTP client, wall clock)
//! is reached through one of these traits. Implementations live in the
//! firmware or in `rfidcollect-connectors`; tests use scripted fakes.
//!
//! ## Module Organization
//!
//! - [`transport`] - HTTP sessions, response codes, network availability
//! - [`time`] - Wall clock and blocking delay
//! - [`sensing`] - Tag reader polling

pub mod sensing;
pub mod time;
pub mod transport;

pub use sensing::TagReader;
pub use time::{Clock, Delay};
pub use transport::{NetworkStatus, ResponseCode, Session, Transport};
