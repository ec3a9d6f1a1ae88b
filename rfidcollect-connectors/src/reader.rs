//! Channel-Fed Tag Reader
//!
//! Adapts raw identifiers produced on another thread (serial bridge, stdin,
//! replay file) to the core's pull-based `TagReader` contract. Each poll
//! takes at most one line off the channel and never blocks.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use rfidcollect_core::observation::TagId;
use rfidcollect_core::traits::TagReader;

use crate::ConnectorError;

/// `TagReader` over an `mpsc` receiver of raw identifiers
///
/// Surrounding whitespace is trimmed and blank lines are skipped, so a
/// line-oriented source can be forwarded as is.
#[derive(Debug)]
pub struct ChannelTagReader {
    rx: Receiver<String>,
}

impl ChannelTagReader {
    /// Reader plus the sender to feed it
    pub fn channel() -> (Sender<String>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Reader over an existing receiver
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl TagReader for ChannelTagReader {
    type Error = ConnectorError;

    fn poll_tag(&mut self) -> nb::Result<TagId, Self::Error> {
        loop {
            let raw = match self.rx.try_recv() {
                Ok(raw) => raw,
                Err(TryRecvError::Empty) => return Err(nb::Error::WouldBlock),
                Err(TryRecvError::Disconnected) => {
                    return Err(nb::Error::Other(ConnectorError::NotConnected))
                }
            };

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            return TagId::new(trimmed).map_err(|e| {
                nb::Error::Other(ConnectorError::ProtocolError(format!("{:?}: {}", trimmed, e)))
            });
        }
    }
}
