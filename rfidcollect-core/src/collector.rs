//! Collection Loop
//!
//! One cooperative task owns the reader, the deduplicator and the delivery
//! engine, and runs them in a fixed order on every poll:
//!
//! ```text
//! poll(now_ms)
//!   1. cooldown elapsed?  → forget last tag
//!   2. read               → WouldBlock / fault / tag
//!   3. dedup              → repeat? stop here
//!   4. send               → delivered / buffered / lost
//!   5. drain due?         → drain_offline()
//! ```
//!
//! Nothing overlaps, so neither the buffer nor the deduplicator needs a
//! lock. `now_ms` is a monotonic millisecond tick (time since boot); wall
//! clock time is only used for `CollectedAt`.

use crate::constants::{DEDUP_COOLDOWN_MS, DRAIN_INTERVAL_MS, OFFLINE_BUFFER_CAPACITY};
use crate::dedup::Deduplicator;
use crate::delivery::{Delivery, DeliveryEngine};
use crate::diagnostics::{DeliveryEvent, DiagnosticSink};
use crate::errors::DeliveryError;
use crate::observation::TagId;
use crate::traits::{Clock, Delay, NetworkStatus, TagReader, Transport};

/// Loop cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Minimum spacing between drains of the offline buffer
    pub drain_interval_ms: u64,
    /// Time after the last accepted tag before it may be accepted again
    pub dedup_cooldown_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            drain_interval_ms: DRAIN_INTERVAL_MS,
            dedup_cooldown_ms: DEDUP_COOLDOWN_MS,
        }
    }
}

impl CollectorConfig {
    /// Set the drain interval
    pub fn drain_interval_ms(mut self, ms: u64) -> Self {
        self.drain_interval_ms = ms;
        self
    }

    /// Set the dedup cooldown
    pub fn dedup_cooldown_ms(mut self, ms: u64) -> Self {
        self.dedup_cooldown_ms = ms;
        self
    }
}

/// What happened to the reader's output on one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// No card in the field
    Idle,
    /// Repeat of the last accepted tag
    Suppressed(TagId),
    /// New tag; the engine took responsibility for it
    Accepted(TagId, Delivery),
    /// New tag, but it could be neither delivered nor buffered
    Lost(TagId, DeliveryError),
    /// The reader faulted
    ReaderFault,
}

/// Result of one [`Collector::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    /// Reader outcome
    pub tag: TagOutcome,
    /// Buffered observations delivered by a drain on this poll
    pub drained: usize,
}

/// Reader → dedup → delivery, with periodic drains
pub struct Collector<R, U, C, D, K, const N: usize = OFFLINE_BUFFER_CAPACITY> {
    reader: R,
    dedup: Deduplicator,
    engine: DeliveryEngine<U, C, D, K, N>,
    config: CollectorConfig,
    last_accept_ms: Option<u64>,
    last_drain_ms: Option<u64>,
}

impl<R, U, C, D, K, const N: usize> Collector<R, U, C, D, K, N>
where
    R: TagReader,
    U: Transport + NetworkStatus,
    C: Clock,
    D: Delay,
    K: DiagnosticSink,
{
    /// Loop over `reader` delivering through `engine`
    pub fn new(reader: R, engine: DeliveryEngine<U, C, D, K, N>, config: CollectorConfig) -> Self {
        Self {
            reader,
            dedup: Deduplicator::new(),
            engine,
            config,
            last_accept_ms: None,
            last_drain_ms: None,
        }
    }

    /// Run one iteration of the loop at monotonic time `now_ms`
    pub fn poll(&mut self, now_ms: u64) -> PollReport {
        self.expire_dedup(now_ms);

        let tag = match self.reader.poll_tag() {
            Ok(tag) => self.handle_tag(tag, now_ms),
            Err(nb::Error::WouldBlock) => TagOutcome::Idle,
            Err(nb::Error::Other(_)) => {
                self.engine.sink_mut().record(DeliveryEvent::ReaderFault);
                TagOutcome::ReaderFault
            }
        };

        let drained = if self.drain_due(now_ms) {
            self.last_drain_ms = Some(now_ms);
            self.engine.drain_offline()
        } else {
            0
        };

        PollReport { tag, drained }
    }

    /// The delivery engine
    pub fn engine(&self) -> &DeliveryEngine<U, C, D, K, N> {
        &self.engine
    }

    /// Mutable access to the delivery engine
    pub fn engine_mut(&mut self) -> &mut DeliveryEngine<U, C, D, K, N> {
        &mut self.engine
    }

    /// The deduplicator
    pub fn dedup(&self) -> &Deduplicator {
        &self.dedup
    }

    fn handle_tag(&mut self, tag: TagId, now_ms: u64) -> TagOutcome {
        if !self.dedup.should_accept(&tag) {
            self.engine.sink_mut().record(DeliveryEvent::TagSuppressed { tag_id: tag.clone() });
            return TagOutcome::Suppressed(tag);
        }

        self.last_accept_ms = Some(now_ms);
        self.engine.sink_mut().record(DeliveryEvent::TagAccepted { tag_id: tag.clone() });

        match self.engine.send_tag(tag.clone()) {
            Ok(delivery) => TagOutcome::Accepted(tag, delivery),
            Err(err) => TagOutcome::Lost(tag, err),
        }
    }

    fn expire_dedup(&mut self, now_ms: u64) {
        let Some(accepted) = self.last_accept_ms else {
            return;
        };

        if now_ms.saturating_sub(accepted) >= self.config.dedup_cooldown_ms {
            self.dedup.reset();
            self.last_accept_ms = None;
            self.engine.sink_mut().record(DeliveryEvent::DedupReset);
        }
    }

    fn drain_due(&self, now_ms: u64) -> bool {
        if self.engine.pending() == 0 {
            return false;
        }

        match self.last_drain_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.drain_interval_ms,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadence_from_constants() {
        let config = CollectorConfig::default();
        assert_eq!(config.drain_interval_ms, DRAIN_INTERVAL_MS);
        assert_eq!(config.dedup_cooldown_ms, DEDUP_COOLDOWN_MS);

        let config = config.drain_interval_ms(5_000).dedup_cooldown_ms(10_000);
        assert_eq!(config.drain_interval_ms, 5_000);
        assert_eq!(config.dedup_cooldown_ms, 10_000);
    }
}
