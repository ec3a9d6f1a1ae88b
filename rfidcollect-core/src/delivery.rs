//! Delivery Engine: Retrying Upload with Offline Fallback
//!
//! ## Overview
//!
//! The engine takes responsibility for an observation and either delivers
//! it now or parks it in the offline buffer. Every accepted tag ends in one
//! of three states:
//!
//! ```text
//! send(tag)
//!    │
//!    ├─ network down ─────────────────────────────→ insert ─┬─ BufferedOk
//!    │                                                      └─ BufferedFull (lost)
//!    └─ Attempting(1) ─┬─ response (any status) ──→ Success
//!                      ├─ failure, k < max ──wait─→ Attempting(k+1)
//!                      └─ failure, k = max ──────→ insert ─┬─ BufferedOk
//!                                                          └─ BufferedFull (lost)
//! ```
//!
//! A session that fails to open is followed by the retry delay even on the
//! last attempt; a request without response is not.
//!
//! `drain_offline` walks the buffer in slot order with a single attempt per
//! observation and stops at the first failure, leaving the rest for the
//! next drain.
//!
//! ## Blocking
//!
//! Everything runs on the caller's context. A send that exhausts the
//! default policy blocks for up to three session deadlines and three retry
//! delays; there is no overall budget and no cancellation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rfidcollect_core::delivery::{DeliveryConfig, DeliveryEngine};
//! use rfidcollect_core::diagnostics::LogSink;
//! use rfidcollect_core::time::{StdDelay, SystemClock};
//!
//! let config = DeliveryConfig::new("http://10.14.11.141:3000/api/data")?;
//! let mut engine: DeliveryEngine<_, _, _, _> =
//!     DeliveryEngine::new(config, uplink, SystemClock::deployment(), StdDelay, LogSink);
//!
//! match engine.send("04A1B2C3", None) {
//!     Ok(delivery) if delivery.is_sent() => { /* done */ }
//!     Ok(_) => { /* buffered, drained later */ }
//!     Err(e) => { /* lost: buffer full */ }
//! }
//!
//! // Periodically, when the network is back
//! let freed = engine.drain_offline();
//! ```

use heapless::String;

use crate::buffer::OfflineBuffer;
use crate::constants::{MAX_COLLECTION_ID_LEN, MAX_ENDPOINT_LEN, OFFLINE_BUFFER_CAPACITY};
use crate::diagnostics::{DeliveryEvent, DiagnosticSink};
use crate::errors::{DeliveryError, DeliveryResult};
use crate::observation::{Observation, TagId};
use crate::retry::{AttemptOutcome, RetryPolicy, RetrySchedule, Step};
use crate::time::{self, Timestamp};
use crate::traits::{Clock, Delay, NetworkStatus, ResponseCode, Session, Transport};

/// Content type of every collection POST
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Where and how to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    endpoint: String<MAX_ENDPOINT_LEN>,
    collection_id: Option<String<MAX_COLLECTION_ID_LEN>>,
    retry: RetryPolicy,
}

impl DeliveryConfig {
    /// Configuration for `endpoint` with the default retry policy
    pub fn new(endpoint: &str) -> DeliveryResult<Self> {
        let mut url = String::new();
        url.push_str(endpoint).map_err(|_| DeliveryError::EndpointTooLong {
            len: endpoint.len(),
            max: MAX_ENDPOINT_LEN,
        })?;

        Ok(Self {
            endpoint: url,
            collection_id: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Add the collection-session identifier to every payload
    pub fn with_collection_id(mut self, id: &str) -> DeliveryResult<Self> {
        let mut value = String::new();
        value.push_str(id).map_err(|_| DeliveryError::CollectionIdTooLong {
            len: id.len(),
            max: MAX_COLLECTION_ID_LEN,
        })?;
        self.collection_id = Some(value);
        Ok(self)
    }

    /// Replace the retry policy for first-time sends
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Set the attempt budget for first-time sends
    pub fn max_retries(mut self, attempts: u8) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    /// Set the delay between attempts
    pub fn retry_delay_ms(mut self, ms: u32) -> Self {
        self.retry.delay_ms = ms;
        self
    }

    /// Collection endpoint URL
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Collection-session identifier, if configured
    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    /// Retry policy for first-time sends
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

/// How the engine took responsibility for an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The server answered
    Sent {
        /// Attempts used, including the successful one
        attempts: u8,
        /// Response code received
        code: ResponseCode,
    },
    /// Parked in the offline buffer for a later drain
    Buffered {
        /// Slot holding the observation
        slot: usize,
        /// Observations buffered after this insert
        pending: usize,
    },
}

impl Delivery {
    /// True if the payload reached the server
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Running totals kept by the engine
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Transport attempts made (first-time sends and drains)
    pub attempts: u32,
    /// Observations delivered on first-time send
    pub delivered: u32,
    /// Observations parked in the offline buffer
    pub buffered: u32,
    /// Observations lost to a full buffer
    pub dropped: u32,
    /// Buffered observations delivered by drains
    pub drained: u32,
}

/// Retrying sender with an `N`-slot offline buffer
///
/// `U` is the capability object for the network (both [`Transport`] and
/// [`NetworkStatus`]), `C` the wall clock, `D` the retry delay and `K` the
/// diagnostic sink.
pub struct DeliveryEngine<U, C, D, K, const N: usize = OFFLINE_BUFFER_CAPACITY> {
    config: DeliveryConfig,
    uplink: U,
    clock: C,
    delay: D,
    sink: K,
    buffer: OfflineBuffer<N>,
    stats: DeliveryStats,
}

impl<U, C, D, K, const N: usize> DeliveryEngine<U, C, D, K, N>
where
    U: Transport + NetworkStatus,
    C: Clock,
    D: Delay,
    K: DiagnosticSink,
{
    /// Engine with an empty offline buffer
    pub fn new(config: DeliveryConfig, uplink: U, clock: C, delay: D, sink: K) -> Self {
        Self {
            config,
            uplink,
            clock,
            delay,
            sink,
            buffer: OfflineBuffer::new(),
            stats: DeliveryStats::default(),
        }
    }

    /// Deliver one observation, or buffer it
    ///
    /// `timestamp` is used as `CollectedAt` when given; otherwise the clock
    /// is read once before the first attempt. Returns
    /// [`DeliveryError::BufferFull`] only when the observation could be
    /// neither delivered nor buffered.
    pub fn send(&mut self, tag_id: &str, timestamp: Option<&str>) -> DeliveryResult<Delivery> {
        let tag = TagId::new(tag_id)?;
        let stamp = timestamp.map(time::timestamp).transpose()?;
        let policy = self.config.retry;
        self.send_with(tag, stamp, policy)
    }

    /// Deliver a freshly read tag stamped with the current time
    pub fn send_tag(&mut self, tag: TagId) -> DeliveryResult<Delivery> {
        let policy = self.config.retry;
        self.send_with(tag, None, policy)
    }

    /// Deliver with an explicit stamp and retry policy
    pub fn send_with(
        &mut self,
        tag: TagId,
        stamp: Option<Timestamp>,
        policy: RetryPolicy,
    ) -> DeliveryResult<Delivery> {
        if !self.uplink.is_connected() {
            self.sink.record(DeliveryEvent::NetworkDown { tag_id: tag.clone() });
            return self.park(tag, stamp);
        }

        // Stamp before the attempt loop; the same stamp is buffered on failure
        let stamp = stamp.or_else(|| self.clock.formatted_time());
        let observation = Observation::new(tag, stamp.clone().unwrap_or_else(time::unsynced));
        let body = observation
            .payload(self.config.collection_id())
            .to_json()?;

        let sent = self.courier().deliver(observation.tag_id(), &body, policy);
        if let Some(delivery) = sent {
            self.stats.delivered += 1;
            return Ok(delivery);
        }

        let (tag, _) = observation.into_parts();
        self.park(tag, stamp)
    }

    /// Deliver buffered observations until the first failure
    ///
    /// One attempt per observation, no retry delay. Returns the number of
    /// observations delivered; 0 immediately when the network is down.
    pub fn drain_offline(&mut self) -> usize {
        if !self.uplink.is_connected() || self.buffer.is_empty() {
            return 0;
        }

        let Self { config, uplink, delay, sink, buffer, stats, .. } = self;
        let mut courier = Courier {
            uplink,
            delay,
            sink,
            stats,
            endpoint: config.endpoint(),
        };
        let collection_id = config.collection_id();

        let freed = buffer.drain_all(|observation| {
            match observation.payload(collection_id).to_json() {
                Ok(body) => courier
                    .deliver(observation.tag_id(), &body, RetryPolicy::single())
                    .is_some(),
                Err(_) => false,
            }
        });

        self.stats.drained += freed as u32;
        self.sink.record(DeliveryEvent::Drained {
            freed,
            pending: self.buffer.count(),
        });
        freed
    }

    /// Observations waiting in the offline buffer
    pub fn pending(&self) -> usize {
        self.buffer.count()
    }

    /// The offline buffer
    pub fn buffer(&self) -> &OfflineBuffer<N> {
        &self.buffer
    }

    /// Running totals
    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// The network capability object
    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    /// Mutable access to the network capability object
    pub fn uplink_mut(&mut self) -> &mut U {
        &mut self.uplink
    }

    /// The retry delay
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// The diagnostic sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Mutable access to the diagnostic sink
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    fn courier(&mut self) -> Courier<'_, U, D, K> {
        Courier {
            uplink: &mut self.uplink,
            delay: &mut self.delay,
            sink: &mut self.sink,
            stats: &mut self.stats,
            endpoint: self.config.endpoint.as_str(),
        }
    }

    /// Move an observation into the offline buffer
    ///
    /// An observation that was never stamped is stamped now, or with the
    /// unsynced placeholder when the clock is still unavailable.
    fn park(&mut self, tag: TagId, stamp: Option<Timestamp>) -> DeliveryResult<Delivery> {
        let stamp = stamp
            .or_else(|| self.clock.formatted_time())
            .unwrap_or_else(time::unsynced);

        match self.buffer.insert(Observation::new(tag.clone(), stamp)) {
            Ok(slot) => {
                let pending = self.buffer.count();
                self.stats.buffered += 1;
                self.sink.record(DeliveryEvent::Buffered { tag_id: tag, slot, pending });
                Ok(Delivery::Buffered { slot, pending })
            }
            Err(err) => {
                self.stats.dropped += 1;
                self.sink.record(DeliveryEvent::BufferFull { tag_id: tag, capacity: N });
                Err(err)
            }
        }
    }
}

/// Borrowed view of the engine used for the attempt loop
///
/// Split out so drains can hold the buffer and the transport at once.
struct Courier<'e, U, D, K> {
    uplink: &'e mut U,
    delay: &'e mut D,
    sink: &'e mut K,
    stats: &'e mut DeliveryStats,
    endpoint: &'e str,
}

impl<U, D, K> Courier<'_, U, D, K>
where
    U: Transport,
    D: Delay,
    K: DiagnosticSink,
{
    /// Run the attempt loop for one body; `None` means exhausted
    fn deliver(&mut self, tag: &TagId, body: &[u8], policy: RetryPolicy) -> Option<Delivery> {
        let mut schedule = RetrySchedule::new(policy);

        while let Some(attempt) = schedule.begin_attempt() {
            self.stats.attempts += 1;
            self.sink.record(DeliveryEvent::AttemptStarted {
                tag_id: tag.clone(),
                attempt,
                max_attempts: policy.max_attempts,
            });

            let outcome = self.attempt(attempt, body);

            match schedule.record(outcome) {
                Step::Delivered(code) => {
                    self.sink.record(DeliveryEvent::Delivered {
                        tag_id: tag.clone(),
                        attempt,
                        code,
                    });
                    return Some(Delivery::Sent { attempts: attempt, code });
                }
                Step::Retry { after_ms } => {
                    self.sink.record(DeliveryEvent::RetryScheduled { attempt, delay_ms: after_ms });
                    self.delay.delay_ms(after_ms);
                }
                Step::ExhaustedAfter { after_ms } => {
                    self.delay.delay_ms(after_ms);
                    break;
                }
                Step::Exhausted => break,
            }
        }

        self.sink.record(DeliveryEvent::Exhausted {
            tag_id: tag.clone(),
            attempts: schedule.attempts(),
        });
        None
    }

    /// One session: open, POST, close
    fn attempt(&mut self, attempt: u8, body: &[u8]) -> AttemptOutcome {
        let mut session = match self.uplink.begin_session(self.endpoint) {
            Ok(session) => session,
            Err(_) => {
                self.sink.record(DeliveryEvent::SessionFailed { attempt });
                return AttemptOutcome::SessionFailed;
            }
        };

        session.add_header("Content-Type", CONTENT_TYPE_JSON);
        let code = session.post(body);
        session.end();

        if code.is_received() {
            AttemptOutcome::Response(code)
        } else {
            self.sink.record(DeliveryEvent::NoResponse { attempt, code });
            AttemptOutcome::NoResponse(code)
        }
    }
}
