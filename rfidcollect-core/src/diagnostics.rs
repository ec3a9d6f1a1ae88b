//! Diagnostic Events and Sinks
//!
//! The delivery engine and the collection loop never print. Each notable
//! step is emitted as a [`DeliveryEvent`] into an injected
//! [`DiagnosticSink`], which decides what to do with it:
//!
//! - [`NullSink`] drops everything (production builds without a console)
//! - [`LogSink`] forwards to the `log` facade (std builds)
//! - [`MemorySink`] keeps events for assertions in tests
//!
//! On `defmt` targets, events implement `defmt::Format` so a firmware sink
//! can forward them with `defmt::info!("{}", event)`.

use alloc::vec::Vec;
use core::fmt;

use crate::observation::TagId;
use crate::traits::ResponseCode;

/// Something the delivery path wants to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    /// No network path; the observation goes straight to the buffer
    NetworkDown {
        /// Tag being delivered
        tag_id: TagId,
    },
    /// A delivery attempt is starting
    AttemptStarted {
        /// Tag being delivered
        tag_id: TagId,
        /// 1-based attempt number
        attempt: u8,
        /// Attempts allowed by the policy
        max_attempts: u8,
    },
    /// A transport session could not be opened
    SessionFailed {
        /// Attempt that failed
        attempt: u8,
    },
    /// The request produced no response
    NoResponse {
        /// Attempt that failed
        attempt: u8,
        /// Negative client code
        code: ResponseCode,
    },
    /// The server answered (any status)
    Delivered {
        /// Tag delivered
        tag_id: TagId,
        /// Attempt that got through
        attempt: u8,
        /// Response code received
        code: ResponseCode,
    },
    /// Waiting before the next attempt
    RetryScheduled {
        /// Attempt that just failed
        attempt: u8,
        /// Wait in milliseconds
        delay_ms: u32,
    },
    /// Every attempt failed
    Exhausted {
        /// Tag that could not be delivered
        tag_id: TagId,
        /// Attempts made
        attempts: u8,
    },
    /// Observation parked in the offline buffer
    Buffered {
        /// Tag parked
        tag_id: TagId,
        /// Slot holding it
        slot: usize,
        /// Observations buffered after this insert
        pending: usize,
    },
    /// Offline buffer full; observation lost
    BufferFull {
        /// Tag lost
        tag_id: TagId,
        /// Buffer capacity
        capacity: usize,
    },
    /// A drain finished
    Drained {
        /// Observations delivered by this drain
        freed: usize,
        /// Observations still buffered
        pending: usize,
    },
    /// The reader produced a tag accepted as new
    TagAccepted {
        /// Accepted tag
        tag_id: TagId,
    },
    /// The reader repeated the last accepted tag
    TagSuppressed {
        /// Repeated tag
        tag_id: TagId,
    },
    /// Cooldown elapsed; the last accepted tag was forgotten
    DedupReset,
    /// The reader reported a fault
    ReaderFault,
}

/// Severity of a [`DeliveryEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Step-by-step detail
    Debug,
    /// Normal progress
    Info,
    /// Degraded but handled
    Warn,
    /// Data lost
    Error,
}

impl DeliveryEvent {
    /// How loud this event should be
    pub fn severity(&self) -> Severity {
        match self {
            Self::AttemptStarted { .. }
            | Self::RetryScheduled { .. }
            | Self::TagSuppressed { .. }
            | Self::DedupReset => Severity::Debug,
            Self::Delivered { .. }
            | Self::Buffered { .. }
            | Self::Drained { .. }
            | Self::TagAccepted { .. } => Severity::Info,
            Self::NetworkDown { .. }
            | Self::SessionFailed { .. }
            | Self::NoResponse { .. }
            | Self::Exhausted { .. }
            | Self::ReaderFault => Severity::Warn,
            Self::BufferFull { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for DeliveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkDown { tag_id } =>
                write!(f, "network down, buffering {}", tag_id),
            Self::AttemptStarted { tag_id, attempt, max_attempts } =>
                write!(f, "attempt {}/{} for {}", attempt, max_attempts, tag_id),
            Self::SessionFailed { attempt } =>
                write!(f, "attempt {}: could not open session", attempt),
            Self::NoResponse { attempt, code } =>
                write!(f, "attempt {}: {}", attempt, code),
            Self::Delivered { tag_id, attempt, code } =>
                write!(f, "delivered {} on attempt {} ({})", tag_id, attempt, code),
            Self::RetryScheduled { attempt, delay_ms } =>
                write!(f, "retrying after attempt {} in {} ms", attempt, delay_ms),
            Self::Exhausted { tag_id, attempts } =>
                write!(f, "gave up on {} after {} attempts", tag_id, attempts),
            Self::Buffered { tag_id, slot, pending } =>
                write!(f, "buffered {} in slot {} ({} pending)", tag_id, slot, pending),
            Self::BufferFull { tag_id, capacity } =>
                write!(f, "buffer full ({} slots), dropped {}", capacity, tag_id),
            Self::Drained { freed, pending } =>
                write!(f, "drained {} ({} pending)", freed, pending),
            Self::TagAccepted { tag_id } =>
                write!(f, "tag {}", tag_id),
            Self::TagSuppressed { tag_id } =>
                write!(f, "repeat of {} suppressed", tag_id),
            Self::DedupReset =>
                f.write_str("dedup cooldown elapsed"),
            Self::ReaderFault =>
                f.write_str("reader fault"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeliveryEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NetworkDown { tag_id } =>
                defmt::write!(fmt, "network down, buffering {}", tag_id),
            Self::AttemptStarted { tag_id, attempt, max_attempts } =>
                defmt::write!(fmt, "attempt {}/{} for {}", attempt, max_attempts, tag_id),
            Self::SessionFailed { attempt } =>
                defmt::write!(fmt, "attempt {}: no session", attempt),
            Self::NoResponse { attempt, code } =>
                defmt::write!(fmt, "attempt {}: {}", attempt, code),
            Self::Delivered { tag_id, attempt, code } =>
                defmt::write!(fmt, "delivered {} on attempt {} ({})", tag_id, attempt, code),
            Self::RetryScheduled { attempt, delay_ms } =>
                defmt::write!(fmt, "retry after {} in {} ms", attempt, delay_ms),
            Self::Exhausted { tag_id, attempts } =>
                defmt::write!(fmt, "gave up on {} after {}", tag_id, attempts),
            Self::Buffered { tag_id, slot, pending } =>
                defmt::write!(fmt, "buffered {} slot {} ({} pending)", tag_id, slot, pending),
            Self::BufferFull { tag_id, capacity } =>
                defmt::write!(fmt, "buffer full ({}), dropped {}", capacity, tag_id),
            Self::Drained { freed, pending } =>
                defmt::write!(fmt, "drained {} ({} pending)", freed, pending),
            Self::TagAccepted { tag_id } =>
                defmt::write!(fmt, "tag {}", tag_id),
            Self::TagSuppressed { tag_id } =>
                defmt::write!(fmt, "repeat {}", tag_id),
            Self::DedupReset =>
                defmt::write!(fmt, "dedup reset"),
            Self::ReaderFault =>
                defmt::write!(fmt, "reader fault"),
        }
    }
}

/// Receiver for diagnostic events
pub trait DiagnosticSink {
    /// Handle one event
    fn record(&mut self, event: DeliveryEvent);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn record(&mut self, event: DeliveryEvent) {
        (**self).record(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: DeliveryEvent) {}
}

/// Forwards events to the `log` facade under the `rfidcollect` target
#[cfg(feature = "log")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[cfg(feature = "log")]
impl DiagnosticSink for LogSink {
    fn record(&mut self, event: DeliveryEvent) {
        let level = match event.severity() {
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        };
        log::log!(target: "rfidcollect", level, "{}", event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Vec<DeliveryEvent>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first
    pub fn events(&self) -> &[DeliveryEvent] {
        &self.events
    }

    /// Number of events matching `predicate`
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DeliveryEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    /// Forget recorded events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, event: DeliveryEvent) {
        self.events.push(event);
    }
}
