//! Fixed-Slot Offline Buffer for Undelivered Observations
//!
//! ## Overview
//!
//! When the network is down, or every delivery attempt fails, the engine
//! parks the observation here until a later drain can deliver it. The
//! buffer is an arena of `N` slots fixed at compile time through const
//! generics; nothing is allocated after construction.
//!
//! ## Design Rationale
//!
//! ### Why Reject Instead of Overwrite?
//!
//! A sensor history buffer can drop its oldest reading without harm. A
//! collection record cannot: each one is a billed bin pickup. When the
//! buffer is full a new observation is refused and the caller is told, so
//! the loss is visible (indicator light) instead of silently replacing an
//! older record.
//!
//! ### Why Slots Instead of a Queue?
//!
//! A drained slot becomes free immediately, wherever it sits. Insertion
//! takes the first free slot, so after partial drains the slot order no
//! longer matches collection order:
//!
//! ```text
//! insert A, B, C        [A][B][C][ ][ ]
//! drain frees A, halts  [ ][B][C][ ][ ]
//! insert D              [D][B][C][ ][ ]   ← D drains before B
//! ```
//!
//! Drains walk slots by index. Delivery order of buffered observations is
//! therefore not chronological; the server orders by `CollectedAt`.
//!
//! ### Memory Layout
//!
//! ```text
//! OfflineBuffer<20>:
//! ├── slots: 20 × Option<Observation> (~56 bytes each)
//! └── count: usize
//! Total: ~1.1 KB
//! ```
//!
//! ## Thread Safety
//!
//! No internal locking. The collection loop owns the buffer; a firmware
//! that inserts from an interrupt and drains from a task must wrap it in a
//! critical section or mutex.
//!
//! ## Usage Example
//!
//! ```rust
//! use rfidcollect_core::buffer::OfflineBuffer;
//! use rfidcollect_core::observation::Observation;
//!
//! let mut buffer: OfflineBuffer<4> = OfflineBuffer::new();
//! buffer.insert(Observation::parse("04A1B2C3", "2025-04-09T16:31:22").unwrap()).unwrap();
//!
//! // Network back: deliver until the first failure
//! let freed = buffer.drain_all(|obs| {
//!     // post obs.payload(None)
//!     true
//! });
//! assert_eq!(freed, 1);
//! assert!(buffer.is_empty());
//! ```

use crate::errors::{DeliveryError, DeliveryResult};
use crate::observation::Observation;

/// Bounded store of observations awaiting delivery
///
/// ## Internal Invariants
///
/// - `count` equals the number of occupied slots
/// - `count <= N`
/// - An insert never displaces an occupied slot
#[derive(Debug, Clone)]
pub struct OfflineBuffer<const N: usize> {
    /// `None` marks a free slot
    slots: [Option<Observation>; N],

    /// Occupied slot count, kept in step with every insert/remove
    count: usize,
}

impl<const N: usize> OfflineBuffer<N> {
    /// Creates an empty buffer
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            count: 0,
        }
    }

    /// Stores `observation` in the first free slot
    ///
    /// Returns the slot index, or [`DeliveryError::BufferFull`] when all
    /// `N` slots are occupied. A full buffer is left untouched.
    pub fn insert(&mut self, observation: Observation) -> DeliveryResult<usize> {
        if self.is_full() {
            return Err(DeliveryError::BufferFull { capacity: N });
        }

        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(DeliveryError::BufferFull { capacity: N })?;

        self.slots[slot] = Some(observation);
        self.count += 1;
        Ok(slot)
    }

    /// Offers each buffered observation to `send` in slot order
    ///
    /// A slot is freed when `send` returns `true`. The first `false` stops
    /// the drain: that observation and every later one stay buffered for
    /// the next call. Returns the number of slots freed.
    pub fn drain_all<F>(&mut self, mut send: F) -> usize
    where
        F: FnMut(&Observation) -> bool,
    {
        let mut freed = 0;

        for slot in self.slots.iter_mut() {
            let Some(observation) = slot.as_ref() else {
                continue;
            };

            if !send(observation) {
                break;
            }

            *slot = None;
            self.count -= 1;
            freed += 1;
        }

        freed
    }

    /// Removes and returns the observation in `slot`
    pub fn remove(&mut self, slot: usize) -> Option<Observation> {
        let observation = self.slots.get_mut(slot)?.take()?;
        self.count -= 1;
        Some(observation)
    }

    /// Observation in `slot`, if occupied
    pub fn get(&self, slot: usize) -> Option<&Observation> {
        self.slots.get(slot)?.as_ref()
    }

    /// Occupied slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Observation)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|obs| (slot, obs)))
    }

    /// Number of buffered observations
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.count >= N
    }

    /// Drops every buffered observation
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.count = 0;
    }
}

impl<const N: usize> Default for OfflineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
