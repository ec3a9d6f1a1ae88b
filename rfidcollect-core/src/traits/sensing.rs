//! Tag Reader Contract
//!
//! Readers follow the same pull-based model as any other embedded source:
//! the collection loop polls, and the reader answers with `nb::Result`.
//!
//! - `Ok(tag)` - a card was read
//! - `Err(nb::Error::WouldBlock)` - no card in the field (or the same
//!   card is still present and the reader suppresses it itself)
//! - `Err(nb::Error::Other(e))` - the reader faulted
//!
//! The reader does not need to filter repeats; the collection loop runs
//! every read through the deduplicator.

use crate::observation::TagId;

/// Source of raw tag reads
///
/// ## Example Implementation
///
/// ```rust
/// use rfidcollect_core::traits::TagReader;
/// use rfidcollect_core::observation::TagId;
///
/// struct Mfrc522Reader {
///     // ... SPI handle, reset pin
/// }
///
/// impl TagReader for Mfrc522Reader {
///     type Error = ();
///
///     fn poll_tag(&mut self) -> nb::Result<TagId, Self::Error> {
///         // PICC_IsNewCardPresent / PICC_ReadCardSerial
///         let uid: Option<[u8; 4]> = None;
///         match uid {
///             Some(uid) => TagId::from_uid(&uid).map_err(|_| nb::Error::Other(())),
///             None => Err(nb::Error::WouldBlock),
///         }
///     }
/// }
/// ```
pub trait TagReader {
    /// Reader fault type
    type Error: core::fmt::Debug;

    /// Poll for at most one tag
    fn poll_tag(&mut self) -> nb::Result<TagId, Self::Error>;
}
