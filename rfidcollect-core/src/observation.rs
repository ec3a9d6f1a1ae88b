//! Observation Records and the Wire Payload
//!
//! ## Overview
//!
//! An [`Observation`] is one accepted tag read: the tag identifier and the
//! wall-clock time it was collected. It is created when the delivery
//! engine accepts a read, and from then on is owned by exactly one place:
//! the engine while an upload is in flight, or an offline buffer slot while
//! waiting for the network. It is destroyed when a send succeeds (or lost
//! if the buffer is full).
//!
//! ### Memory Model
//!
//! Both fields are inline `heapless::String`s, so an observation is a
//! fixed-size value that can live in a static slot array:
//!
//! ```text
//! Observation size breakdown:
//! ├── tag_id:    20 bytes + len
//! ├── timestamp: 25 bytes + len
//! └── padding
//! Total: ~56 bytes
//! ```
//!
//! ## Wire Format
//!
//! The collection server expects one JSON object per POST. Field names are
//! fixed for compatibility:
//!
//! ```text
//! {"IdPubela":"04A1B2C3","CollectedAt":"2025-04-09T16:31:22"}
//! {"IdPubela":"04A1B2C3","CollectedAt":"2025-04-09T16:31:22","IdColectare":"2"}
//! ```
//!
//! `IdColectare` is only present when a collection-session identifier is
//! configured.

use alloc::vec::Vec;
use core::fmt::{self, Write};

use heapless::String;
use serde::Serialize;

use crate::constants::MAX_TAG_ID_LEN;
use crate::errors::{DeliveryError, DeliveryResult};
use crate::time::{self, Timestamp};

/// Hex-encoded RFID tag identifier
///
/// Guaranteed non-empty, printable ASCII and at most [`MAX_TAG_ID_LEN`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagId(String<MAX_TAG_ID_LEN>);

impl TagId {
    /// Validate and store a tag identifier
    pub fn new(raw: &str) -> DeliveryResult<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(DeliveryError::InvalidTagId);
        }

        let mut id = String::new();
        id.push_str(raw).map_err(|_| DeliveryError::TagIdTooLong {
            len: raw.len(),
            max: MAX_TAG_ID_LEN,
        })?;

        Ok(Self(id))
    }

    /// Encode a raw card UID the way the reader reports it
    ///
    /// Each byte becomes two upper-case hex digits, zero padded, so
    /// `[0x04, 0xA1, 0x0B]` encodes as `"04A10B"`.
    pub fn from_uid(uid: &[u8]) -> DeliveryResult<Self> {
        if uid.is_empty() {
            return Err(DeliveryError::InvalidTagId);
        }

        let len = uid.len() * 2;
        if len > MAX_TAG_ID_LEN {
            return Err(DeliveryError::TagIdTooLong { len, max: MAX_TAG_ID_LEN });
        }

        let mut id = String::new();
        for byte in uid {
            // Capacity checked above
            write!(id, "{:02X}", byte).map_err(|_| DeliveryError::TagIdTooLong {
                len,
                max: MAX_TAG_ID_LEN,
            })?;
        }

        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for TagId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TagId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TagId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str())
    }
}

/// One accepted tag read awaiting (or undergoing) delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    tag_id: TagId,
    timestamp: Timestamp,
}

impl Observation {
    /// Build an observation from an already validated tag id
    pub fn new(tag_id: TagId, timestamp: Timestamp) -> Self {
        Self { tag_id, timestamp }
    }

    /// Build an observation from raw strings, validating both
    pub fn parse(tag_id: &str, timestamp: &str) -> DeliveryResult<Self> {
        Ok(Self {
            tag_id: TagId::new(tag_id)?,
            timestamp: time::timestamp(timestamp)?,
        })
    }

    /// Tag identifier
    pub fn tag_id(&self) -> &TagId {
        &self.tag_id
    }

    /// Collection time as sent to the server
    pub fn timestamp(&self) -> &str {
        self.timestamp.as_str()
    }

    /// Split back into tag id and stamp
    pub fn into_parts(self) -> (TagId, Timestamp) {
        (self.tag_id, self.timestamp)
    }

    /// Wire payload for this observation
    pub fn payload<'a>(&'a self, collection_id: Option<&'a str>) -> Payload<'a> {
        Payload {
            tag_id: self.tag_id.as_str(),
            collected_at: self.timestamp.as_str(),
            collection_id,
        }
    }
}

/// JSON body of one collection POST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payload<'a> {
    /// Bin (tag) identifier
    #[serde(rename = "IdPubela")]
    pub tag_id: &'a str,

    /// Collection time, `%Y-%m-%dT%H:%M:%S`
    #[serde(rename = "CollectedAt")]
    pub collected_at: &'a str,

    /// Optional collection-session identifier
    #[serde(rename = "IdColectare", skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<&'a str>,
}

impl Payload<'_> {
    /// Serialize to the JSON request body
    pub fn to_json(&self) -> DeliveryResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|_| DeliveryError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_encodes_as_padded_upper_hex() {
        let id = TagId::from_uid(&[0x04, 0xa1, 0x0b, 0xff]).unwrap();
        assert_eq!(id, "04A10BFF");
    }

    #[test]
    fn ten_byte_uid_fits() {
        let id = TagId::from_uid(&[0xAB; 10]).unwrap();
        assert_eq!(id.as_str().len(), 20);

        let err = TagId::from_uid(&[0xAB; 11]).unwrap_err();
        assert_eq!(err, DeliveryError::TagIdTooLong { len: 22, max: MAX_TAG_ID_LEN });
    }

    #[test]
    fn rejects_empty_and_blank_ids() {
        assert_eq!(TagId::new(""), Err(DeliveryError::InvalidTagId));
        assert_eq!(TagId::new("04 A1"), Err(DeliveryError::InvalidTagId));
        assert_eq!(TagId::from_uid(&[]), Err(DeliveryError::InvalidTagId));
    }

    #[test]
    fn payload_uses_server_field_names() {
        let obs = Observation::parse("04A1B2C3", "2025-04-09T16:31:22").unwrap();
        let body = obs.payload(None).to_json().unwrap();
        assert_eq!(
            core::str::from_utf8(&body).unwrap(),
            r#"{"IdPubela":"04A1B2C3","CollectedAt":"2025-04-09T16:31:22"}"#
        );
    }

    #[test]
    fn payload_includes_collection_id_when_set() {
        let obs = Observation::parse("04A1B2C3", "2025-04-09T16:31:22").unwrap();
        let body = obs.payload(Some("2")).to_json().unwrap();
        assert_eq!(
            core::str::from_utf8(&body).unwrap(),
            r#"{"IdPubela":"04A1B2C3","CollectedAt":"2025-04-09T16:31:22","IdColectare":"2"}"#
        );
    }

    #[test]
    fn largest_payload_fits_firmware_json_document() {
        use crate::constants::{MAX_COLLECTION_ID_LEN, MAX_TIMESTAMP_LEN};

        let tag = "F".repeat(MAX_TAG_ID_LEN);
        let stamp = "9".repeat(MAX_TIMESTAMP_LEN);
        let collection = "C".repeat(MAX_COLLECTION_ID_LEN);

        let obs = Observation::parse(&tag, &stamp).unwrap();
        let body = obs.payload(Some(&collection)).to_json().unwrap();
        // StaticJsonDocument<200> on the collection unit
        assert!(body.len() <= 200, "payload is {} bytes", body.len());
    }
}
