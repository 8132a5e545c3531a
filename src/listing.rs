//! Listing model shared by the HTTP surface and the store gateway.
//!
//! A listing on the wire is a flat JSON object: the store-assigned `id`, the server-stamped
//! `createdAtMillis`, and any number of free-form attributes next to them.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::IgnoredAny};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

/// Number of raw bytes in a store object identifier.
const ID_LEN: usize = 12;

/// Raised when a client-supplied identifier is not a 24-character hexadecimal object id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid ID format")]
pub struct InvalidListingId;

/// Store-assigned identifier of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListingId([u8; ID_LEN]);

impl ListingId {
    /// Build an identifier from its raw bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub const fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Parse the hexadecimal form used on the wire and in store filters.
    pub fn parse(raw: &str) -> Result<Self, InvalidListingId> {
        if raw.len() != ID_LEN * 2 {
            return Err(InvalidListingId);
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| InvalidListingId)?;
        Ok(Self(bytes))
    }

    /// Lowercase hexadecimal rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ListingId {
    type Err = InvalidListingId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ListingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A persisted listing as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Identifier assigned by the store at creation time.
    pub id: ListingId,
    /// Creation timestamp in Unix milliseconds.
    #[serde(rename = "createdAtMillis")]
    pub created_at_millis: i64,
    /// Free-form business fields, flattened into the wire object.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Listing body as submitted by a client on create or replace.
///
/// Any `id` in the payload is consumed and discarded so it never leaks into the attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(expecting = "a JSON object")]
pub struct ListingDraft {
    #[serde(default, rename = "id")]
    _id: Option<IgnoredAny>,
    /// Timestamp sent by the client, if any.
    #[serde(default, rename = "createdAtMillis")]
    pub created_at_millis: Option<i64>,
    /// Remaining fields of the payload.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ListingDraft {
    /// Document for a new listing: the client timestamp is replaced by `now_millis`.
    pub fn stamped(self, now_millis: i64) -> ListingDocument {
        ListingDocument {
            created_at_millis: now_millis,
            attributes: self.attributes,
        }
    }

    /// Document for a full replacement: the client timestamp is written back as sent.
    ///
    /// A missing timestamp becomes `0`, matching a zero-valued decode.
    pub fn into_replacement(self) -> ListingDocument {
        ListingDocument {
            created_at_millis: self.created_at_millis.unwrap_or_default(),
            attributes: self.attributes,
        }
    }
}

/// Listing contents without an identifier, as written to the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingDocument {
    /// Creation timestamp in Unix milliseconds.
    pub created_at_millis: i64,
    /// Free-form business fields.
    pub attributes: Map<String, Value>,
}

impl ListingDocument {
    /// Attach the store-assigned identifier.
    pub fn with_id(self, id: ListingId) -> Listing {
        Listing {
            id,
            created_at_millis: self.created_at_millis,
            attributes: self.attributes,
        }
    }
}

/// Current wall-clock time in Unix milliseconds.
pub fn current_time_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
