//! Translation between listings and stored BSON documents.
//!
//! Stored documents keep the identifier under `_id` as an object id and the timestamp under
//! `createdAtMillis` as a 64-bit integer; every other top-level field is an attribute.
//! Documents written before `createdAtMillis` existed carry their timestamp under `date`.

use crate::listing::{Listing, ListingDocument, ListingId};
use crate::store::types::StoreError;
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use serde_json::Map;

const ID_FIELD: &str = "_id";
const CREATED_AT_FIELD: &str = "createdAtMillis";
const LEGACY_CREATED_AT_FIELD: &str = "date";

/// Filter selecting the single document with the given identifier.
pub(crate) fn id_filter(id: &ListingId) -> Document {
    doc! { "_id": ObjectId::from_bytes(id.bytes()) }
}

/// Encode a listing body for insert or replace.
///
/// A stray `_id` attribute is dropped so the store keeps ownership of identifiers.
pub(crate) fn to_stored(document: &ListingDocument) -> Result<Document, StoreError> {
    let mut stored = Document::new();
    stored.insert(CREATED_AT_FIELD, Bson::Int64(document.created_at_millis));
    for (key, value) in &document.attributes {
        if key != ID_FIELD {
            stored.insert(key.clone(), bson::to_bson(value)?);
        }
    }
    Ok(stored)
}

/// Decode a stored document into a listing.
///
/// Attribute values come back as relaxed extended JSON, so plain numbers, strings and
/// arrays round-trip unchanged.
pub(crate) fn from_stored(mut stored: Document) -> Result<Listing, StoreError> {
    let id = stored
        .remove(ID_FIELD)
        .ok_or_else(|| StoreError::MalformedDocument("document has no _id".into()))
        .and_then(parse_object_id)?;

    let created_at_millis = match stored.remove(CREATED_AT_FIELD) {
        Some(value) => parse_int64(&value).ok_or_else(|| {
            StoreError::MalformedDocument(format!("createdAtMillis is not an integer: {value}"))
        })?,
        None => match stored.get(LEGACY_CREATED_AT_FIELD).and_then(parse_int64) {
            Some(millis) => {
                stored.remove(LEGACY_CREATED_AT_FIELD);
                millis
            }
            None => 0,
        },
    };

    let attributes: Map<_, _> = stored
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();
    Ok(ListingDocument {
        created_at_millis,
        attributes,
    }
    .with_id(id))
}

/// Read the object id the store assigned to a document.
pub(crate) fn parse_object_id(value: Bson) -> Result<ListingId, StoreError> {
    match value {
        Bson::ObjectId(oid) => Ok(ListingId::from_bytes(oid.bytes())),
        other => Err(StoreError::MalformedDocument(format!(
            "not an object id: {other}"
        ))),
    }
}

fn parse_int64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int64(n) => Some(*n),
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Double(f) if f.fract() == 0.0 => Some(*f as i64),
        Bson::Null => Some(0),
        _ => None,
    }
}
