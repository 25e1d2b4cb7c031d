//! Leaf record encoding.
//!
//! Records are stored as JSON. The encoding is self-describing, so decoding
//! tolerates unknown fields and records using `#[serde(default)]` fill in
//! absent ones. `key` is only used to label errors.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Encode a record into leaf bytes.
pub fn encode<T: Serialize + ?Sized>(key: &str, record: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode leaf bytes into the expected record shape.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
