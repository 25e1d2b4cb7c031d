//! Ordered enumeration of a container's leaf entries.

use std::marker::PhantomData;

use heed::types::Bytes;
use heed::RoPrefix;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::codec;
use crate::config::DecodePolicy;
use crate::container::local_name;
use crate::error::{StoreError, StoreResult};

/// Lazy iterator over the direct leaf entries of one container, yielding
/// `(local key, record)` in ascending byte order of the key.
///
/// Borrows the read transaction it was opened from and cannot outlive it.
/// Open a new one from the transaction to start over.
pub struct Children<'t, T> {
    entries: RoPrefix<'t, Bytes, Bytes>,
    policy: DecodePolicy,
    _record: PhantomData<fn() -> T>,
}

impl<'t, T> Children<'t, T> {
    pub(crate) fn new(entries: RoPrefix<'t, Bytes, Bytes>, policy: DecodePolicy) -> Self {
        Self {
            entries,
            policy,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for Children<'_, T> {
    type Item = StoreResult<(String, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (raw_key, raw_value) = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            let key = local_name(raw_key);
            let decoded = codec::decode(&key, raw_value);
            if let Some(outcome) = admit(self.policy, &key, decoded) {
                return Some(outcome.map(|record| (key, record)));
            }
        }
    }
}

/// Apply the decode policy to one decoded entry. `None` means skip it.
pub(crate) fn admit<T>(
    policy: DecodePolicy,
    key: &str,
    decoded: StoreResult<T>,
) -> Option<StoreResult<T>> {
    match decoded {
        Err(err @ StoreError::Decode { .. }) if policy == DecodePolicy::Skip => {
            warn!(key, error = %err, "skipping undecodable entry");
            None
        }
        other => Some(other),
    }
}
