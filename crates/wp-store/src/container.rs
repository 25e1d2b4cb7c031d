//! Container resolution over the flat LMDB key space.
//!
//! Physical layout, one LMDB environment with three named databases:
//!
//! ```text
//! containers: [parent id: u64 BE][segment]  -> [child id: u64 BE]
//! leaves:     [container id: u64 BE][key]   -> encoded record
//! meta:       "next_container_id"           -> [u64 BE]
//! ```
//!
//! The root container has id 0 and is never stored. Prefixing every entry
//! with its container id makes a prefix scan yield exactly the direct
//! children of one container, in byte order of their names.

use std::fmt;

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::location::Location;

/// Width of the container id prefix on every physical key.
pub(crate) const ID_LEN: usize = 8;

/// Longest key LMDB accepts with its default build settings.
const MAX_KEY_LEN: usize = 511;

/// Longest segment or leaf key, in bytes, that fits after the container
/// id prefix.
pub const MAX_NAME_LEN: usize = MAX_KEY_LEN - ID_LEN;

const NEXT_CONTAINER_ID: &[u8] = b"next_container_id";

pub(crate) type RawDatabase = Database<Bytes, Bytes>;

/// Identity of a container. Stable for the life of the data file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    /// The implicit container every location starts from.
    pub const ROOT: Self = Self(0);

    /// The raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn to_bytes(self) -> [u8; ID_LEN] {
        self.0.to_be_bytes()
    }

    fn from_raw(raw: &[u8], segment: &str) -> StoreResult<Self> {
        <[u8; ID_LEN]>::try_from(raw)
            .map(|bytes| Self(u64::from_be_bytes(bytes)))
            .map_err(|_| StoreError::CorruptContainer {
                segment: segment.to_string(),
            })
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

/// Physical key of the entry `name` inside `parent`.
pub(crate) fn entry_key(parent: ContainerId, name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LEN + name.len());
    key.extend_from_slice(&parent.to_bytes());
    key.extend_from_slice(name.as_bytes());
    key
}

/// Local name of a physical key (the part after the container prefix).
pub(crate) fn local_name(key: &[u8]) -> String {
    String::from_utf8_lossy(&key[ID_LEN.min(key.len())..]).into_owned()
}

/// Handles to the three databases. Cheap to copy.
#[derive(Clone, Copy)]
pub(crate) struct Tables {
    pub(crate) containers: RawDatabase,
    pub(crate) leaves: RawDatabase,
    pub(crate) meta: RawDatabase,
}

impl Tables {
    /// The child container `segment` of `parent`, if it exists.
    pub(crate) fn child(
        &self,
        txn: &RoTxn,
        parent: ContainerId,
        segment: &str,
    ) -> StoreResult<Option<ContainerId>> {
        if segment.len() > MAX_NAME_LEN {
            return Ok(None);
        }
        let key = entry_key(parent, segment);
        self.containers
            .get(txn, key.as_slice())?
            .map(|raw| ContainerId::from_raw(raw, segment))
            .transpose()
    }

    /// Raw leaf bytes of `key` in `container`.
    pub(crate) fn leaf<'t>(
        &self,
        txn: &'t RoTxn,
        container: ContainerId,
        key: &str,
    ) -> StoreResult<Option<&'t [u8]>> {
        if key.len() > MAX_NAME_LEN {
            return Ok(None);
        }
        let entry = entry_key(container, key);
        Ok(self.leaves.get(txn, entry.as_slice())?)
    }

    /// Walk `location` without creating anything. `None` when any segment
    /// is missing (or is a leaf rather than a container).
    pub(crate) fn resolve(&self, txn: &RoTxn, location: &Location) -> StoreResult<Option<ContainerId>> {
        let mut current = ContainerId::ROOT;
        for segment in location.segments() {
            match self.child(txn, current, segment)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Walk `location`, creating every missing container on the way.
    ///
    /// Fails with [`StoreError::SegmentIsLeaf`] when a segment is already
    /// taken by a leaf in its parent. Containers created before the failure
    /// vanish with the transaction when it aborts.
    pub(crate) fn resolve_or_create(
        &self,
        txn: &mut RwTxn,
        location: &Location,
    ) -> StoreResult<ContainerId> {
        let mut current = ContainerId::ROOT;
        for segment in location.segments() {
            if self.leaf(txn, current, segment)?.is_some() {
                return Err(StoreError::SegmentIsLeaf {
                    segment: segment.clone(),
                });
            }
            current = match self.child(txn, current, segment)? {
                Some(existing) => existing,
                None => {
                    let created = self.allocate(txn)?;
                    let key = entry_key(current, segment);
                    self.containers
                        .put(txn, key.as_slice(), created.to_bytes().as_slice())?;
                    debug!(
                        parent = current.get(),
                        segment = %segment,
                        id = created.get(),
                        "created container"
                    );
                    created
                }
            };
        }
        Ok(current)
    }

    /// Names of the direct child containers of `parent`, in byte order.
    pub(crate) fn child_names(&self, txn: &RoTxn, parent: ContainerId) -> StoreResult<Vec<String>> {
        let prefix = parent.to_bytes();
        let mut names = Vec::new();
        for entry in self.containers.prefix_iter(txn, prefix.as_slice())? {
            let (key, _) = entry?;
            names.push(local_name(key));
        }
        Ok(names)
    }

    fn allocate(&self, txn: &mut RwTxn) -> StoreResult<ContainerId> {
        let next = match self.meta.get(txn, NEXT_CONTAINER_ID)? {
            Some(raw) => ContainerId::from_raw(raw, "next_container_id")?.get(),
            None => 1,
        };
        self.meta
            .put(txn, NEXT_CONTAINER_ID, (next + 1).to_be_bytes().as_slice())?;
        Ok(ContainerId(next))
    }
}
