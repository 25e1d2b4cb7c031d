//! Read-write and read-only transactions.
//!
//! A [`WriteTxn`] holds the store's single writer slot from `begin_write`
//! until it commits, aborts, or drops; dropping without committing aborts.
//! A [`ReadTxn`] sees the snapshot that was current when it began and is
//! unaffected by writers committing afterwards.

use heed::{RoTxn, RwTxn};
use parking_lot::MutexGuard;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::children::{admit, Children};
use crate::codec;
use crate::config::DecodePolicy;
use crate::container::{entry_key, ContainerId, Tables};
use crate::error::{StoreError, StoreResult};
use crate::location::{check_name_len, Location};

// ---------------------------------------------------------------------------
// WriteTxn
// ---------------------------------------------------------------------------

/// Exclusive read-write transaction.
pub struct WriteTxn<'s> {
    // Declared before the writer guard so the LMDB transaction is finished
    // before the slot is released.
    txn: RwTxn<'s>,
    tables: Tables,
    _writer: MutexGuard<'s, ()>,
}

impl<'s> WriteTxn<'s> {
    pub(crate) fn new(txn: RwTxn<'s>, tables: Tables, writer: MutexGuard<'s, ()>) -> Self {
        Self {
            txn,
            tables,
            _writer: writer,
        }
    }

    /// The container at `location`, creating every missing segment.
    pub fn container(&mut self, location: &Location) -> StoreResult<ContainerId> {
        self.tables.resolve_or_create(&mut self.txn, location)
    }

    /// The container at `location` if it already exists.
    pub fn lookup(&self, location: &Location) -> StoreResult<Option<ContainerId>> {
        self.tables.resolve(&self.txn, location)
    }

    /// Store `record` under `key` in `container`, replacing any previous
    /// leaf of that name.
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        container: ContainerId,
        key: &str,
        record: &T,
    ) -> StoreResult<()> {
        check_name_len(key)?;
        let entry = entry_key(container, key);
        if self.tables.containers.get(&self.txn, entry.as_slice())?.is_some() {
            return Err(StoreError::KeyIsContainer {
                key: key.to_string(),
            });
        }
        let bytes = codec::encode(key, record)?;
        self.tables
            .leaves
            .put(&mut self.txn, entry.as_slice(), bytes.as_slice())?;
        debug!(container = container.get(), key, len = bytes.len(), "put leaf");
        Ok(())
    }

    /// Decode the leaf `key` of `container`, as of this transaction.
    pub fn get<T: DeserializeOwned>(
        &self,
        container: ContainerId,
        key: &str,
    ) -> StoreResult<Option<T>> {
        self.tables
            .leaf(&self.txn, container, key)?
            .map(|bytes| codec::decode(key, bytes))
            .transpose()
    }

    /// Returns `true` if `container` has a leaf named `key`.
    pub fn contains(&self, container: ContainerId, key: &str) -> StoreResult<bool> {
        Ok(self.tables.leaf(&self.txn, container, key)?.is_some())
    }

    /// Make every change of this transaction durable and visible.
    pub fn commit(self) -> StoreResult<()> {
        let Self { txn, _writer, .. } = self;
        txn.commit()?;
        Ok(())
    }

    /// Discard every change of this transaction.
    pub fn abort(self) {
        let Self { txn, _writer, .. } = self;
        txn.abort();
    }
}

// ---------------------------------------------------------------------------
// ReadTxn
// ---------------------------------------------------------------------------

/// Read-only snapshot transaction.
pub struct ReadTxn<'s> {
    txn: RoTxn<'s>,
    tables: Tables,
    policy: DecodePolicy,
}

impl<'s> ReadTxn<'s> {
    pub(crate) fn new(txn: RoTxn<'s>, tables: Tables, policy: DecodePolicy) -> Self {
        Self { txn, tables, policy }
    }

    /// The container at `location`, or `None` if any segment is missing.
    pub fn container(&self, location: &Location) -> StoreResult<Option<ContainerId>> {
        self.tables.resolve(&self.txn, location)
    }

    /// The child container `segment` of `parent`.
    pub fn child(&self, parent: ContainerId, segment: &str) -> StoreResult<Option<ContainerId>> {
        self.tables.child(&self.txn, parent, segment)
    }

    /// Decode the leaf `key` of `container`.
    pub fn get<T: DeserializeOwned>(
        &self,
        container: ContainerId,
        key: &str,
    ) -> StoreResult<Option<T>> {
        self.tables
            .leaf(&self.txn, container, key)?
            .map(|bytes| codec::decode(key, bytes))
            .transpose()
    }

    /// Returns `true` if `container` has a leaf named `key`.
    pub fn contains(&self, container: ContainerId, key: &str) -> StoreResult<bool> {
        Ok(self.tables.leaf(&self.txn, container, key)?.is_some())
    }

    /// Iterate the leaves of `container` in key order.
    pub fn children<T: DeserializeOwned>(&self, container: ContainerId) -> StoreResult<Children<'_, T>> {
        let prefix = container.to_bytes();
        let entries = self.tables.leaves.prefix_iter(&self.txn, prefix.as_slice())?;
        Ok(Children::new(entries, self.policy))
    }

    /// Names of the child containers of `container`, in key order.
    pub fn child_containers(&self, container: ContainerId) -> StoreResult<Vec<String>> {
        self.tables.child_names(&self.txn, container)
    }

    /// For each child container of `container`, in key order, the leaf
    /// named `key`. Children without that leaf are left out; undecodable
    /// leaves follow the decode policy.
    pub fn child_leaves<T: DeserializeOwned>(
        &self,
        container: ContainerId,
        key: &str,
    ) -> StoreResult<Vec<(String, T)>> {
        let mut records = Vec::new();
        for name in self.child_containers(container)? {
            let Some(child) = self.child(container, &name)? else {
                continue;
            };
            let Some(bytes) = self.tables.leaf(&self.txn, child, key)? else {
                continue;
            };
            if let Some(outcome) = admit(self.policy, &name, codec::decode(&name, bytes)) {
                records.push((name, outcome?));
            }
        }
        Ok(records)
    }
}
