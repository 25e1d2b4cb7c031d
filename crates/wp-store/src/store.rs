use std::fs;
use std::path::Path;
use std::sync::Arc;

use heed::{Env, EnvOpenOptions};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::container::Tables;
use crate::error::{StoreError, StoreResult};
use crate::location::Location;
use crate::txn::{ReadTxn, WriteTxn};

const CONTAINERS_TABLE: &str = "containers";
const LEAVES_TABLE: &str = "leaves";
const META_TABLE: &str = "meta";
const TABLE_COUNT: u32 = 3;

/// Handle to an open store.
///
/// Cloning is cheap and every clone shares the same environment and writer
/// slot. Pass clones to whoever needs the store; open one per data
/// directory per process.
#[derive(Clone)]
pub struct Store {
    env: Env,
    tables: Tables,
    writer: Arc<Mutex<()>>,
    config: Arc<StoreConfig>,
}

impl Store {
    /// Open (or create) the store described by `config`.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.path)?;

        // SAFETY: the environment is opened once per data directory by this
        // process and its memory map is only touched through heed.
        #[allow(unsafe_code)]
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_dbs(TABLE_COUNT)
                .max_readers(config.max_readers)
                .open(&config.path)?
        };

        let mut wtxn = env.write_txn()?;
        let tables = Tables {
            containers: env.create_database(&mut wtxn, Some(CONTAINERS_TABLE))?,
            leaves: env.create_database(&mut wtxn, Some(LEAVES_TABLE))?,
            meta: env.create_database(&mut wtxn, Some(META_TABLE))?,
        };
        wtxn.commit()?;

        info!(path = %config.path.display(), "opened store");
        Ok(Self {
            env,
            tables,
            writer: Arc::new(Mutex::new(())),
            config: Arc::new(config),
        })
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Directory holding the data files.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Release this handle and wait (up to the lock timeout) for the
    /// environment to close. It stays open while other clones are alive
    /// and closes when the last one drops.
    pub fn close(self) {
        let timeout = self.config.lock_timeout();
        let Self { env, config, .. } = self;
        let closing = env.prepare_for_closing();
        if closing.wait_timeout(timeout) {
            info!(path = %config.path.display(), "closed store");
        } else {
            warn!(
                path = %config.path.display(),
                "store still referenced by other handles, closing when the last one drops"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Begin the exclusive write transaction, waiting at most the
    /// configured lock timeout for the writer slot.
    pub fn begin_write(&self) -> StoreResult<WriteTxn<'_>> {
        let timeout = self.config.lock_timeout();
        let writer = self
            .writer
            .try_lock_for(timeout)
            .ok_or(StoreError::LockTimeout(timeout))?;
        let txn = self.env.write_txn()?;
        Ok(WriteTxn::new(txn, self.tables, writer))
    }

    /// Begin a read-only snapshot transaction. Never waits on writers.
    pub fn begin_read(&self) -> StoreResult<ReadTxn<'_>> {
        let txn = self.env.read_txn()?;
        Ok(ReadTxn::new(txn, self.tables, self.config.decode_policy))
    }

    /// Run `f` in a write transaction: commit if it returns `Ok`, abort if
    /// it returns `Err`.
    pub fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut tx = self.begin_write()?;
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.abort();
                Err(err)
            }
        }
    }

    /// Run `f` in a read-only transaction.
    pub fn view<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&ReadTxn<'_>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let tx = self.begin_read()?;
        f(&tx)
    }

    // -----------------------------------------------------------------------
    // One-shot primitives
    // -----------------------------------------------------------------------

    /// Create the container chain for `location` and store `record` under
    /// `key`, atomically.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        location: &Location,
        key: &str,
        record: &T,
    ) -> StoreResult<()> {
        self.update(|tx| {
            let container = tx.container(location)?;
            tx.put(container, key, record)
        })
    }

    /// Read the record under `key` at `location`. `None` when either the
    /// container or the key is absent.
    pub fn read<T: DeserializeOwned>(&self, location: &Location, key: &str) -> StoreResult<Option<T>> {
        self.view(|tx| match tx.container(location)? {
            Some(container) => tx.get(container, key),
            None => Ok(None),
        })
    }

    /// Returns `true` if a leaf `key` exists at `location`.
    pub fn exists(&self, location: &Location, key: &str) -> StoreResult<bool> {
        self.view(|tx| match tx.container(location)? {
            Some(container) => tx.contains(container, key),
            None => Ok(false),
        })
    }

    /// The leaves at `location` in key order. Empty when the location does
    /// not exist.
    pub fn list_children<T: DeserializeOwned>(&self, location: &Location) -> StoreResult<Vec<(String, T)>> {
        self.view(|tx| match tx.container(location)? {
            Some(container) => tx.children(container)?.collect(),
            None => Ok(Vec::new()),
        })
    }

    /// The child container names at `location` in key order. Empty when
    /// the location does not exist.
    pub fn list_containers(&self, location: &Location) -> StoreResult<Vec<String>> {
        self.view(|tx| match tx.container(location)? {
            Some(container) => tx.child_containers(container),
            None => Ok(Vec::new()),
        })
    }

    /// For every child container at `location`, the leaf named `key`, in
    /// container name order.
    pub fn list_child_leaves<T: DeserializeOwned>(
        &self,
        location: &Location,
        key: &str,
    ) -> StoreResult<Vec<(String, T)>> {
        self.view(|tx| match tx.container(location)? {
            Some(container) => tx.child_leaves(container, key),
            None => Ok(Vec::new()),
        })
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.config.path)
            .field("decode_policy", &self.config.decode_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MAX_NAME_LEN;
    use crate::config::DecodePolicy;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Note {
        title: String,
        count: u32,
    }

    fn note(title: &str, count: u32) -> Note {
        Note {
            title: title.into(),
            count,
        }
    }

    fn loc(text: &str) -> Location {
        Location::parse(text).unwrap()
    }

    fn open_with(config: impl FnOnce(StoreConfig) -> StoreConfig) -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(config(StoreConfig::new(dir.path().join("db")))).unwrap();
        (dir, store)
    }

    fn open() -> (TempDir, Store) {
        open_with(|c| c)
    }

    // -----------------------------------------------------------------------
    // Write / read
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read_back() {
        let (_dir, store) = open();
        let location = loc("user.chilts");
        store.write(&location, "meta", &note("hello", 1)).unwrap();

        let read: Option<Note> = store.read(&location, "meta").unwrap();
        assert_eq!(read, Some(note("hello", 1)));
        assert!(store.exists(&location, "meta").unwrap());
    }

    #[test]
    fn write_overwrites() {
        let (_dir, store) = open();
        let location = loc("social");
        store.write(&location, "twitter-1", &note("a", 1)).unwrap();
        store.write(&location, "twitter-1", &note("b", 2)).unwrap();

        let read: Option<Note> = store.read(&location, "twitter-1").unwrap();
        assert_eq!(read, Some(note("b", 2)));
    }

    #[test]
    fn read_missing_container_or_key_is_none() {
        let (_dir, store) = open();
        assert_eq!(store.read::<Note>(&loc("nope.nothing"), "meta").unwrap(), None);

        store.write(&loc("user.chilts"), "meta", &note("x", 0)).unwrap();
        assert_eq!(store.read::<Note>(&loc("user.chilts"), "other").unwrap(), None);
        assert!(!store.exists(&loc("user.chilts"), "other").unwrap());
    }

    #[test]
    fn read_never_creates_containers() {
        let (_dir, store) = open();
        store.read::<Note>(&loc("a.b.c"), "k").unwrap();
        assert!(store.list_containers(&loc("a")).unwrap().is_empty());
        let tx = store.begin_read().unwrap();
        assert_eq!(tx.container(&loc("a")).unwrap(), None);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        let store = Store::open(StoreConfig::new(&path)).unwrap();
        store.write(&loc("user.chilts"), "meta", &note("durable", 9)).unwrap();
        store.close();

        let store = Store::open(StoreConfig::new(&path)).unwrap();
        let read: Option<Note> = store.read(&loc("user.chilts"), "meta").unwrap();
        assert_eq!(read, Some(note("durable", 9)));
    }

    // -----------------------------------------------------------------------
    // Container resolution
    // -----------------------------------------------------------------------

    #[test]
    fn resolve_matches_resolve_or_create() {
        let (_dir, store) = open();
        for text in ["a", "a.b", "a.b.c.d.e", "x.y"] {
            let location = loc(text);
            let mut tx = store.begin_write().unwrap();
            let created = tx.container(&location).unwrap();
            assert_eq!(tx.lookup(&location).unwrap(), Some(created));
            tx.commit().unwrap();

            let tx = store.begin_read().unwrap();
            assert_eq!(tx.container(&location).unwrap(), Some(created));
        }
    }

    #[test]
    fn resolve_or_create_is_idempotent() {
        let (_dir, store) = open();
        let mut tx = store.begin_write().unwrap();
        let first = tx.container(&loc("user.chilts.project")).unwrap();
        let second = tx.container(&loc("user.chilts.project")).unwrap();
        assert_eq!(first, second);

        let parent = tx.container(&loc("user.chilts")).unwrap();
        assert_ne!(parent, first);
        tx.commit().unwrap();
    }

    #[test]
    fn segment_holding_leaf_is_rejected() {
        let (_dir, store) = open();
        store.write(&loc("user"), "chilts", &note("leaf", 0)).unwrap();

        let err = store.write(&loc("user.chilts.project"), "meta", &note("x", 0)).unwrap_err();
        assert!(matches!(err, StoreError::SegmentIsLeaf { ref segment } if segment == "chilts"));
        assert_eq!(err.kind(), ErrorKind::SegmentIsLeaf);

        // A sibling segment is unaffected.
        store.write(&loc("user.other.project"), "meta", &note("x", 0)).unwrap();
    }

    #[test]
    fn leaf_over_container_is_rejected() {
        let (_dir, store) = open();
        store.write(&loc("user.chilts"), "meta", &note("x", 0)).unwrap();

        let err = store.write(&loc("user"), "chilts", &note("leaf", 0)).unwrap_err();
        assert!(matches!(err, StoreError::KeyIsContainer { ref key } if key == "chilts"));
        assert_eq!(err.kind(), ErrorKind::SegmentIsLeaf);
    }

    #[test]
    fn leaf_free_prefix_never_collides() {
        let (_dir, store) = open();
        store.write(&loc("a.b"), "leaf", &note("x", 0)).unwrap();
        // "leaf" is a leaf in a.b, but a.leaf and a.b.other are free.
        store.write(&loc("a.leaf"), "k", &note("x", 0)).unwrap();
        store.write(&loc("a.b.other"), "k", &note("x", 0)).unwrap();
    }

    #[test]
    fn overlong_key_is_rejected_before_the_engine() {
        let (_dir, store) = open();
        let long = "k".repeat(MAX_NAME_LEN + 1);

        let err = store.write(&loc("social"), &long, &note("x", 0)).unwrap_err();
        assert!(matches!(err, StoreError::NameTooLong { .. }));
        assert_eq!(err.kind(), ErrorKind::EmptyLocation);
        assert!(store.list_containers(&loc("social")).unwrap().is_empty());

        assert_eq!(store.read::<Note>(&loc("social"), &long).unwrap(), None);
        assert!(!store.exists(&loc("social"), &long).unwrap());
    }

    #[test]
    fn longest_key_fits() {
        let (_dir, store) = open();
        let key = "k".repeat(MAX_NAME_LEN);
        store.write(&loc("social"), &key, &note("edge", 1)).unwrap();
        assert_eq!(store.read(&loc("social"), &key).unwrap(), Some(note("edge", 1)));

        let location = loc("user").child(key.clone()).unwrap();
        store.write(&location, "meta", &note("deep", 2)).unwrap();
        assert_eq!(store.list_containers(&loc("user")).unwrap(), [key]);
    }

    // -----------------------------------------------------------------------
    // Atomicity
    // -----------------------------------------------------------------------

    #[test]
    fn failed_encode_leaves_no_containers() {
        let (_dir, store) = open();
        // Non-string map keys cannot be encoded.
        let mut bad = BTreeMap::new();
        bad.insert((1u8, 2u8), 3u8);

        let err = store.write(&loc("fresh.chain.deep"), "k", &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(store.list_containers(&loc("fresh")).unwrap().is_empty());
        let tx = store.begin_read().unwrap();
        assert_eq!(tx.container(&loc("fresh")).unwrap(), None);
    }

    #[test]
    fn failed_update_rolls_back_everything() {
        let (_dir, store) = open();
        let result: StoreResult<()> = store.update(|tx| {
            let c = tx.container(&loc("p.q"))?;
            tx.put(c, "one", &note("one", 1))?;
            Err(StoreError::EmptyLocation)
        });
        assert!(result.is_err());
        assert_eq!(store.read::<Note>(&loc("p.q"), "one").unwrap(), None);
        assert!(store.list_containers(&loc("p")).unwrap().is_empty());
    }

    #[test]
    fn dropped_write_txn_aborts() {
        let (_dir, store) = open();
        {
            let mut tx = store.begin_write().unwrap();
            let c = tx.container(&loc("gone")).unwrap();
            tx.put(c, "k", &note("k", 1)).unwrap();
        }
        assert_eq!(store.read::<Note>(&loc("gone"), "k").unwrap(), None);
        // The writer slot was released.
        store.write(&loc("kept"), "k", &note("k", 1)).unwrap();
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn list_children_in_key_order() {
        let (_dir, store) = open();
        let location = loc("user.chilts.project");
        for (i, name) in ["b-project", "a-project", "c-project"].iter().enumerate() {
            store.write(&location, name, &note(name, i as u32)).unwrap();
        }

        let listed: Vec<(String, Note)> = store.list_children(&location).unwrap();
        let keys: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a-project", "b-project", "c-project"]);
        assert_eq!(listed[0].1, note("a-project", 1));
    }

    #[test]
    fn list_children_is_direct_only() {
        let (_dir, store) = open();
        store.write(&loc("a"), "k1", &note("k1", 1)).unwrap();
        store.write(&loc("a.nested"), "k2", &note("k2", 2)).unwrap();
        store.write(&loc("b"), "k3", &note("k3", 3)).unwrap();

        let listed: Vec<(String, Note)> = store.list_children(&loc("a")).unwrap();
        assert_eq!(listed, vec![("k1".to_string(), note("k1", 1))]);
    }

    #[test]
    fn list_absent_location_is_empty() {
        let (_dir, store) = open();
        let listed: Vec<(String, Note)> = store.list_children(&loc("no.such.place")).unwrap();
        assert!(listed.is_empty());
        assert!(store.list_containers(&loc("no")).unwrap().is_empty());
    }

    #[test]
    fn list_containers_in_key_order() {
        let (_dir, store) = open();
        for name in ["zed", "alice", "bob"] {
            store.write(&loc("user").child(name).unwrap(), "meta", &note(name, 0)).unwrap();
        }
        assert_eq!(store.list_containers(&loc("user")).unwrap(), ["alice", "bob", "zed"]);
    }

    #[test]
    fn list_child_leaves_reads_one_leaf_per_child() {
        let (_dir, store) = open();
        let projects = loc("user.chilts.project");
        for name in ["beta", "alpha"] {
            store.write(&projects.child(name).unwrap(), "meta", &note(name, 1)).unwrap();
        }
        // A child container without a meta leaf is left out.
        store.write(&projects.child("empty").unwrap().child("update").unwrap(), "u", &note("u", 0)).unwrap();

        let listed: Vec<(String, Note)> = store.list_child_leaves(&projects, "meta").unwrap();
        let names: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[test]
    fn iterator_is_lazy_and_restartable() {
        let (_dir, store) = open();
        for key in ["1", "2", "3"] {
            store.write(&loc("seq"), key, &note(key, 0)).unwrap();
        }
        let tx = store.begin_read().unwrap();
        let container = tx.container(&loc("seq")).unwrap().unwrap();

        let mut children = tx.children::<Note>(container).unwrap();
        assert_eq!(children.next().unwrap().unwrap().0, "1");

        let again: Vec<String> = tx
            .children::<Note>(container)
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(again, ["1", "2", "3"]);
    }

    fn seed_with_corrupt_entry(store: &Store) {
        let location = loc("mixed");
        store.write(&location, "a", &note("a", 1)).unwrap();
        store.write(&location, "b", "not a note").unwrap();
        store.write(&location, "c", &note("c", 3)).unwrap();
    }

    #[test]
    fn skip_policy_skips_corrupt_entries() {
        let (_dir, store) = open();
        seed_with_corrupt_entry(&store);

        let listed: Vec<(String, Note)> = store.list_children(&loc("mixed")).unwrap();
        let keys: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn abort_policy_fails_on_corrupt_entries() {
        let (_dir, store) = open_with(|c| c.with_decode_policy(DecodePolicy::Abort));
        seed_with_corrupt_entry(&store);

        let err = store.list_children::<Note>(&loc("mixed")).unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "b"));
    }

    #[test]
    fn corrupt_child_leaf_is_reported_by_container_name() {
        let (_dir, store) = open_with(|c| c.with_decode_policy(DecodePolicy::Abort));
        let projects = loc("user.chilts.project");
        store.write(&projects.child("alpha").unwrap(), "meta", &note("alpha", 1)).unwrap();
        store.write(&projects.child("broken").unwrap(), "meta", "not a note").unwrap();

        let err = store.list_child_leaves::<Note>(&projects, "meta").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "broken"));
    }

    #[test]
    fn direct_read_of_corrupt_entry_fails() {
        let (_dir, store) = open();
        seed_with_corrupt_entry(&store);
        let err = store.read::<Note>(&loc("mixed"), "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn reader_keeps_its_snapshot() {
        let (_dir, store) = open();
        let location = loc("user.chilts");
        store.write(&location, "meta", &note("old", 1)).unwrap();

        let tx = store.begin_read().unwrap();
        let container = tx.container(&location).unwrap().unwrap();

        let writer = store.clone();
        thread::spawn(move || {
            writer.write(&loc("user.chilts"), "meta", &note("new", 2)).unwrap();
            writer.write(&loc("user.chilts.project"), "meta", &note("p", 0)).unwrap();
        })
        .join()
        .unwrap();

        let seen: Option<Note> = tx.get(container, "meta").unwrap();
        assert_eq!(seen, Some(note("old", 1)));
        assert!(tx.child_containers(container).unwrap().is_empty());
        drop(tx);

        let fresh: Option<Note> = store.read(&location, "meta").unwrap();
        assert_eq!(fresh, Some(note("new", 2)));
    }

    #[test]
    fn concurrent_writers_serialize() {
        let (_dir, store) = open();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for j in 0..10 {
                        let key = format!("{i:02}-{j:02}");
                        store.write(&loc("shared.bucket"), &key, &note(&key, j)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("writer thread should not panic");
        }

        let listed: Vec<(String, Note)> = store.list_children(&loc("shared.bucket")).unwrap();
        assert_eq!(listed.len(), 80);
        assert_eq!(store.list_containers(&loc("shared")).unwrap(), ["bucket"]);
    }

    #[test]
    fn busy_writer_slot_times_out() {
        let (_dir, store) = open_with(|c| c.with_lock_timeout(Duration::from_millis(50)));
        let held = store.begin_write().unwrap();

        let (tx, rx) = mpsc::channel();
        let contender = store.clone();
        thread::spawn(move || {
            let result = contender.write(&loc("x"), "k", &note("k", 0));
            tx.send(result.map_err(|e| e.kind())).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(rx.recv().unwrap(), Err(ErrorKind::EngineFailure));
        held.commit().unwrap();
        store.write(&loc("x"), "k", &note("k", 0)).unwrap();
    }
}
