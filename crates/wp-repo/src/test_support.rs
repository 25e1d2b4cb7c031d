use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use wp_store::{Store, StoreConfig};
use wp_types::ManualClock;

use crate::repository::WeekProject;

/// `secs` seconds after a fixed base instant.
pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_500_000_000 + secs, 0).unwrap()
}

/// A fresh on-disk store and a manual clock frozen at `at(0)`.
pub(crate) struct Fixture {
    pub(crate) store: Store,
    pub(crate) clock: Arc<ManualClock>,
    _dir: TempDir,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(StoreConfig::new(dir.path().join("db"))).unwrap();
        Self {
            store,
            clock: Arc::new(ManualClock::new(at(0))),
            _dir: dir,
        }
    }

    pub(crate) fn week(&self) -> WeekProject {
        WeekProject::new(self.store.clone(), self.clock.clone())
    }
}
