use std::sync::Arc;

use chrono::Duration;
use tracing::debug;
use wp_store::Store;
use wp_types::{Clock, Project, Update, UpdateId, Validated};

use crate::error::{RepoError, RepoResult};
use crate::locations::{self, META_KEY};

/// Progress updates, stored under `user.<owner>.project.<name>.update`
/// keyed by an [`UpdateId`] derived from their insertion time.
#[derive(Clone)]
pub struct UpdateRepo {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl UpdateRepo {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record `update` against `project` and copy its progress onto the
    /// project, in one transaction.
    ///
    /// The project is re-read inside the transaction, so `project` only
    /// needs its `owner` and `name`. The project keeps its `inserted` time;
    /// its `updated` time becomes the update's insertion time. If another
    /// update already holds the same instant, the new one is moved forward
    /// a nanosecond at a time until its key is free.
    pub fn append_update(&self, project: &Project, update: Update) -> RepoResult<Validated<Update>> {
        let errors = update.validate();
        if !errors.is_empty() {
            debug!(project = %project.name, %errors, "rejected update");
            return Ok(Err(errors));
        }

        let project_location = locations::project(&project.owner, &project.name)?;
        let updates_location = locations::updates(&project.owner, &project.name)?;
        let now = self.clock.now();

        self.store.update(|tx| -> RepoResult<Validated<Update>> {
            let missing = || RepoError::not_found(format!("project {}/{}", project.owner, project.name));

            let container = tx.lookup(&project_location)?.ok_or_else(missing)?;
            let mut current: Project = tx.get(container, META_KEY)?.ok_or_else(missing)?;
            current.progress = update.progress;
            current.updated = now;
            tx.put(container, META_KEY, &current)?;

            let log = tx.container(&updates_location)?;
            let mut inserted = now;
            let mut id = UpdateId::from_timestamp(inserted);
            while tx.contains(log, id.as_str())? {
                inserted += Duration::nanoseconds(1);
                id = UpdateId::from_timestamp(inserted);
            }

            let stored = Update {
                inserted,
                updated: inserted,
                ..update
            };
            tx.put(log, id.as_str(), &stored)?;
            debug!(project = %project.name, %id, progress = stored.progress, "appended update");
            Ok(Ok(stored))
        })
    }

    /// The updates of one project, oldest first.
    pub fn list_updates(&self, owner: &str, name: &str) -> RepoResult<Vec<Update>> {
        Ok(self
            .list_update_entries(owner, name)?
            .into_iter()
            .map(|(_, update)| update)
            .collect())
    }

    /// The updates of one project with their identifiers, oldest first.
    /// Entries whose key is not a well-formed identifier are left out.
    pub fn list_update_entries(&self, owner: &str, name: &str) -> RepoResult<Vec<(UpdateId, Update)>> {
        let entries = self
            .store
            .list_children::<Update>(&locations::updates(owner, name)?)?
            .into_iter()
            .filter_map(|(key, update)| UpdateId::parse(&key).ok().map(|id| (id, update)))
            .collect();
        Ok(entries)
    }
}
