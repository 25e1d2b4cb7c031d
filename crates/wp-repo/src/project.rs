use std::sync::Arc;

use tracing::debug;
use wp_store::Store;
use wp_types::{Clock, Project, Validated};

use crate::error::RepoResult;
use crate::locations::{self, META_KEY};

/// Projects, each the `meta` leaf of its own
/// `user.<owner>.project.<name>` container so its updates can nest below it.
#[derive(Clone)]
pub struct ProjectRepo {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl ProjectRepo {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Derive the slug from the title when `name` is empty, validate, stamp
    /// fresh timestamps, and store the project, replacing any previous
    /// record with the same owner and name.
    ///
    /// Business-rule failures come back as `Ok(Err(field_errors))` and leave
    /// the store untouched.
    pub fn insert_project(&self, project: Project) -> RepoResult<Validated<Project>> {
        let mut project = project;
        project.derive_name();

        let errors = project.validate();
        if !errors.is_empty() {
            debug!(owner = %project.owner, %errors, "rejected project");
            return Ok(Err(errors));
        }

        let now = self.clock.now();
        project.inserted = now;
        project.updated = now;

        let location = locations::project(&project.owner, &project.name)?;
        self.store.write(&location, META_KEY, &project)?;
        debug!(owner = %project.owner, name = %project.name, "inserted project");
        Ok(Ok(project))
    }

    pub fn get_project(&self, owner: &str, name: &str) -> RepoResult<Option<Project>> {
        Ok(self.store.read(&locations::project(owner, name)?, META_KEY)?)
    }

    /// Every project of `owner`, ordered by slug.
    pub fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>> {
        let projects = self
            .store
            .list_child_leaves(&locations::projects(owner)?, META_KEY)?
            .into_iter()
            .map(|(_, project)| project)
            .collect();
        Ok(projects)
    }
}
