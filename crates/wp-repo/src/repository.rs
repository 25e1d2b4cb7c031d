use std::sync::Arc;

use tracing::info;
use wp_store::{Store, StoreConfig};
use wp_types::{Clock, Project, Social, SystemClock, Update, User, Validated};

use crate::error::RepoResult;
use crate::project::ProjectRepo;
use crate::social::SocialRepo;
use crate::update::UpdateRepo;
use crate::user::UserRepo;

/// High-level Week Project API: the four entity repositories over one
/// shared store handle and clock.
#[derive(Clone)]
pub struct WeekProject {
    store: Store,
    socials: SocialRepo,
    users: UserRepo,
    projects: ProjectRepo,
    updates: UpdateRepo,
}

impl WeekProject {
    /// Open the store described by `config`, timestamping with the system
    /// clock.
    pub fn open(config: StoreConfig) -> RepoResult<Self> {
        let store = Store::open(config)?;
        Ok(Self::new(store, Arc::new(SystemClock)))
    }

    /// Build the repositories over an already open store.
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            socials: SocialRepo::new(store.clone(), clock.clone()),
            users: UserRepo::new(store.clone(), clock.clone()),
            projects: ProjectRepo::new(store.clone(), clock.clone()),
            updates: UpdateRepo::new(store.clone(), clock),
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn socials(&self) -> &SocialRepo {
        &self.socials
    }

    pub fn users(&self) -> &UserRepo {
        &self.users
    }

    pub fn projects(&self) -> &ProjectRepo {
        &self.projects
    }

    pub fn updates(&self) -> &UpdateRepo {
        &self.updates
    }

    /// Release every handle this value holds and close the store.
    pub fn close(self) {
        let Self {
            store,
            socials,
            users,
            projects,
            updates,
        } = self;
        drop((socials, users, projects, updates));
        info!(path = %store.path().display(), "closing week project");
        store.close();
    }

    // ---- Socials ----

    pub fn insert_social(&self, social: Social) -> RepoResult<Social> {
        self.socials.insert_social(social)
    }

    pub fn get_social(&self, id: &str) -> RepoResult<Option<Social>> {
        self.socials.get_social(id)
    }

    // ---- Users ----

    pub fn insert_user(&self, user: User) -> RepoResult<User> {
        self.users.insert_user(user)
    }

    pub fn get_user(&self, name: &str) -> RepoResult<Option<User>> {
        self.users.get_user(name)
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.users.list_users()
    }

    // ---- Projects ----

    pub fn insert_project(&self, project: Project) -> RepoResult<Validated<Project>> {
        self.projects.insert_project(project)
    }

    pub fn get_project(&self, owner: &str, name: &str) -> RepoResult<Option<Project>> {
        self.projects.get_project(owner, name)
    }

    pub fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>> {
        self.projects.list_projects(owner)
    }

    // ---- Updates ----

    pub fn append_update(&self, project: &Project, update: Update) -> RepoResult<Validated<Update>> {
        self.updates.append_update(project, update)
    }

    pub fn list_updates(&self, owner: &str, name: &str) -> RepoResult<Vec<Update>> {
        self.updates.list_updates(owner, name)
    }
}
