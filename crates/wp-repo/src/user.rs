use std::sync::Arc;

use tracing::debug;
use wp_store::Store;
use wp_types::{Clock, User};

use crate::error::RepoResult;
use crate::locations::{self, META_KEY};

/// Local accounts, each the `meta` leaf of its own `user.<name>` container.
#[derive(Clone)]
pub struct UserRepo {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl UserRepo {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stamp fresh timestamps and store `user`, replacing any previous
    /// record with the same name.
    pub fn insert_user(&self, user: User) -> RepoResult<User> {
        let now = self.clock.now();
        let user = User {
            inserted: now,
            updated: now,
            ..user
        };
        self.store.write(&locations::user(&user.name)?, META_KEY, &user)?;
        debug!(name = %user.name, "inserted user");
        Ok(user)
    }

    pub fn get_user(&self, name: &str) -> RepoResult<Option<User>> {
        Ok(self.store.read(&locations::user(name)?, META_KEY)?)
    }

    /// Every user, ordered by name.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = self
            .store
            .list_child_leaves(&locations::users()?, META_KEY)?
            .into_iter()
            .map(|(_, user)| user)
            .collect();
        Ok(users)
    }
}
