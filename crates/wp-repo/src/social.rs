use std::sync::Arc;

use tracing::debug;
use wp_store::Store;
use wp_types::{Clock, Social};

use crate::error::RepoResult;
use crate::locations;

/// Social identities, all stored in the singleton `social` container keyed
/// by their provider-qualified id.
#[derive(Clone)]
pub struct SocialRepo {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl SocialRepo {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stamp fresh timestamps and store `social`, replacing any previous
    /// record with the same id.
    pub fn insert_social(&self, social: Social) -> RepoResult<Social> {
        let now = self.clock.now();
        let social = Social {
            inserted: now,
            updated: now,
            ..social
        };
        self.store.write(&locations::socials()?, &social.id, &social)?;
        debug!(id = %social.id, name = %social.name, "inserted social");
        Ok(social)
    }

    pub fn get_social(&self, id: &str) -> RepoResult<Option<Social>> {
        Ok(self.store.read(&locations::socials()?, id)?)
    }
}
