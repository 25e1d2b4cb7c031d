use thiserror::Error;
use wp_store::{ErrorKind, StoreError};

/// Hard failures of repository operations. Field-level validation failures
/// are not errors; they come back as [`wp_types::Validated`] data.
#[derive(Debug, Error)]
pub enum RepoError {
    /// An entity the operation depends on does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RepoError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(err) => err.kind(),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
