//! Entity repositories for The Week Project.
//!
//! Each repository turns one domain operation into container/leaf operations
//! on a shared [`Store`]: it computes where a record lives, stamps its
//! lifecycle timestamps from a [`Clock`], and reads or writes it.
//!
//! # Namespace
//!
//! ```text
//! social                                  <provider>-<id> -> Social
//! user.<name>                             meta            -> User
//! user.<owner>.project.<name>             meta            -> Project
//! user.<owner>.project.<name>.update      <update id>     -> Update
//! ```
//!
//! [`WeekProject`] bundles the four repositories over one store handle and is
//! the entry point for applications.

pub mod error;
pub mod locations;
pub mod project;
pub mod repository;
pub mod social;
pub mod update;
pub mod user;

#[cfg(test)]
mod test_support;

pub use error::{RepoError, RepoResult};
pub use project::ProjectRepo;
pub use repository::WeekProject;
pub use social::SocialRepo;
pub use update::UpdateRepo;
pub use user::UserRepo;

// Re-export the types callers need alongside the repositories.
pub use wp_store::{DecodePolicy, ErrorKind, Store, StoreConfig, StoreError};
pub use wp_types::{
    slugify, Clock, FieldErrors, ManualClock, Project, Social, SystemClock, Update, UpdateId, User,
    Validated,
};
