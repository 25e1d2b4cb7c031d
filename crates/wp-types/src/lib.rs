//! Foundation types for The Week Project.
//!
//! This crate holds the record shapes persisted by the store and the small
//! pure helpers the repositories lean on. The repository crate depends on
//! `wp-types`; the store itself stays record-agnostic.
//!
//! # Key Types
//!
//! - [`Social`]: identity within one external login provider
//! - [`User`]: local account
//! - [`Project`]: a user's project, addressed by its slug
//! - [`Update`]: a timestamped progress note on one project
//! - [`UpdateId`]: time-derived key whose byte order is chronological order
//! - [`Clock`]: wall-clock source used to stamp lifecycle timestamps
//! - [`FieldErrors`]: per-field validation messages, returned as data

pub mod entity;
pub mod error;
pub mod slug;
pub mod temporal;
pub mod validation;

pub use entity::{Project, Social, Update, User, MAX_NAME_LEN, MAX_PROGRESS};
pub use error::TypeError;
pub use slug::slugify;
pub use temporal::{Clock, ManualClock, SystemClock, UpdateId};
pub use validation::{FieldErrors, Validated};
