//! Record shapes persisted by the store.
//!
//! Every record is encoded self-describingly and decoded leniently: unknown
//! fields are ignored and absent fields take their `Default`, so adding a
//! field never breaks existing data. Removing one is not supported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;
use crate::validation::FieldErrors;

/// Upper bound of a progress percentage.
pub const MAX_PROGRESS: u8 = 100;

/// Longest project name or owner, in bytes. Both become store location
/// segments.
pub const MAX_NAME_LEN: usize = 255;

/// Separator reserved by store locations. Names used as location segments
/// must not contain it.
const RESERVED_SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// Identity within one external login provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Social {
    /// Provider-qualified id, e.g. `"twitter-123456"`.
    pub id: String,
    /// The nickname this identity maps to locally, e.g. `"chilts"`.
    pub name: String,
    pub inserted: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Social {
    /// Create a social identity for `user_id` at `provider`.
    pub fn new(provider: &str, user_id: &str, name: impl Into<String>) -> Self {
        Self {
            id: Self::provider_id(provider, user_id),
            name: name.into(),
            ..Default::default()
        }
    }

    /// The provider-qualified id: `"<provider>-<user_id>"`.
    pub fn provider_id(provider: &str, user_id: &str) -> String {
        format!("{provider}-{user_id}")
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Local account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Handle, e.g. `"chilts"`. Also the user's location segment.
    pub name: String,
    /// Display name, e.g. `"Andrew Chilton"`.
    pub title: String,
    pub email: String,
    pub inserted: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, title: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            email: email.into(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A user's project. Addressed by `(owner, name)` where `name` is the slug of
/// the title.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Slug, e.g. `"week-project"`.
    pub name: String,
    /// Human title, e.g. `"The Week Project"`.
    pub title: String,
    pub content: String,
    /// Name of the owning [`User`].
    pub owner: String,
    /// Latest progress percentage, copied from the most recent [`Update`].
    pub progress: u8,
    pub inserted: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Project {
    /// A skeleton project: only the caller-supplied fields are set.
    pub fn new(owner: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    /// Fill `name` from the title when the caller left it empty.
    pub fn derive_name(&mut self) {
        if self.name.is_empty() {
            self.name = slugify(&self.title);
        }
    }

    /// Business-rule check, run after [`Project::derive_name`].
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let name_too_long = self.name.len() > MAX_NAME_LEN;
        let derived = self.name == slugify(&self.title);

        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        } else if self.name.is_empty() {
            errors.add("title", "Title must contain at least one letter or digit");
        } else if name_too_long && derived {
            errors.add("title", format!("Title is too long (at most {MAX_NAME_LEN} letters and digits)"));
        }

        if self.name.contains(RESERVED_SEPARATOR) {
            errors.add("name", "Name must not contain '.'");
        } else if name_too_long && !derived {
            errors.add("name", format!("Name must be at most {MAX_NAME_LEN} bytes"));
        }

        if self.owner.is_empty() {
            errors.add("owner", "Owner is required");
        } else if self.owner.contains(RESERVED_SEPARATOR) {
            errors.add("owner", "Owner must not contain '.'");
        } else if self.owner.len() > MAX_NAME_LEN {
            errors.add("owner", format!("Owner must be at most {MAX_NAME_LEN} bytes"));
        }

        if self.progress > MAX_PROGRESS {
            errors.add("progress", format!("Progress must be at most {MAX_PROGRESS}"));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A timestamped progress note on one project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Update {
    pub status: String,
    /// Progress percentage at the time of the update.
    pub progress: u8,
    pub inserted: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Update {
    pub fn new(progress: u8, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            progress,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.status.trim().is_empty() {
            errors.add("status", "Status is required");
        }
        if self.progress > MAX_PROGRESS {
            errors.add("progress", format!("Progress must be at most {MAX_PROGRESS}"));
        }
        errors
    }
}
