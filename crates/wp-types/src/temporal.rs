use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Source of the current UTC time used to stamp `inserted` / `updated`.
pub trait Clock: Send + Sync {
    /// The current instant, in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used to make timestamp-derived
/// keys and ordering reproducible.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock to an explicit instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = instant;
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Fixed-width rendering: every component is zero-padded and the fraction
/// always has nine digits, so byte order equals chronological order.
const UPDATE_ID_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

/// Key of an [`Update`](crate::Update) within its project, derived from the
/// update's insertion timestamp.
///
/// Ordering: lexicographic on the rendered string, which is chronological
/// for all years `0000..=9999`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UpdateId {
    id: String,
    inserted: DateTime<Utc>,
}

impl UpdateId {
    /// Render the identifier for an insertion timestamp.
    pub fn from_timestamp(inserted: DateTime<Utc>) -> Self {
        Self {
            id: inserted.format(UPDATE_ID_FORMAT).to_string(),
            inserted,
        }
    }

    /// Parse an identifier previously produced by [`UpdateId::from_timestamp`].
    pub fn parse(id: &str) -> Result<Self, TypeError> {
        let parsed = NaiveDateTime::parse_from_str(id, UPDATE_ID_FORMAT).map_err(|e| {
            TypeError::InvalidUpdateId {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        let canonical = Self::from_timestamp(parsed.and_utc());
        if canonical.id != id {
            return Err(TypeError::InvalidUpdateId {
                id: id.to_string(),
                reason: format!("not in canonical form, expected {canonical}"),
            });
        }
        Ok(canonical)
    }

    /// The insertion timestamp this identifier encodes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.inserted
    }

    /// The identifier as stored.
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl TryFrom<String> for UpdateId {
    type Error = TypeError;

    fn try_from(id: String) -> Result<Self, TypeError> {
        Self::parse(&id)
    }
}

impl From<UpdateId> for String {
    fn from(id: UpdateId) -> Self {
        id.id
    }
}

impl fmt::Debug for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateId({})", self.id)
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl AsRef<str> for UpdateId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}
