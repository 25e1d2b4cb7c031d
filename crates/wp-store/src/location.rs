//! Dotted locations naming a chain of nested containers.
//!
//! `user.chilts.project` is three segments: `user`, `chilts`, `project`.
//! A location always has at least one segment and no segment is empty or
//! contains the separator.

use std::fmt;
use std::str::FromStr;

use crate::container::MAX_NAME_LEN;
use crate::error::{StoreError, StoreResult};

/// Reserved character joining segments in the textual form.
pub const SEPARATOR: char = '.';

/// A parsed, validated location.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    /// Parse the dotted textual form.
    ///
    /// # Examples
    ///
    /// ```
    /// use wp_store::Location;
    ///
    /// let location = Location::parse("user.chilts.project").unwrap();
    /// assert_eq!(location.segments(), ["user", "chilts", "project"]);
    /// assert!(Location::parse("").is_err());
    /// assert!(Location::parse("user..project").is_err());
    /// ```
    pub fn parse(location: &str) -> StoreResult<Self> {
        if location.is_empty() {
            return Err(StoreError::EmptyLocation);
        }
        let segments: Vec<String> = location.split(SEPARATOR).map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(StoreError::EmptySegment {
                location: location.to_string(),
            });
        }
        for segment in &segments {
            check_name_len(segment)?;
        }
        Ok(Self { segments })
    }

    /// Build a location from individual segments, e.g. a user name taken
    /// from a form. Each segment is validated on its own.
    pub fn from_segments<I, S>(segments: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut location = Self {
            segments: Vec::new(),
        };
        for segment in segments {
            location.push(segment)?;
        }
        if location.segments.is_empty() {
            return Err(StoreError::EmptyLocation);
        }
        Ok(location)
    }

    /// A new location one level below this one.
    pub fn child(&self, segment: impl Into<String>) -> StoreResult<Self> {
        let mut child = self.clone();
        child.push(segment)?;
        Ok(child)
    }

    fn push(&mut self, segment: impl Into<String>) -> StoreResult<()> {
        let segment = segment.into();
        if segment.is_empty() {
            let mut partial = self.to_string();
            partial.push(SEPARATOR);
            return Err(StoreError::EmptySegment { location: partial });
        }
        if segment.contains(SEPARATOR) {
            return Err(StoreError::InvalidSegment { segment });
        }
        check_name_len(&segment)?;
        self.segments.push(segment);
        Ok(())
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (always at least one).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The innermost segment.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

/// Reject a segment or leaf key the engine cannot index.
pub(crate) fn check_name_len(name: &str) -> StoreResult<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}

impl FromStr for Location {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Location {
    type Error = StoreError;

    fn try_from(value: &str) -> StoreResult<Self> {
        Self::parse(value)
    }
}
