use std::time::Duration;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The location string names no container at all.
    #[error("location must name at least one container")]
    EmptyLocation,

    /// The location has an empty segment, e.g. `user..project`.
    #[error("location {location:?} contains an empty segment")]
    EmptySegment { location: String },

    /// A segment handed in separately contains the separator.
    #[error("segment {segment:?} must not contain the location separator")]
    InvalidSegment { segment: String },

    /// A segment or leaf key is longer than the engine can index.
    #[error("name of {len} bytes exceeds the {max}-byte limit")]
    NameTooLong { len: usize, max: usize },

    /// A container was requested where a leaf already lives.
    #[error("segment {segment:?} already holds a leaf value")]
    SegmentIsLeaf { segment: String },

    /// A leaf was written where a child container already lives.
    #[error("key {key:?} already names a container")]
    KeyIsContainer { key: String },

    /// Leaf bytes could not be decoded into the expected record shape.
    #[error("cannot decode entry {key:?}: {reason}")]
    Decode { key: String, reason: String },

    /// A record could not be encoded.
    #[error("cannot encode entry {key:?}: {reason}")]
    Encode { key: String, reason: String },

    /// Internal container bookkeeping is damaged.
    #[error("corrupt container reference under {segment:?}")]
    CorruptContainer { segment: String },

    /// The single writer slot stayed busy for longer than the configured wait.
    #[error("timed out after {0:?} waiting for the writer lock")]
    LockTimeout(Duration),

    /// Failure reported by LMDB.
    #[error("engine error: {0}")]
    Engine(#[from] heed::Error),

    /// I/O error while preparing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure taxonomy callers switch on, independent of which layer failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed location.
    EmptyLocation,
    /// Namespace collision between a container and a leaf.
    SegmentIsLeaf,
    /// Requested entity is absent.
    NotFound,
    /// Corrupt or unexpected leaf bytes.
    Decode,
    /// Entity failed field-level business rules.
    Validation,
    /// Transaction, lock, or I/O layer failure.
    EngineFailure,
}

impl StoreError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyLocation
            | Self::EmptySegment { .. }
            | Self::InvalidSegment { .. }
            | Self::NameTooLong { .. } => ErrorKind::EmptyLocation,
            Self::SegmentIsLeaf { .. } | Self::KeyIsContainer { .. } => ErrorKind::SegmentIsLeaf,
            Self::Decode { .. } | Self::Encode { .. } => ErrorKind::Decode,
            Self::CorruptContainer { .. }
            | Self::LockTimeout(_)
            | Self::Engine(_)
            | Self::Io(_) => ErrorKind::EngineFailure,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
