use thiserror::Error;

/// Errors produced when parsing foundation types from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The string is not a well-formed update identifier.
    #[error("invalid update id {id:?}: {reason}")]
    InvalidUpdateId { id: String, reason: String },
}
