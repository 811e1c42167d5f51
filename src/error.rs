//! Error types for lazylinq
//!
//! Every enumeration yields `QueryResult<T>` items; the first `Err` aborts the
//! enumeration it was produced in.

/// Main error type for query operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Rejected query configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Two keys had no defined ordering between them
    #[error("Cannot compare values of type `{type_name}`: no ordering defined between them")]
    Incomparable { type_name: &'static str },
    /// A buffering operator outgrew the configured buffer limit
    #[error("{operator} exceeded the buffer limit of {limit} elements")]
    CapacityExceeded { operator: &'static str, limit: usize },
    /// `single` found more than one matching element
    #[error("Sequence contains more than one matching element")]
    MoreThanOneElement,
    /// The receiving side of an output channel was dropped
    #[error("Output channel closed")]
    ChannelClosed,
    /// Fault raised by a user function or a source
    #[error("Query error: {0}")]
    Custom(String),
}

impl QueryError {
    pub fn custom(msg: impl Into<String>) -> Self {
        QueryError::Custom(msg.into())
    }

    /// Comparison failure for keys of type `K`.
    pub fn incomparable<K: ?Sized>() -> Self {
        QueryError::Incomparable {
            type_name: std::any::type_name::<K>(),
        }
    }
}

impl From<futures::channel::mpsc::SendError> for QueryError {
    fn from(_: futures::channel::mpsc::SendError) -> Self {
        QueryError::ChannelClosed
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
