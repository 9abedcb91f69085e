//! Storage sink error types

use thiserror::Error;

/// Storage sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Malformed connection parameters; raised before any network I/O.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The cluster session could not be established. No session is retained.
    #[error("cluster connection failed: {0}")]
    Connection(String),

    /// An operation was attempted with no live session held. Caller misuse:
    /// `connect` (or `test_connect`) was never called, or its failure was
    /// ignored.
    #[error("not connected: call connect before issuing operations")]
    NotConnected,

    /// An insert was rejected or failed at the transport level.
    #[error("write failed: {0}")]
    Write(String),

    /// A conditional user insert found an existing row for the same username.
    #[error("user '{username}' already exists")]
    DuplicateUser { username: String },

    /// An authentication lookup matched no stored record.
    #[error("no stored record for user '{username}'")]
    UnknownUser { username: String },

    /// A read failed at the transport or row-decode stage.
    #[error("query failed: {0}")]
    Query(String),
}

impl From<scylla::transport::errors::NewSessionError> for SinkError {
    fn from(err: scylla::transport::errors::NewSessionError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<scylla::transport::errors::QueryError> for SinkError {
    fn from(err: scylla::transport::errors::QueryError) -> Self {
        Self::Query(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_and_write_are_distinct() {
        let dup = SinkError::DuplicateUser {
            username: "alice".to_string(),
        };
        assert!(matches!(dup, SinkError::DuplicateUser { .. }));
        assert!(!matches!(dup, SinkError::Write(_)));
    }

    #[test]
    fn unknown_user_names_the_username() {
        let err = SinkError::UnknownUser {
            username: "nobody".to_string(),
        };
        assert!(err.to_string().contains("nobody"));
    }
}
