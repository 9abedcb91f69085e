//! # Storage Sink Contract
//!
//! Abstract sink interface for the write/read path between the application
//! layer and the storage cluster. Implementations can be swapped for
//! different backends (ScyllaDB, in-memory, etc.).

use async_trait::async_trait;

use crate::error::Result;
use geotrace_domain::{Location, NewUser};

/// The single write/read path to the storage cluster.
///
/// A sink owns at most one live session at a time. `connect` (or
/// `test_connect`) must succeed before any other operation; every operation
/// checks for a live session and fails fast with
/// [`SinkError::NotConnected`](crate::SinkError::NotConnected) otherwise.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Establish the cluster session from the sink's held configuration.
    ///
    /// Idempotent: a call while a healthy session is held is a no-op. On
    /// failure no session is retained and subsequent operations keep failing
    /// fast rather than silently retrying.
    async fn connect(&self) -> Result<()>;

    /// Same lifecycle as [`connect`](StorageSink::connect) but with
    /// explicitly supplied parameters instead of the held configuration.
    /// Intended for deterministic integration tests against an ephemeral
    /// cluster instance. The port arrives in string form and must parse as a
    /// non-negative integer.
    async fn test_connect(
        &self,
        contact_point: &str,
        port: &str,
        username: &str,
        password: &str,
    ) -> Result<()>;

    /// Compare the supplied password against the stored value for `username`.
    ///
    /// Byte-exact string equality; this layer performs no hashing or
    /// normalization. A username with no stored record is an error
    /// ([`SinkError::UnknownUser`](crate::SinkError::UnknownUser)), not
    /// `Ok(false)`.
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool>;

    /// Write one location event. Unconditional: a duplicate `id` silently
    /// overwrites the earlier row.
    async fn insert_location(&self, location: &Location) -> Result<bool>;

    /// Write one user account, generating the row id and creation time
    /// server-side. Conditional on no existing row for the username;
    /// a collision reports
    /// [`SinkError::DuplicateUser`](crate::SinkError::DuplicateUser),
    /// distinct from a transport-level write failure.
    async fn insert_user(&self, user: &NewUser) -> Result<bool>;
}
