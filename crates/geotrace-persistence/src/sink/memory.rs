//! In-memory storage sink.
//!
//! Implements the full [`StorageSink`] contract against process-local maps.
//! Used as the swap-in backend for deterministic tests and local development;
//! it mirrors the cluster sink's semantics exactly, including the
//! connection lifecycle, the unconditional location write, and the
//! conditional user insert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::config::ClusterConfig;
use crate::error::{Result, SinkError};
use crate::sink::traits::StorageSink;
use geotrace_domain::{Location, NewUser, UserRecord};

/// Storage sink backed by in-process maps.
///
/// Locations are keyed by event id (duplicate ids overwrite); users are
/// keyed by username (duplicates are rejected). Counts underlying session
/// constructions separately from `connect` calls so lifecycle idempotence
/// is observable from tests.
#[derive(Default)]
pub struct MemorySink {
    connected: AtomicBool,
    refuse_connections: AtomicBool,
    sessions_built: AtomicUsize,
    locations: Mutex<HashMap<String, Location>>,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent connection attempts fail, simulating an unreachable
    /// contact point.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Number of underlying session constructions performed so far.
    #[must_use]
    pub fn sessions_built(&self) -> usize {
        self.sessions_built.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Read back a stored location event by id.
    pub async fn location(&self, id: &str) -> Option<Location> {
        self.locations.lock().await.get(id).cloned()
    }

    /// Read back a stored user account by username.
    pub async fn user(&self, username: &str) -> Option<UserRecord> {
        self.users.lock().await.get(username).cloned()
    }

    fn establish_if_absent(&self) -> Result<()> {
        if self.refuse_connections.load(Ordering::SeqCst) && !self.connected.load(Ordering::SeqCst)
        {
            error!("in-memory cluster refused the connection");
            return Err(SinkError::Connection(
                "contact point unreachable".to_string(),
            ));
        }

        // Exactly one of any number of racing connects flips the flag and
        // constructs the session.
        if self
            .connected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.sessions_built.fetch_add(1, Ordering::SeqCst);
        } else {
            debug!("session already live, skipping reconnect");
        }

        Ok(())
    }

    fn require_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            error!("operation attempted before connect");
            Err(SinkError::NotConnected)
        }
    }
}

#[async_trait]
impl StorageSink for MemorySink {
    async fn connect(&self) -> Result<()> {
        self.establish_if_absent()
    }

    async fn test_connect(
        &self,
        contact_point: &str,
        port: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        // Same parameter validation as the cluster sink.
        ClusterConfig::from_parts(contact_point, port, username, password)?;
        self.establish_if_absent()
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        self.require_connected()?;

        let users = self.users.lock().await;
        match users.get(username) {
            Some(record) => Ok(record.password == password),
            None => Err(SinkError::UnknownUser {
                username: username.to_string(),
            }),
        }
    }

    async fn insert_location(&self, location: &Location) -> Result<bool> {
        self.require_connected()?;

        self.locations
            .lock()
            .await
            .insert(location.id.clone(), location.clone());
        Ok(true)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<bool> {
        self.require_connected()?;

        let mut users = self.users.lock().await;
        if users.contains_key(&user.username) {
            return Err(SinkError::DuplicateUser {
                username: user.username.clone(),
            });
        }

        users.insert(user.username.clone(), UserRecord::from_new(user));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn sample_location() -> Location {
        Location {
            id: "loc-1".to_string(),
            lat: 37.7,
            lng: -122.4,
            timestamp: 1_700_000_000,
            device: "dev-A".to_string(),
        }
    }

    fn sample_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            firstname: "Alice".to_string(),
            lastname: "Liddell".to_string(),
            password: password.to_string(),
            email: "alice@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn operations_before_connect_fail_fast() {
        let sink = MemorySink::new();

        assert!(matches!(
            sink.insert_location(&sample_location()).await,
            Err(SinkError::NotConnected)
        ));
        assert!(matches!(
            sink.insert_user(&sample_user("alice", "p@ss")).await,
            Err(SinkError::NotConnected)
        ));
        assert!(matches!(
            sink.authenticate("alice", "p@ss").await,
            Err(SinkError::NotConnected)
        ));
        assert_eq!(sink.sessions_built(), 0);
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let sink = MemorySink::new();

        assert_ok!(sink.connect().await);
        assert_ok!(sink.connect().await);

        assert_eq!(sink.sessions_built(), 1);
    }

    #[tokio::test]
    async fn concurrent_connects_build_one_session() {
        let sink = Arc::new(MemorySink::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move { sink.connect().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(sink.sessions_built(), 1);
    }

    #[tokio::test]
    async fn failed_connect_leaves_the_sink_unconnected() {
        let sink = MemorySink::new();
        sink.refuse_connections(true);

        assert!(matches!(
            sink.test_connect("10.0.0.1", "9042", "ops", "s3cret").await,
            Err(SinkError::Connection(_))
        ));
        assert!(!sink.is_connected());

        // Still caller misuse, not a stale-session error.
        assert!(matches!(
            sink.insert_location(&sample_location()).await,
            Err(SinkError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_non_numeric_port() {
        let sink = MemorySink::new();

        assert!(matches!(
            sink.test_connect("10.0.0.1", "no-port", "ops", "s3cret").await,
            Err(SinkError::Configuration(_))
        ));
        assert!(!sink.is_connected());
    }

    #[tokio::test]
    async fn duplicate_location_id_overwrites() {
        let sink = MemorySink::new();
        sink.connect().await.unwrap();

        let first = sample_location();
        let mut second = sample_location();
        second.device = "dev-B".to_string();

        assert!(sink.insert_location(&first).await.unwrap());
        assert!(sink.insert_location(&second).await.unwrap());

        let stored = sink.location("loc-1").await.unwrap();
        assert_eq!(stored.device, "dev-B");
    }

    #[tokio::test]
    async fn inserted_location_round_trips_exactly() {
        let sink = MemorySink::new();
        sink.connect().await.unwrap();

        let location = sample_location();
        sink.insert_location(&location).await.unwrap();

        assert_eq!(sink.location("loc-1").await.unwrap(), location);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_distinctly() {
        let sink = MemorySink::new();
        sink.connect().await.unwrap();

        assert!(sink.insert_user(&sample_user("alice", "p@ss")).await.unwrap());

        let err = sink
            .insert_user(&sample_user("alice", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::DuplicateUser { .. }));
        assert!(!matches!(err, SinkError::Write(_)));
    }

    #[tokio::test]
    async fn insert_user_generates_identity_server_side() {
        let sink = MemorySink::new();
        sink.connect().await.unwrap();

        sink.insert_user(&sample_user("alice", "p@ss")).await.unwrap();

        let record = sink.user("alice").await.unwrap();
        assert!(!record.id.is_nil());
        assert!(record.creation_time > 0);
    }

    #[tokio::test]
    async fn authenticate_compares_exactly() {
        let sink = MemorySink::new();
        sink.connect().await.unwrap();
        sink.insert_user(&sample_user("alice", "p@ss")).await.unwrap();

        assert!(sink.authenticate("alice", "p@ss").await.unwrap());
        assert!(!sink.authenticate("alice", "wrong").await.unwrap());
        // Case-sensitive, no normalization.
        assert!(!sink.authenticate("alice", "P@SS").await.unwrap());

        assert!(matches!(
            sink.authenticate("nobody", "x").await,
            Err(SinkError::UnknownUser { .. })
        ));
    }

    #[tokio::test]
    async fn sink_is_usable_behind_the_trait_object() {
        let sink: Arc<dyn StorageSink> = Arc::new(MemorySink::new());

        sink.connect().await.unwrap();
        assert!(sink.insert_location(&sample_location()).await.unwrap());
    }
}
