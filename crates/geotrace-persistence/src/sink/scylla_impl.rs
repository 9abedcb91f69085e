//! ScyllaDB storage sink implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use scylla::Session;
use scylla::frame::response::result::{CqlValue, Row};
use scylla::query::Query;
use scylla::statement::Consistency;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::ClusterConfig;
use crate::error::{Result, SinkError};
use crate::session;
use crate::sink::traits::StorageSink;
use geotrace_domain::{Location, NewUser};

const INSERT_LOCATION_QUERY: &str =
    "INSERT INTO locations (id, lat, lng, timestamp, device) VALUES (?, ?, ?, ?, ?)";

// Keyed by username so the IF NOT EXISTS condition guards registration
// uniqueness and the password lookup hits the partition key.
const INSERT_USER_QUERY: &str = "INSERT INTO users \
    (username, id, creation_time, firstname, lastname, password, email, phone) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS";

const AUTHENTICATION_QUERY: &str = "SELECT password FROM users WHERE username = ?";

/// Production storage sink backed by a ScyllaDB/Cassandra cluster session.
///
/// Owns at most one live session. The session is replaced, never mutated,
/// when reconnecting, and a failed query does not invalidate it — only
/// `connect`/`test_connect` swap the handle. Each sink instance owns its
/// session exclusively; construct separate sinks for separate sessions.
pub struct ScyllaSink {
    config: RwLock<ClusterConfig>,
    session: RwLock<Option<Arc<Session>>>,
}

impl ScyllaSink {
    /// Create a sink from an explicit configuration. No network activity
    /// happens until [`connect`](StorageSink::connect).
    #[must_use]
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config: RwLock::new(config),
            session: RwLock::new(None),
        }
    }

    async fn current_session(&self) -> Result<Arc<Session>> {
        self.session.read().await.clone().ok_or_else(|| {
            error!("operation attempted before connect");
            SinkError::NotConnected
        })
    }

    /// Establish a session from the held configuration unless one is already
    /// live. At most one underlying construction happens for repeated calls;
    /// the write lock is held across construction so racing connects
    /// serialize instead of building and discarding sessions.
    async fn establish_if_absent(&self) -> Result<()> {
        let mut slot = self.session.write().await;
        if slot.is_some() {
            debug!("session already live, skipping reconnect");
            return Ok(());
        }

        let config = self.config.read().await.clone();
        let session = session::establish(&config).await?;
        *slot = Some(Arc::new(session));

        Ok(())
    }
}

#[async_trait]
impl StorageSink for ScyllaSink {
    async fn connect(&self) -> Result<()> {
        self.establish_if_absent().await
    }

    async fn test_connect(
        &self,
        contact_point: &str,
        port: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let parsed = ClusterConfig::from_parts(contact_point, port, username, password)?;

        {
            // Swap in the explicit parameters but keep the sink's keyspace
            // and TLS policy.
            let mut config = self.config.write().await;
            config.contact_point = parsed.contact_point;
            config.port = parsed.port;
            config.username = parsed.username;
            config.password = parsed.password;
        }

        self.establish_if_absent().await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let session = self.current_session().await?;

        // Weakest read consistency: a single replica acknowledgment is
        // enough for a password lookup.
        let mut query = Query::new(AUTHENTICATION_QUERY);
        query.set_consistency(Consistency::One);

        let result = session
            .query_unpaged(query, (username,))
            .await
            .map_err(|e| {
                error!(username = %username, error = %e, "authentication lookup failed");
                SinkError::Query(e.to_string())
            })?;

        let rows = result
            .into_rows_result()
            .map_err(|e| SinkError::Query(e.to_string()))?;

        let stored = rows
            .maybe_first_row::<(String,)>()
            .map_err(|e| SinkError::Query(e.to_string()))?;

        match stored {
            Some((stored_password,)) => Ok(stored_password == password),
            None => {
                error!(username = %username, "authentication lookup matched no record");
                Err(SinkError::UnknownUser {
                    username: username.to_string(),
                })
            }
        }
    }

    async fn insert_location(&self, location: &Location) -> Result<bool> {
        let session = self.current_session().await?;

        session
            .query_unpaged(
                INSERT_LOCATION_QUERY,
                (
                    location.id.as_str(),
                    location.lat,
                    location.lng,
                    location.timestamp,
                    location.device.as_str(),
                ),
            )
            .await
            .map_err(|e| {
                error!(location_id = %location.id, error = %e, "failed to insert location");
                SinkError::Write(e.to_string())
            })?;

        info!(location_id = %location.id, "inserted location event");
        Ok(true)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<bool> {
        let session = self.current_session().await?;

        let id = Uuid::new_v4();
        let creation_time = Utc::now().timestamp();

        let result = session
            .query_unpaged(
                INSERT_USER_QUERY,
                (
                    user.username.as_str(),
                    id,
                    creation_time,
                    user.firstname.as_str(),
                    user.lastname.as_str(),
                    user.password.as_str(),
                    user.email.as_str(),
                    user.phone.as_str(),
                ),
            )
            .await
            .map_err(|e| {
                error!(username = %user.username, error = %e, "failed to insert user");
                SinkError::Write(e.to_string())
            })?;

        // A lightweight-transaction result always carries an [applied]
        // boolean as its first column.
        let rows = result
            .into_rows_result()
            .map_err(|e| SinkError::Write(e.to_string()))?;
        let row = rows
            .first_row::<Row>()
            .map_err(|e| SinkError::Write(e.to_string()))?;
        let applied = matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))));

        if !applied {
            error!(username = %user.username, "user already exists, insert not applied");
            return Err(SinkError::DuplicateUser {
                username: user.username.clone(),
            });
        }

        info!(username = %user.username, "inserted user account");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_location() -> Location {
        Location {
            id: "loc-1".to_string(),
            lat: 37.7,
            lng: -122.4,
            timestamp: 1_700_000_000,
            device: "dev-A".to_string(),
        }
    }

    fn sample_user() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            firstname: "Alice".to_string(),
            lastname: "Liddell".to_string(),
            password: "p@ss".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
        }
    }

    // The session check precedes any query, so these fail without touching
    // the network.
    #[tokio::test]
    async fn operations_fail_fast_before_connect() {
        let sink = ScyllaSink::new(ClusterConfig::default());

        assert!(matches!(
            sink.insert_location(&sample_location()).await,
            Err(SinkError::NotConnected)
        ));
        assert!(matches!(
            sink.insert_user(&sample_user()).await,
            Err(SinkError::NotConnected)
        ));
        assert!(matches!(
            sink.authenticate("alice", "p@ss").await,
            Err(SinkError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_non_numeric_port_before_any_io() {
        let sink = ScyllaSink::new(ClusterConfig::default());

        assert!(matches!(
            sink.test_connect("10.0.0.1", "no-port", "ops", "s3cret").await,
            Err(SinkError::Configuration(_))
        ));
        assert!(matches!(
            sink.insert_location(&sample_location()).await,
            Err(SinkError::NotConnected)
        ));
    }
}
