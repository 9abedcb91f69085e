//! # Session Provider
//!
//! Translates cluster credentials and network parameters into a live driver
//! session. Pure construction: the provider holds no state between calls.
//!
//! Fixed by design, not caller-tunable: password authentication, TLS on the
//! transport, and 10 second connect/request timeouts. The driver negotiates
//! the wire protocol revision and connects only to the given contact point.

use std::time::Duration;

use openssl::ssl::{SslContext, SslContextBuilder, SslMethod, SslVerifyMode};
use scylla::transport::ExecutionProfile;
use scylla::{Session, SessionBuilder};
use tracing::{debug, error};

use crate::config::ClusterConfig;
use crate::error::{Result, SinkError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Open an authenticated, TLS-wrapped session against the cluster.
///
/// # Errors
///
/// Returns [`SinkError::Connection`] when the transport, authentication, or
/// TLS handshake fails. No session is retained on failure.
pub async fn establish(config: &ClusterConfig) -> Result<Session> {
    debug!(
        contact_point = %config.contact_point,
        port = config.port,
        username = %config.username,
        "establishing cluster session"
    );

    let ssl_context = build_ssl_context(config.verify_tls_certificates)?;

    let profile = ExecutionProfile::builder()
        .request_timeout(Some(REQUEST_TIMEOUT))
        .build();

    let session = SessionBuilder::new()
        .known_node(format!("{}:{}", config.contact_point, config.port))
        .user(config.username.as_str(), config.password.as_str())
        .connection_timeout(CONNECT_TIMEOUT)
        .ssl_context(Some(ssl_context))
        .default_execution_profile_handle(profile.into_handle())
        .use_keyspace(config.keyspace.as_str(), false)
        .build()
        .await
        .map_err(|e| {
            error!(contact_point = %config.contact_point, error = %e, "cluster session failed");
            SinkError::from(e)
        })?;

    Ok(session)
}

fn build_ssl_context(verify_certificates: bool) -> Result<SslContext> {
    let mut builder = SslContextBuilder::new(SslMethod::tls())
        .map_err(|e| SinkError::Connection(format!("TLS context setup failed: {e}")))?;

    let mode = if verify_certificates {
        SslVerifyMode::PEER
    } else {
        SslVerifyMode::NONE
    };
    builder.set_verify(mode);

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_context_builds_in_both_verify_modes() {
        assert!(build_ssl_context(true).is_ok());
        assert!(build_ssl_context(false).is_ok());
    }
}
