//! # Cluster Configuration
//!
//! Explicit connection configuration for the storage sink. The environment
//! is read only in `ClusterConfig::from_env`, a thin adapter intended for the
//! process boundary; the sink itself is constructed from the struct and never
//! touches the environment.

use std::env;
use std::fmt;

use crate::error::{Result, SinkError};

/// Environment variable names consumed by [`ClusterConfig::from_env`].
pub const ENV_CONTACT_POINT: &str = "GEOTRACE_CONTACT_POINT";
pub const ENV_PORT: &str = "GEOTRACE_PORT";
pub const ENV_USER: &str = "GEOTRACE_USER";
pub const ENV_PASSWORD: &str = "GEOTRACE_PASSWORD";
pub const ENV_KEYSPACE: &str = "GEOTRACE_KEYSPACE";
pub const ENV_TLS_INSECURE: &str = "GEOTRACE_TLS_INSECURE";

const DEFAULT_KEYSPACE: &str = "geotrace";

/// Cluster connection configuration.
///
/// Credentials live only as long as the owning sink; the password is never
/// logged and is redacted from the `Debug` output.
#[derive(Clone)]
pub struct ClusterConfig {
    /// Bootstrap address of the cluster (single managed endpoint).
    pub contact_point: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub keyspace: String,
    /// Verify the cluster's TLS certificate chain. Disabling this is an
    /// explicit trust-all opt-out for managed gateway endpoints that present
    /// unverifiable certificates.
    pub verify_tls_certificates: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            contact_point: "127.0.0.1".to_string(),
            port: 9042,
            username: String::new(),
            password: String::new(),
            keyspace: DEFAULT_KEYSPACE.to_string(),
            verify_tls_certificates: true,
        }
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("contact_point", &self.contact_point)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("keyspace", &self.keyspace)
            .field("verify_tls_certificates", &self.verify_tls_certificates)
            .finish()
    }
}

impl ClusterConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Configuration`] when a required variable is
    /// missing or the port does not parse as a non-negative integer. Fails
    /// before any network I/O.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// `from_env` over an injectable variable lookup, so the adapter logic is
    /// testable without mutating process state.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let contact_point = require_var(&lookup, ENV_CONTACT_POINT)?;
        let port = require_var(&lookup, ENV_PORT)?;
        let username = require_var(&lookup, ENV_USER)?;
        let password = require_var(&lookup, ENV_PASSWORD)?;

        let mut config = Self::from_parts(&contact_point, &port, &username, &password)?;

        if let Some(keyspace) = lookup(ENV_KEYSPACE) {
            config.keyspace = keyspace;
        }
        if let Some(v) = lookup(ENV_TLS_INSECURE) {
            config.verify_tls_certificates = !(v == "true" || v == "1");
        }

        Ok(config)
    }

    /// Build a configuration from explicit parameters, with the port still in
    /// string form. Shared by `from_env` and the sink's `test_connect` path.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Configuration`] when the port is non-numeric or
    /// out of range.
    pub fn from_parts(
        contact_point: &str,
        port: &str,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let port = parse_port(port)?;

        Ok(Self {
            contact_point: contact_point.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        })
    }
}

fn require_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| SinkError::Configuration(format!("{name} is not set")))
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|e| SinkError::Configuration(format!("invalid port '{port}': {e}")))
}
