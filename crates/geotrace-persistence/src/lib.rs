//! # Geotrace Persistence Library
//!
//! Storage sink layer for the geotrace location-event pipeline: the single
//! write/read path between the application layer and a ScyllaDB/Cassandra
//! cluster.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  StorageSink Trait                           │
//! │       (connect / authenticate / insert operations)           │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      ScyllaSink         │   │        MemorySink            │
//! │  (cluster session)      │   │   (tests, local dev)         │
//! └─────────────────────────┘   └──────────────────────────────┘
//!              │
//!              ▼
//! ┌─────────────────────────┐
//! │    Session Provider     │
//! │  (TLS, auth, timeouts)  │
//! └─────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geotrace_persistence::{ClusterConfig, ScyllaSink, StorageSink};
//!
//! // Environment is read only at the process boundary.
//! let config = ClusterConfig::from_env()?;
//! let sink = ScyllaSink::new(config);
//!
//! sink.connect().await?;
//! sink.insert_location(&location).await?;
//! let ok = sink.authenticate("alice", "p@ss").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod session;
pub mod sink;

// Re-export commonly used types
pub use config::ClusterConfig;
pub use error::{Result, SinkError};
pub use sink::{MemorySink, ScyllaSink, StorageSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
