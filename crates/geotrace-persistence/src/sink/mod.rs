//! # Sink Module
//!
//! Storage sink implementations for location events and user accounts.

pub mod memory;
pub mod scylla_impl;
pub mod traits;

pub use memory::MemorySink;
pub use scylla_impl::ScyllaSink;
pub use traits::StorageSink;
