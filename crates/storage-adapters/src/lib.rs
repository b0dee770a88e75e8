//! storage-adapters/src/lib.rs
//!
//! Persistence and file-storage adapters. Each backend is feature-gated so
//! the binary only compiles what it wires; the in-memory store is always
//! available.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

#[cfg(feature = "media-local")]
pub mod media_local;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::{PgStore, PoolSettings};

#[cfg(feature = "media-local")]
pub use media_local::LocalMediaStore;
