//! reelshelf/crates/domains/src/lib.rs
//!
//! Entities, value types and port traits for reelshelf.
//! Nothing in this crate performs I/O; adapters implement the ports.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
