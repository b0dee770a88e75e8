//! # api-adapters
//!
//! The HTTP surface of reelshelf. Handlers translate requests into service
//! calls and `DomainError`s into JSON error envelopes; nothing here decides
//! business rules.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use router::{router, HttpConfig};
#[cfg(feature = "web-axum")]
pub use state::AppState;
