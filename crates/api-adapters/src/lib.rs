//! quillpress/crates/api-adapters/src/lib.rs
//!
//! The HTTP edge: axum routers and handlers, the principal extractor,
//! error-to-status mapping, DTOs, and request metrics. Handlers stay thin
//! — resolve the principal, call a service, shape the response.

#[cfg(feature = "web-axum")]
pub mod dto;
#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
