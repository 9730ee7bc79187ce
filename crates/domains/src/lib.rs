//! quillpress/crates/domains/src/lib.rs
//!
//! The central domain model and interface definitions for Quillpress:
//! entities, the resolved request principal, the error taxonomy, and the
//! ports every adapter implements.

pub mod error;
pub mod models;
pub mod ports;
pub mod principal;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
pub use principal::*;
