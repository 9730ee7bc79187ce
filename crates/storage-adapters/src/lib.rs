//! quillpress/crates/storage-adapters/src/lib.rs
//!
//! Persistence-gateway implementations. `MemoryGateway` backs tests and
//! the dev profile; `PostgresGateway` (feature `db-postgres`) is the
//! production store. Both honor the same contract: unique slug and
//! key-hash constraints, compare-and-set status transitions, relaxed view
//! counters.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryGateway;

#[cfg(feature = "db-postgres")]
pub use postgres::PostgresGateway;
