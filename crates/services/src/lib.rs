//! quillpress/crates/services/src/lib.rs
//!
//! Application logic over the domain ports: the credential store, identity
//! resolution, the authorization matrix, the post lifecycle engine, and the
//! services that drive them against the persistence gateway.
//!
//! Every mutating request flows resolve → authorize → transition → persist.

pub mod authorize;
pub mod bots;
pub mod comments;
pub mod credentials;
pub mod engagement;
pub mod identity;
pub mod lifecycle;
pub mod posts;
pub mod slug;
