//! quillpress/crates/auth-adapters/src/lib.rs
//!
//! Implementations of the `SessionProvider` port. Human sessions are
//! issued by an external identity provider; this crate only validates the
//! tokens it hands out.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtSessionProvider;
