//! # AppError
//!
//! Centralized error handling for the Quillpress ecosystem.
//! Maps domain-specific failures to actionable error types; the HTTP layer
//! maps each variant to a status code and a structured `{ error }` body.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// No resolvable principal for an action requiring one (HTTP 401)
    #[error("authentication required: {0}")]
    Authentication(String),

    /// Principal resolved but lacks permission (HTTP 403)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Entity absent, or access denied where revealing existence would
    /// leak information (HTTP 404)
    #[error("{0} not found")]
    NotFound(String),

    /// Action not valid for the entity's current state (HTTP 400)
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Missing or malformed request fields (HTTP 400)
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate action against a uniqueness constraint (HTTP 409)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down) (HTTP 500)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// A masked or genuine 404 for an entity. Both cases must produce the
    /// same body so unauthorized readers cannot probe for existence.
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(entity.to_string())
    }
}

/// A specialized Result type for Quillpress logic.
pub type Result<T> = std::result::Result<T, AppError>;
