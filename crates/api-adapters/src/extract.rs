//! Principal extraction. Handlers declare `Identity(principal)` and the
//! resolver runs once per request off the `Authorization` header.
//!
//! A bot-shaped token that fails validation rejects the request with 401
//! here; absent or session-shaped-but-unknown credentials flow through as
//! `Anonymous` and are judged by the authorization matrix instead.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domains::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub struct Identity(pub Principal);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let principal = state.identity.resolve(header).await?;
        Ok(Identity(principal))
    }
}
