//! # JwtSessionProvider
//!
//! HS256 validation of session bearer tokens minted by the external
//! identity provider. Claims carry the user id in `sub` and an `exp`.
//! Anything that fails validation resolves to no session — the identity
//! resolver degrades it to anonymous rather than erroring.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{Result, SessionProvider};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub struct JwtSessionProvider {
    secret: SecretString,
}

impl JwtSessionProvider {
    pub fn new(secret: SecretString) -> Self {
        JwtSessionProvider { secret }
    }

    /// Mint a session token. Exists for the seed binary and the test
    /// suites; production tokens come from the identity provider itself.
    pub fn issue_session_token(&self, user_id: Uuid, ttl_hours: i64) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .expect("HS256 encoding cannot fail with a valid secret")
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn resolve(&self, bearer_token: &str) -> Result<Option<Uuid>> {
        let decoded = decode::<Claims>(
            bearer_token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::default(),
        );
        match decoded {
            Ok(data) => Ok(Uuid::parse_str(&data.claims.sub).ok()),
            Err(err) => {
                tracing::debug!(error = %err, "session token failed validation");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtSessionProvider {
        JwtSessionProvider::new(SecretString::from("test-secret"))
    }

    #[tokio::test]
    async fn round_trips_a_user_id() {
        let p = provider();
        let user_id = Uuid::now_v7();
        let token = p.issue_session_token(user_id, 1);
        assert_eq!(p.resolve(&token).await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn expired_tokens_resolve_to_none() {
        let p = provider();
        let token = p.issue_session_token(Uuid::now_v7(), -1);
        assert_eq!(p.resolve(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_resolves_to_none() {
        let p = provider();
        assert_eq!(p.resolve("not.a.jwt").await.unwrap(), None);
        assert_eq!(p.resolve("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn wrong_secret_resolves_to_none() {
        let token = provider().issue_session_token(Uuid::now_v7(), 1);
        let other = JwtSessionProvider::new(SecretString::from("another-secret"));
        assert_eq!(other.resolve(&token).await.unwrap(), None);
    }
}
