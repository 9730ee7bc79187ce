//! # Identity Resolver
//!
//! Turns the credential-bearing header of an inbound request into a
//! [`Principal`]. Bot-shaped bearers go through the credential store and an
//! ACTIVE-only hash lookup; anything else is delegated to the external
//! session collaborator. Absence of both yields `Anonymous`.
//!
//! Malformed credentials never panic: they degrade to `Anonymous` or a
//! typed authentication failure the caller maps to a response code.

use std::sync::Arc;

use domains::{
    AppError, BotIdentity, BotRepo, HumanSession, Principal, Result, SessionProvider, UserRepo,
};

use crate::credentials::CredentialStore;

const BEARER: &str = "Bearer ";

pub struct IdentityResolver {
    credentials: CredentialStore,
    bots: Arc<dyn BotRepo>,
    users: Arc<dyn UserRepo>,
    sessions: Arc<dyn SessionProvider>,
}

impl IdentityResolver {
    pub fn new(
        credentials: CredentialStore,
        bots: Arc<dyn BotRepo>,
        users: Arc<dyn UserRepo>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        IdentityResolver {
            credentials,
            bots,
            users,
            sessions,
        }
    }

    /// Resolve the acting principal from the `Authorization` header value,
    /// if any.
    ///
    /// A bot-shaped token that fails validation or lookup is an
    /// authentication error — a revoked bot fails here, at lookup, so its
    /// failure is indistinguishable from a key that never existed.
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<Principal> {
        let Some(header) = authorization else {
            return Ok(Principal::Anonymous);
        };
        let Some(token) = header.strip_prefix(BEARER) else {
            return Ok(Principal::Anonymous);
        };

        if CredentialStore::looks_like_key(token) {
            return self.resolve_bot(token).await;
        }
        self.resolve_session(token).await
    }

    async fn resolve_bot(&self, token: &str) -> Result<Principal> {
        let Some(hash) = self.credentials.digest(token) else {
            tracing::debug!("rejected malformed bot token before lookup");
            return Err(AppError::Authentication("invalid or missing API key".into()));
        };
        match self.bots.find_active_by_key_hash(&hash).await? {
            Some(bot) => {
                tracing::debug!(bot_id = %bot.id, "resolved bot principal");
                Ok(Principal::Bot(BotIdentity::from(&bot)))
            }
            None => Err(AppError::Authentication("invalid or missing API key".into())),
        }
    }

    async fn resolve_session(&self, token: &str) -> Result<Principal> {
        let Some(user_id) = self.sessions.resolve(token).await? else {
            return Ok(Principal::Anonymous);
        };
        // A session for a user we no longer know about is treated as no
        // session at all.
        match self.users.get(user_id).await? {
            Some(user) => Ok(Principal::Human(HumanSession {
                user_id: user.id,
                role: user.role,
            })),
            None => Ok(Principal::Anonymous),
        }
    }
}
