//! # Bot Service
//!
//! Owner-facing bot management: registration (the only moment the
//! plaintext key exists), settings, key regeneration, and soft revocation.
//! All of it is session-gated; bots cannot manage bots.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AppError, Bot, BotPatch, BotRepo, BotStats, BotStatus, Principal, Result, User, UserRepo,
};

use crate::credentials::CredentialStore;

/// New bots may draft and comment, but publishing and review-bypass are
/// opt-in by the owner.
const DEFAULT_CAN_DRAFT: bool = true;
const DEFAULT_CAN_PUBLISH: bool = false;
const DEFAULT_CAN_COMMENT: bool = true;

#[derive(Debug, Clone)]
pub struct NewBot {
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// Registration result; `api_key` is shown once and never again.
#[derive(Debug, Clone)]
pub struct CreatedBot {
    pub bot: Bot,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct RegeneratedKey {
    pub api_key: String,
    pub hint: String,
}

#[derive(Debug, Clone)]
pub struct RevokeReceipt {
    pub bot: Bot,
    pub already_revoked: bool,
}

/// A bot's own profile, served to `/me`.
#[derive(Debug, Clone)]
pub struct BotProfile {
    pub bot: Bot,
    pub owner: Option<User>,
    pub stats: BotStats,
}

pub struct BotService {
    bots: Arc<dyn BotRepo>,
    users: Arc<dyn UserRepo>,
    credentials: CredentialStore,
}

impl BotService {
    pub fn new(
        bots: Arc<dyn BotRepo>,
        users: Arc<dyn UserRepo>,
        credentials: CredentialStore,
    ) -> Self {
        BotService {
            bots,
            users,
            credentials,
        }
    }

    pub async fn create(&self, principal: &Principal, new: NewBot) -> Result<CreatedBot> {
        let owner_id = self.require_session(principal)?;
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("bot name is required".into()));
        }

        let key = self.credentials.issue();
        let bot = Bot {
            id: Uuid::now_v7(),
            name: new.name.trim().to_string(),
            description: new.description,
            avatar: new.avatar,
            api_key_hash: key.hash,
            api_key_hint: key.hint,
            trusted: false,
            status: BotStatus::Active,
            can_draft: DEFAULT_CAN_DRAFT,
            can_publish: DEFAULT_CAN_PUBLISH,
            can_comment: DEFAULT_CAN_COMMENT,
            owner_id,
            created_at: Utc::now(),
        };
        self.bots.insert(&bot).await?;
        tracing::info!(bot_id = %bot.id, hint = %bot.api_key_hint, "bot registered");
        Ok(CreatedBot {
            bot,
            api_key: key.plaintext,
        })
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<(Bot, BotStats)>> {
        let owner_id = self.require_session(principal)?;
        let bots = self.bots.list_by_owner(owner_id).await?;
        let mut out = Vec::with_capacity(bots.len());
        for bot in bots {
            let stats = self.bots.stats(bot.id).await?;
            out.push((bot, stats));
        }
        Ok(out)
    }

    /// Owner read. A bot belonging to someone else is a 404, not a 403.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<(Bot, BotStats)> {
        let bot = self.owned(principal, id).await?;
        let stats = self.bots.stats(bot.id).await?;
        Ok((bot, stats))
    }

    /// Owner settings update. Key material and status have dedicated
    /// operations; a patch can never resurrect a revoked bot.
    pub async fn update(&self, principal: &Principal, id: Uuid, patch: BotPatch) -> Result<Bot> {
        let bot = self.owned(principal, id).await?;
        self.bots
            .update(bot.id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("Bot"))
    }

    /// Swap key material in one write: the old key stops authenticating the
    /// moment this returns.
    pub async fn regenerate_key(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<RegeneratedKey> {
        let bot = self.owned(principal, id).await?;
        let key = self.credentials.issue();
        self.bots
            .set_key(bot.id, &key.hash, &key.hint)
            .await?
            .ok_or_else(|| AppError::not_found("Bot"))?;
        tracing::info!(bot_id = %bot.id, hint = %key.hint, "bot API key regenerated");
        Ok(RegeneratedKey {
            api_key: key.plaintext,
            hint: key.hint,
        })
    }

    /// Soft delete. The row stays for referential history; only the status
    /// flips, and with it every credential check.
    pub async fn revoke(&self, principal: &Principal, id: Uuid) -> Result<RevokeReceipt> {
        let bot = self.owned(principal, id).await?;
        if bot.status == BotStatus::Revoked {
            return Ok(RevokeReceipt {
                bot,
                already_revoked: true,
            });
        }
        let bot = self
            .bots
            .set_status(bot.id, BotStatus::Revoked)
            .await?
            .ok_or_else(|| AppError::not_found("Bot"))?;
        tracing::info!(bot_id = %bot.id, "bot revoked");
        Ok(RevokeReceipt {
            bot,
            already_revoked: false,
        })
    }

    /// The authenticated bot's own profile.
    pub async fn profile(&self, principal: &Principal) -> Result<BotProfile> {
        let Principal::Bot(identity) = principal else {
            return Err(AppError::Authentication(
                "invalid or missing API key".into(),
            ));
        };
        let bot = self
            .bots
            .get(identity.id)
            .await?
            .ok_or_else(|| AppError::Authentication("invalid or missing API key".into()))?;
        let owner = self.users.get(bot.owner_id).await?;
        let stats = self.bots.stats(bot.id).await?;
        Ok(BotProfile { bot, owner, stats })
    }

    fn require_session(&self, principal: &Principal) -> Result<Uuid> {
        match principal {
            Principal::Human(session) => Ok(session.user_id),
            _ => Err(AppError::Authentication("session required".into())),
        }
    }

    async fn owned(&self, principal: &Principal, id: Uuid) -> Result<Bot> {
        let owner_id = self.require_session(principal)?;
        match self.bots.get(id).await? {
            Some(bot) if bot.owner_id == owner_id => Ok(bot),
            // someone else's bot looks exactly like no bot at all
            _ => Err(AppError::not_found("Bot")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{HumanSession, MockBotRepo, MockUserRepo, UserRole};

    fn human(user_id: Uuid) -> Principal {
        Principal::Human(HumanSession {
            user_id,
            role: UserRole::Member,
        })
    }

    fn service(bots: MockBotRepo) -> BotService {
        BotService::new(
            Arc::new(bots),
            Arc::new(MockUserRepo::new()),
            CredentialStore::new(),
        )
    }

    #[tokio::test]
    async fn create_returns_plaintext_exactly_once() {
        let mut bots = MockBotRepo::new();
        bots.expect_insert().returning(|_| Ok(()));

        let created = service(bots)
            .create(
                &human(Uuid::now_v7()),
                NewBot {
                    name: "summarizer".into(),
                    description: None,
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert!(created.api_key.starts_with("bot_"));
        assert_eq!(
            created.bot.api_key_hint,
            created.api_key[created.api_key.len() - 4..]
        );
        // the stored record carries only the digest
        assert_ne!(created.bot.api_key_hash, created.api_key);
    }

    #[tokio::test]
    async fn bots_cannot_manage_bots() {
        let principal = Principal::Bot(domains::BotIdentity {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            trusted: true,
            can_draft: true,
            can_publish: true,
            can_comment: true,
        });
        let err = service(MockBotRepo::new())
            .create(
                &principal,
                NewBot {
                    name: "x".into(),
                    description: None,
                    avatar: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn foreign_bots_read_as_not_found() {
        let me = Uuid::now_v7();
        let other_owner = Uuid::now_v7();
        let bot = Bot {
            id: Uuid::now_v7(),
            name: "not-mine".into(),
            description: None,
            avatar: None,
            api_key_hash: "h".into(),
            api_key_hint: "1234".into(),
            trusted: false,
            status: BotStatus::Active,
            can_draft: true,
            can_publish: false,
            can_comment: true,
            owner_id: other_owner,
            created_at: Utc::now(),
        };
        let id = bot.id;
        let mut bots = MockBotRepo::new();
        bots.expect_get().returning(move |_| Ok(Some(bot.clone())));

        let err = service(bots).get(&human(me), id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn revoking_twice_is_idempotent() {
        let owner = Uuid::now_v7();
        let bot = Bot {
            id: Uuid::now_v7(),
            name: "done".into(),
            description: None,
            avatar: None,
            api_key_hash: "h".into(),
            api_key_hint: "1234".into(),
            trusted: false,
            status: BotStatus::Revoked,
            can_draft: true,
            can_publish: false,
            can_comment: true,
            owner_id: owner,
            created_at: Utc::now(),
        };
        let id = bot.id;
        let mut bots = MockBotRepo::new();
        bots.expect_get().returning(move |_| Ok(Some(bot.clone())));
        bots.expect_set_status().never();

        let receipt = service(bots).revoke(&human(owner), id).await.unwrap();
        assert!(receipt.already_revoked);
    }
}
