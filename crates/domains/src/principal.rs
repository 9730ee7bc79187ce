//! # Principal
//!
//! The resolved identity behind a request. Produced once per request by the
//! identity resolver and consumed by the authorization matrix; it carries
//! everything a permission decision needs so the matrix stays free of I/O.

use uuid::Uuid;

use crate::models::{Bot, UserRole};

/// A bot that presented a valid, ACTIVE credential. Revoked bots never
/// materialize here: their key hash fails lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub trusted: bool,
    pub can_draft: bool,
    pub can_publish: bool,
    pub can_comment: bool,
}

impl From<&Bot> for BotIdentity {
    fn from(bot: &Bot) -> Self {
        BotIdentity {
            id: bot.id,
            owner_id: bot.owner_id,
            trusted: bot.trusted,
            can_draft: bot.can_draft,
            can_publish: bot.can_publish,
            can_comment: bot.can_comment,
        }
    }
}

/// A human with a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanSession {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// The acting identity of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Human(HumanSession),
    Bot(BotIdentity),
}

impl Principal {
    /// The human this principal ultimately acts for: the user themself, or
    /// the owner of the presented bot credential. `None` for anonymous.
    pub fn acting_owner_id(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::Human(session) => Some(session.user_id),
            Principal::Bot(bot) => Some(bot.owner_id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }
}
