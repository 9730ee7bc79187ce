//! # Authorization Matrix
//!
//! One pure decision function for every post-scoped action, replacing the
//! per-handler permission checks the platform started with. No I/O: the
//! principal carries everything the rules need.
//!
//! Ownership (a human) is always the ultimate authority over
//! publish/reject/archive — a bot drafts freely while the accountable
//! human retains veto power.

use domains::{AppError, Author, Post, PostStatus, Principal, UserRole};

/// Post-scoped actions. Creation is post-independent and has its own
/// entry point, [`can_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    EditContent,
    Submit,
    Publish,
    Approve,
    Reject,
    Archive,
    Comment,
    React,
    Bookmark,
    Pin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Deny),
}

/// Why a request was denied, and how the denial must surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deny {
    /// No principal where one is required (HTTP 401).
    Unauthenticated,
    /// Principal known, permission missing (HTTP 403).
    Forbidden(&'static str),
    /// Permission fine, entity state wrong (HTTP 400).
    InvalidState(&'static str),
    /// Denied, but revealing existence would leak information; surfaces as
    /// a 404 indistinguishable from a missing entity.
    Masked,
}

impl Decision {
    /// Convert to a `Result`, masking denials as `{entity} not found`.
    pub fn require(self, masked_entity: &str) -> domains::Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(deny) => Err(deny.into_error(masked_entity)),
        }
    }
}

impl Deny {
    pub fn into_error(self, masked_entity: &str) -> AppError {
        match self {
            Deny::Unauthenticated => AppError::Authentication("no identity resolved".into()),
            Deny::Forbidden(reason) => AppError::Forbidden(reason.into()),
            Deny::InvalidState(reason) => AppError::InvalidTransition(reason.into()),
            Deny::Masked => AppError::not_found(masked_entity),
        }
    }
}

/// Rule 3: any human may create; a bot only with the draft permission.
pub fn can_create(principal: &Principal) -> Decision {
    match principal {
        Principal::Anonymous => Decision::Deny(Deny::Unauthenticated),
        Principal::Human(_) => Decision::Allow,
        Principal::Bot(bot) if bot.can_draft => Decision::Allow,
        Principal::Bot(_) => Decision::Deny(Deny::Forbidden(
            "bot does not have draft permission",
        )),
    }
}

/// Decide whether `principal` may perform `action` on `post`.
pub fn authorize(principal: &Principal, post: &Post, action: Action) -> Decision {
    match action {
        Action::Read => read(principal, post),
        Action::EditContent => edit_content(principal, post),
        Action::Submit => submit(principal, post),
        Action::Publish | Action::Approve | Action::Reject => owner_decision(principal, post),
        Action::Archive => archive(principal, post),
        Action::Comment => comment(principal, post),
        Action::React => engage(principal, post, "bots cannot react to posts"),
        Action::Bookmark => engage(principal, post, "bots cannot bookmark posts"),
        Action::Pin => pin(principal),
    }
}

/// Rules 1–2: published posts are world-readable; unpublished posts are
/// visible only to the owning human or the authoring bot, and everyone
/// else gets a denial indistinguishable from "not found".
fn read(principal: &Principal, post: &Post) -> Decision {
    if post.status == PostStatus::Published {
        return Decision::Allow;
    }
    match principal {
        Principal::Human(session) if session.user_id == post.owner_id => Decision::Allow,
        Principal::Bot(bot) if post.author.is_bot(bot.id) => Decision::Allow,
        _ => Decision::Deny(Deny::Masked),
    }
}

/// Rule 4: the exact author, and only while the content is not frozen.
fn edit_content(principal: &Principal, post: &Post) -> Decision {
    let is_author = match (principal, &post.author) {
        (Principal::Human(session), Author::Human(id)) => session.user_id == *id,
        (Principal::Bot(bot), Author::Bot(id)) => bot.id == *id,
        _ => false,
    };
    if principal.is_anonymous() {
        return Decision::Deny(Deny::Unauthenticated);
    }
    if !is_author {
        return Decision::Deny(Deny::Forbidden("only the author can edit this post"));
    }
    match post.status {
        PostStatus::Published => {
            Decision::Deny(Deny::InvalidState("cannot edit a published post"))
        }
        PostStatus::Archived => Decision::Deny(Deny::InvalidState("cannot edit an archived post")),
        _ => Decision::Allow,
    }
}

/// Rule 5: only the authoring bot, only from DRAFT.
fn submit(principal: &Principal, post: &Post) -> Decision {
    let bot = match principal {
        Principal::Anonymous => return Decision::Deny(Deny::Unauthenticated),
        Principal::Human(_) => {
            return Decision::Deny(Deny::Forbidden(
                "only the authoring bot can submit a post for review",
            ))
        }
        Principal::Bot(bot) => bot,
    };
    if !post.author.is_bot(bot.id) {
        return Decision::Deny(Deny::Forbidden(
            "only the authoring bot can submit this post",
        ));
    }
    if post.status != PostStatus::Draft {
        return Decision::Deny(Deny::InvalidState(
            "only drafts can be submitted for review",
        ));
    }
    Decision::Allow
}

/// Rule 6: publish/approve/reject belong to whoever resolves to the owner,
/// directly by session or indirectly through a bot credential.
fn owner_decision(principal: &Principal, post: &Post) -> Decision {
    match principal.acting_owner_id() {
        None => Decision::Deny(Deny::Unauthenticated),
        Some(owner) if owner == post.owner_id => Decision::Allow,
        Some(_) => Decision::Deny(Deny::Forbidden("only the post owner can do this")),
    }
}

/// Archive is owner-only like rule 6, but a non-owner gets a masked 404:
/// a delete probe must not reveal that the post exists.
fn archive(principal: &Principal, post: &Post) -> Decision {
    match principal.acting_owner_id() {
        None => Decision::Deny(Deny::Unauthenticated),
        Some(owner) if owner == post.owner_id => Decision::Allow,
        Some(_) => Decision::Deny(Deny::Masked),
    }
}

/// Rule 7: humans always, bots only with the comment permission, and only
/// against published posts.
fn comment(principal: &Principal, post: &Post) -> Decision {
    match principal {
        Principal::Anonymous => return Decision::Deny(Deny::Unauthenticated),
        Principal::Bot(bot) if !bot.can_comment => {
            return Decision::Deny(Deny::Forbidden("bot does not have comment permission"))
        }
        _ => {}
    }
    if post.status != PostStatus::Published {
        return Decision::Deny(Deny::Masked);
    }
    Decision::Allow
}

/// Reactions and bookmarks: human sessions only, published posts only.
fn engage(principal: &Principal, post: &Post, bot_reason: &'static str) -> Decision {
    match principal {
        Principal::Anonymous => return Decision::Deny(Deny::Unauthenticated),
        Principal::Bot(_) => return Decision::Deny(Deny::Forbidden(bot_reason)),
        Principal::Human(_) => {}
    }
    if post.status != PostStatus::Published {
        return Decision::Deny(Deny::Masked);
    }
    Decision::Allow
}

fn pin(principal: &Principal) -> Decision {
    match principal {
        Principal::Anonymous => Decision::Deny(Deny::Unauthenticated),
        Principal::Human(session) if session.role == UserRole::Admin => Decision::Allow,
        _ => Decision::Deny(Deny::Forbidden("admin access required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{BotIdentity, HumanSession, PostFormat};
    use uuid::Uuid;

    fn human(user_id: Uuid) -> Principal {
        Principal::Human(HumanSession {
            user_id,
            role: UserRole::Member,
        })
    }

    fn admin(user_id: Uuid) -> Principal {
        Principal::Human(HumanSession {
            user_id,
            role: UserRole::Admin,
        })
    }

    fn bot(id: Uuid, owner_id: Uuid) -> Principal {
        Principal::Bot(BotIdentity {
            id,
            owner_id,
            trusted: false,
            can_draft: true,
            can_publish: false,
            can_comment: true,
        })
    }

    fn post(author: Author, owner_id: Uuid, status: PostStatus) -> Post {
        Post {
            id: Uuid::now_v7(),
            title: "A post".into(),
            slug: "a-post-abc".into(),
            body: "body".into(),
            excerpt: "body".into(),
            format: PostFormat::Article,
            status,
            author,
            owner_id,
            view_count: 0,
            pinned_at: None,
            created_at: Utc::now(),
            published_at: None,
            tags: vec![],
        }
    }

    #[test]
    fn published_posts_are_world_readable() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Published);
        assert_eq!(
            authorize(&Principal::Anonymous, &p, Action::Read),
            Decision::Allow
        );
        assert_eq!(
            authorize(&bot(Uuid::now_v7(), Uuid::now_v7()), &p, Action::Read),
            Decision::Allow
        );
    }

    #[test]
    fn unpublished_reads_are_masked_for_strangers() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Draft);
        for principal in [
            Principal::Anonymous,
            human(Uuid::now_v7()),
            bot(Uuid::now_v7(), Uuid::now_v7()),
        ] {
            assert_eq!(
                authorize(&principal, &p, Action::Read),
                Decision::Deny(Deny::Masked)
            );
        }
        assert_eq!(authorize(&human(owner), &p, Action::Read), Decision::Allow);
    }

    #[test]
    fn authoring_bot_reads_its_own_draft_but_sibling_bot_does_not() {
        let owner = Uuid::now_v7();
        let author_bot = Uuid::now_v7();
        let p = post(Author::Bot(author_bot), owner, PostStatus::Draft);
        assert_eq!(
            authorize(&bot(author_bot, owner), &p, Action::Read),
            Decision::Allow
        );
        // same owner, different bot: still masked
        assert_eq!(
            authorize(&bot(Uuid::now_v7(), owner), &p, Action::Read),
            Decision::Deny(Deny::Masked)
        );
    }

    #[test]
    fn create_requires_draft_permission_for_bots() {
        assert_eq!(can_create(&human(Uuid::now_v7())), Decision::Allow);
        assert_eq!(
            can_create(&Principal::Anonymous),
            Decision::Deny(Deny::Unauthenticated)
        );
        let mut no_draft = BotIdentity {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            trusted: true,
            can_draft: false,
            can_publish: true,
            can_comment: true,
        };
        assert!(matches!(
            can_create(&Principal::Bot(no_draft)),
            Decision::Deny(Deny::Forbidden(_))
        ));
        no_draft.can_draft = true;
        assert_eq!(can_create(&Principal::Bot(no_draft)), Decision::Allow);
    }

    #[test]
    fn only_the_exact_author_edits() {
        let owner = Uuid::now_v7();
        let author_bot = Uuid::now_v7();
        let p = post(Author::Bot(author_bot), owner, PostStatus::Draft);
        // the owner is not the author here
        assert!(matches!(
            authorize(&human(owner), &p, Action::EditContent),
            Decision::Deny(Deny::Forbidden(_))
        ));
        assert_eq!(
            authorize(&bot(author_bot, owner), &p, Action::EditContent),
            Decision::Allow
        );
    }

    #[test]
    fn frozen_posts_reject_edits_as_state_errors() {
        let owner = Uuid::now_v7();
        for status in [PostStatus::Published, PostStatus::Archived] {
            let p = post(Author::Human(owner), owner, status);
            assert!(matches!(
                authorize(&human(owner), &p, Action::EditContent),
                Decision::Deny(Deny::InvalidState(_))
            ));
        }
    }

    #[test]
    fn humans_cannot_submit() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Draft);
        assert!(matches!(
            authorize(&human(owner), &p, Action::Submit),
            Decision::Deny(Deny::Forbidden(_))
        ));
    }

    #[test]
    fn owner_decisions_accept_session_or_bot_credential() {
        let owner = Uuid::now_v7();
        let author_bot = Uuid::now_v7();
        let p = post(Author::Bot(author_bot), owner, PostStatus::PendingReview);
        // directly, via session
        assert_eq!(authorize(&human(owner), &p, Action::Approve), Decision::Allow);
        // indirectly, via any bot credential the owner holds
        assert_eq!(
            authorize(&bot(Uuid::now_v7(), owner), &p, Action::Approve),
            Decision::Allow
        );
        // a stranger's bot is refused
        assert!(matches!(
            authorize(&bot(Uuid::now_v7(), Uuid::now_v7()), &p, Action::Approve),
            Decision::Deny(Deny::Forbidden(_))
        ));
    }

    #[test]
    fn archive_masks_non_owners() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Published);
        assert_eq!(
            authorize(&human(Uuid::now_v7()), &p, Action::Archive),
            Decision::Deny(Deny::Masked)
        );
        assert_eq!(authorize(&human(owner), &p, Action::Archive), Decision::Allow);
    }

    #[test]
    fn comments_gate_on_permission_and_status() {
        let owner = Uuid::now_v7();
        let published = post(Author::Human(owner), owner, PostStatus::Published);
        let draft = post(Author::Human(owner), owner, PostStatus::Draft);

        assert_eq!(
            authorize(&human(Uuid::now_v7()), &published, Action::Comment),
            Decision::Allow
        );
        let mut muted = BotIdentity {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            trusted: false,
            can_draft: true,
            can_publish: false,
            can_comment: false,
        };
        assert!(matches!(
            authorize(&Principal::Bot(muted), &published, Action::Comment),
            Decision::Deny(Deny::Forbidden(_))
        ));
        muted.can_comment = true;
        assert_eq!(
            authorize(&Principal::Bot(muted), &published, Action::Comment),
            Decision::Allow
        );
        // unpublished posts do not take comments, and do not reveal
        // themselves while refusing
        assert_eq!(
            authorize(&human(Uuid::now_v7()), &draft, Action::Comment),
            Decision::Deny(Deny::Masked)
        );
    }

    #[test]
    fn reactions_are_human_only() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Published);
        assert!(matches!(
            authorize(&bot(Uuid::now_v7(), owner), &p, Action::React),
            Decision::Deny(Deny::Forbidden(_))
        ));
        assert_eq!(
            authorize(&human(Uuid::now_v7()), &p, Action::React),
            Decision::Allow
        );
    }

    #[test]
    fn pin_requires_admin() {
        let owner = Uuid::now_v7();
        let p = post(Author::Human(owner), owner, PostStatus::Published);
        assert!(matches!(
            authorize(&human(owner), &p, Action::Pin),
            Decision::Deny(Deny::Forbidden(_))
        ));
        assert_eq!(
            authorize(&admin(Uuid::now_v7()), &p, Action::Pin),
            Decision::Allow
        );
    }
}
