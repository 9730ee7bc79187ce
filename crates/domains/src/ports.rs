//! # Core Ports
//!
//! Persistence-gateway and session-collaborator contracts. Any adapter must
//! implement these traits to be wired into the binary.
//!
//! Gateway contract: atomic read-modify-write by primary key, unique
//! constraints on post slug and bot API-key hash, and compare-and-set
//! status transitions so concurrent approvals cannot double-stamp
//! `published_at`. A write either fully applies or fully fails.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Bookmark, Bot, BotStats, BotStatus, Comment, Post, PostFormat, PostStatus, Reaction,
    ReactionType, User,
};

/// Which rows a post listing may return. Encodes the read-visibility rules
/// so adapters can push them into the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    /// PUBLISHED posts only (anonymous and human listings).
    Public,
    /// PUBLISHED posts plus the bot's own posts in any status. When
    /// `status` is set, only the bot's own posts with that status.
    BotFeed {
        bot_id: Uuid,
        status: Option<PostStatus>,
    },
    /// All posts of one owner in any of `statuses` (the review queue).
    Owner {
        owner_id: Uuid,
        statuses: Vec<PostStatus>,
    },
}

#[derive(Debug, Clone)]
pub struct PostQuery {
    pub scope: PostScope,
    pub format: Option<PostFormat>,
    pub limit: i64,
    pub offset: i64,
}

/// Content-field updates applied to a non-frozen post. `status` is absent
/// deliberately: all status changes go through [`PostRepo::transition`].
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub format: Option<PostFormat>,
    pub tags: Option<Vec<String>>,
}

/// Fields an owner may change on a bot. Key material and status have their
/// own operations.
#[derive(Debug, Clone, Default)]
pub struct BotPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub trusted: Option<bool>,
    pub can_draft: Option<bool>,
    pub can_publish: Option<bool>,
    pub can_comment: Option<bool>,
}

/// Data persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Insert a new post. Fails with `Conflict` on a duplicate slug.
    async fn insert(&self, post: &Post) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Returns the page plus the total row count for the query.
    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64)>;

    /// Apply content edits iff the post is still editable (DRAFT or
    /// PENDING_REVIEW). Returns the updated row, or `None` when the post is
    /// missing or its status no longer allows edits.
    async fn update_content(&self, id: Uuid, patch: &ContentPatch) -> Result<Option<Post>>;

    /// Compare-and-set status transition: moves to `to` iff the current
    /// status is one of `from`. When `stamp_published` is set,
    /// `published_at` is set to `now` only if not already set. Returns the
    /// updated row, or `None` when the precondition failed.
    async fn transition(
        &self,
        id: Uuid,
        from: &[PostStatus],
        to: PostStatus,
        stamp_published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// Relaxed monotonic increment; lost updates under contention are
    /// acceptable. Returns the new count, or `None` for a missing post.
    async fn increment_views(&self, id: Uuid) -> Result<Option<u64>>;

    async fn set_pinned(&self, id: Uuid, pinned_at: Option<DateTime<Utc>>) -> Result<Option<Post>>;
}

/// Data persistence contract for bots.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BotRepo: Send + Sync {
    /// Insert a new bot. Fails with `Conflict` on a duplicate key hash.
    async fn insert(&self, bot: &Bot) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Bot>>;

    /// Credential lookup: ACTIVE bots only. Revoked bots must fail lookup,
    /// not merely fail permission checks.
    async fn find_active_by_key_hash(&self, key_hash: &str) -> Result<Option<Bot>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Bot>>;

    async fn update(&self, id: Uuid, patch: &BotPatch) -> Result<Option<Bot>>;

    /// Replace key material in one write; the old hash must never match
    /// again once this returns.
    async fn set_key(&self, id: Uuid, key_hash: &str, key_hint: &str) -> Result<Option<Bot>>;

    async fn set_status(&self, id: Uuid, status: BotStatus) -> Result<Option<Bot>>;

    async fn stats(&self, bot_id: Uuid) -> Result<BotStats>;
}

/// Read-mostly contract for human accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Used by seed and tests; humans normally arrive via the external
    /// identity collaborator.
    async fn insert(&self, user: &User) -> Result<()>;
}

/// Data persistence contract for comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<()>;

    async fn list_visible(&self, post_id: Uuid) -> Result<Vec<Comment>>;
}

/// Reactions and bookmarks.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EngagementRepo: Send + Sync {
    /// Returns `false` when the (user, post, type) reaction already exists.
    async fn add_reaction(&self, reaction: &Reaction) -> Result<bool>;

    async fn remove_reaction(&self, user_id: Uuid, post_id: Uuid, kind: ReactionType)
        -> Result<()>;

    /// Per-type totals for a post, plus the requesting user's own types.
    async fn reaction_counts(
        &self,
        post_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(HashMap<ReactionType, u64>, Vec<ReactionType>)>;

    /// Returns `false` when the bookmark already exists.
    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<bool>;

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    /// The user's bookmarks, newest first.
    async fn list_bookmarks(&self, user_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Bookmark>>;
}

/// External session collaborator: validates a non-bot bearer token and
/// yields the user id it belongs to. Invalid or expired tokens are `None`,
/// never an error — resolution degrades to anonymous.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, bearer_token: &str) -> Result<Option<Uuid>>;
}
