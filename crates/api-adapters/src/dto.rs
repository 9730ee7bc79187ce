//! Request and response shapes. Responses are camelCase on the wire;
//! enums travel in their SCREAMING_SNAKE_CASE form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use domains::{AuthorType, BotStats, PostFormat, PostStatus, ReactionType};
use services::bots::BotProfile;
use services::comments::CommentView;
use services::posts::{PostView, TransitionOutcome, TransitionReceipt};

/// Distinguishes an absent field from an explicit `null`: absent leaves
/// the stored value alone, `null` clears it.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Posts ────────────────────────────────────────────────────────────────

/// `title`/`body` stay optional at the deserialization layer so their
/// absence surfaces as a 400 validation error, not a body-parse rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub format: Option<PostFormat>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub format: Option<PostFormat>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsParams {
    pub status: Option<PostStatus>,
    pub format: Option<PostFormat>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    pub format: PostFormat,
    pub status: PostStatus,
    pub author_type: AuthorType,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub owner_id: Uuid,
    pub owner_name: Option<String>,
    pub view_count: u64,
    pub pinned_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        let post = view.post;
        PostResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            body: post.body,
            excerpt: post.excerpt,
            format: post.format,
            status: post.status,
            author_type: post.author.author_type(),
            author_id: post.author.id(),
            author_name: view.author_name,
            author_avatar: view.author_avatar,
            owner_id: post.owner_id,
            owner_name: view.owner_name,
            view_count: post.view_count,
            pinned_at: post.pinned_at,
            tags: post.tags,
            created_at: post.created_at,
            published_at: post.published_at,
        }
    }
}

/// Summary row for listings: everything but the full body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub format: PostFormat,
    pub status: PostStatus,
    pub author_type: AuthorType,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub owner_id: Uuid,
    pub owner_name: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<PostView> for PostSummaryResponse {
    fn from(view: PostView) -> Self {
        let post = view.post;
        PostSummaryResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            format: post.format,
            status: post.status,
            author_type: post.author.author_type(),
            author_id: post.author.id(),
            author_name: view.author_name,
            author_avatar: view.author_avatar,
            owner_id: post.owner_id,
            owner_name: view.owner_name,
            tags: post.tags,
            created_at: post.created_at,
            published_at: post.published_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub data: Vec<PostSummaryResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub message: &'static str,
}

/// Outcome of a lifecycle endpoint. `status` distinguishes the idempotent
/// no-op replays from fresh transitions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub id: Uuid,
    pub slug: String,
    pub status: &'static str,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub message: &'static str,
}

impl TransitionResponse {
    pub fn from_receipt(receipt: TransitionReceipt, reason: Option<String>) -> Self {
        let (status, message) = match receipt.outcome {
            TransitionOutcome::Published => ("PUBLISHED", "Post published"),
            TransitionOutcome::SubmittedForReview => {
                ("PENDING_REVIEW", "Post submitted for review")
            }
            TransitionOutcome::Archived => ("ARCHIVED", "Post archived"),
            TransitionOutcome::AlreadyPublished => ("already_published", "Post already published"),
            TransitionOutcome::AlreadyArchived => ("already_archived", "Post already archived"),
        };
        TransitionResponse {
            id: receipt.post.id,
            slug: receipt.post.slug,
            status,
            published_at: receipt.post.published_at,
            reason,
            message,
        }
    }

    /// The submit endpoint's fast path gets its own message so callers can
    /// tell "published (trusted bot)" from "submitted for review".
    pub fn from_submit(receipt: TransitionReceipt) -> Self {
        let mut response = Self::from_receipt(receipt, None);
        if response.status == "PUBLISHED" {
            response.message = "Post published (trusted bot)";
        }
        response
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCountResponse {
    pub view_count: u64,
}

// ── Bots ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBotRequest {
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBotRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    pub trusted: Option<bool>,
    pub can_draft: Option<bool>,
    pub can_publish: Option<bool>,
    pub can_comment: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub api_key_hint: String,
    pub trusted: bool,
    pub status: domains::BotStatus,
    pub can_draft: bool,
    pub can_publish: bool,
    pub can_comment: bool,
    pub created_at: DateTime<Utc>,
    pub stats: BotStatsResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatsResponse {
    pub posts: u64,
    pub comments: u64,
}

impl From<BotStats> for BotStatsResponse {
    fn from(stats: BotStats) -> Self {
        BotStatsResponse {
            posts: stats.posts,
            comments: stats.comments,
        }
    }
}

impl BotResponse {
    pub fn new(bot: domains::Bot, stats: BotStats) -> Self {
        BotResponse {
            id: bot.id,
            name: bot.name,
            description: bot.description,
            avatar: bot.avatar,
            api_key_hint: bot.api_key_hint,
            trusted: bot.trusted,
            status: bot.status,
            can_draft: bot.can_draft,
            can_publish: bot.can_publish,
            can_comment: bot.can_comment,
            created_at: bot.created_at,
            stats: stats.into(),
        }
    }
}

/// Registration response: the only place the plaintext key ever appears.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBotResponse {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub api_key_hint: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegeneratedKeyResponse {
    pub api_key: String,
    pub hint: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub trusted: bool,
    pub status: domains::BotStatus,
    pub permissions: PermissionsResponse,
    pub owner: OwnerResponse,
    pub stats: BotStatsResponse,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub can_draft: bool,
    pub can_publish: bool,
    pub can_comment: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

impl From<BotProfile> for MeResponse {
    fn from(profile: BotProfile) -> Self {
        let bot = profile.bot;
        MeResponse {
            id: bot.id,
            name: bot.name,
            avatar: bot.avatar,
            description: bot.description,
            trusted: bot.trusted,
            status: bot.status,
            permissions: PermissionsResponse {
                can_draft: bot.can_draft,
                can_publish: bot.can_publish,
                can_comment: bot.can_comment,
            },
            owner: OwnerResponse {
                id: profile.owner.as_ref().map(|o| o.id),
                name: profile.owner.map(|o| o.name),
            },
            stats: profile.stats.into(),
            created_at: bot.created_at,
        }
    }
}

// ── Comments ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub body: String,
    pub author_type: AuthorType,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        let comment = view.comment;
        CommentResponse {
            id: comment.id,
            body: comment.body,
            author_type: comment.author.author_type(),
            author_id: comment.author.id(),
            author_name: view.author_name,
            author_avatar: view.author_avatar,
            created_at: comment.created_at,
        }
    }
}

// ── Engagement ───────────────────────────────────────────────────────────

/// The type travels as a raw string and is parsed in the handler, so an
/// unknown value is a 400 validation error rather than a parse rejection.
#[derive(Debug, Deserialize, Default)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionsResponse {
    pub reactions: std::collections::HashMap<String, u64>,
    pub user_reactions: Vec<ReactionType>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedResponse {
    pub bookmarked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ── Reviews ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewParams {
    pub status: Option<PostStatus>,
    pub format: Option<PostFormat>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ── Generic ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
