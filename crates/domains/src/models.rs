//! # Domain Models
//!
//! These structs represent the core entities of Quillpress.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a [`Post`]. `Published` and `Archived` are terminal
/// with respect to content edits; `Archived` forbids all further
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    PendingReview,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DRAFT",
            PostStatus::PendingReview => "PENDING_REVIEW",
            PostStatus::Published => "PUBLISHED",
            PostStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(PostStatus::Draft),
            "PENDING_REVIEW" => Some(PostStatus::PendingReview),
            "PUBLISHED" => Some(PostStatus::Published),
            "ARCHIVED" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

/// Editorial format of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostFormat {
    Article,
    Question,
    Showcase,
    Discussion,
    Snippet,
}

impl PostFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostFormat::Article => "ARTICLE",
            PostFormat::Question => "QUESTION",
            PostFormat::Showcase => "SHOWCASE",
            PostFormat::Discussion => "DISCUSSION",
            PostFormat::Snippet => "SNIPPET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ARTICLE" => Some(PostFormat::Article),
            "QUESTION" => Some(PostFormat::Question),
            "SHOWCASE" => Some(PostFormat::Showcase),
            "DISCUSSION" => Some(PostFormat::Discussion),
            "SNIPPET" => Some(PostFormat::Snippet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotStatus {
    Active,
    Revoked,
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Active => "ACTIVE",
            BotStatus::Revoked => "REVOKED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(BotStatus::Active),
            "REVOKED" => Some(BotStatus::Revoked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentStatus {
    Visible,
    Hidden,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Visible => "VISIBLE",
            CommentStatus::Hidden => "HIDDEN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VISIBLE" => Some(CommentStatus::Visible),
            "HIDDEN" => Some(CommentStatus::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
    Like,
    Insightful,
    Celebrate,
    Curious,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "LIKE",
            ReactionType::Insightful => "INSIGHTFUL",
            ReactionType::Celebrate => "CELEBRATE",
            ReactionType::Curious => "CURIOUS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LIKE" => Some(ReactionType::Like),
            "INSIGHTFUL" => Some(ReactionType::Insightful),
            "CELEBRATE" => Some(ReactionType::Celebrate),
            "CURIOUS" => Some(ReactionType::Curious),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Member => "MEMBER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(UserRole::Admin),
            "MEMBER" => Some(UserRole::Member),
            _ => None,
        }
    }
}

/// Discriminant of [`Author`], used on the wire and in storage columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorType {
    User,
    Bot,
}

/// Who wrote a piece of content. Exactly one of the two ids exists; the
/// "both set" / "neither set" column states are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Author {
    Human(Uuid),
    Bot(Uuid),
}

impl Author {
    pub fn author_type(&self) -> AuthorType {
        match self {
            Author::Human(_) => AuthorType::User,
            Author::Bot(_) => AuthorType::Bot,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Author::Human(id) | Author::Bot(id) => *id,
        }
    }

    /// True when this content was authored by the given bot.
    pub fn is_bot(&self, bot_id: Uuid) -> bool {
        matches!(self, Author::Bot(id) if *id == bot_id)
    }

    /// True when this content was self-authored by the given human.
    pub fn is_human(&self, user_id: Uuid) -> bool {
        matches!(self, Author::Human(id) if *id == user_id)
    }
}

/// A human account. Created and authenticated by the external identity
/// collaborator; the core only reads it (seed and tests insert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// A bot identity, owned by exactly one human. Never hard-deleted: revoked
/// bots keep their rows so authored posts and comments stay attributable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
    /// One-way digest of the API key. The plaintext is never stored.
    pub api_key_hash: String,
    /// Last 4 characters of the plaintext key, for owner recognition only.
    pub api_key_hint: String,
    pub trusted: bool,
    pub status: BotStatus,
    pub can_draft: bool,
    pub can_publish: bool,
    pub can_comment: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The central content entity.
///
/// `owner_id` is always a human: the author when human-authored, the
/// authoring bot's owner otherwise. The owner is the sole authority for
/// publish/reject/archive regardless of who wrote the content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// Unique, immutable once assigned.
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    pub format: PostFormat,
    pub status: PostStatus,
    pub author: Author,
    pub owner_id: Uuid,
    pub view_count: u64,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl Post {
    /// True once the post can no longer accept content edits.
    pub fn content_frozen(&self) -> bool {
        matches!(self.status, PostStatus::Published | PostStatus::Archived)
    }
}

/// A comment, attached to exactly one post. Same dual-authorship pattern
/// as [`Post`]; only postable against PUBLISHED posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub author: Author,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

/// A typed reaction; unique per (user, post, type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub kind: ReactionType,
    pub created_at: DateTime<Utc>,
}

/// A bookmark; unique per (user, post).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Authored-content counters shown on bot listings and `/me`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BotStats {
    pub posts: u64,
    pub comments: u64,
}
