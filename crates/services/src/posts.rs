//! # Post Service
//!
//! Drives the post lifecycle against the persistence gateway. Every
//! operation follows the same shape: load, authorize through the matrix,
//! decide through the lifecycle engine, persist with a conditional write.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AppError, Author, Bot, BotRepo, ContentPatch, Post, PostFormat, PostQuery, PostRepo,
    PostScope, PostStatus, Principal, Result, User, UserRepo,
};

use crate::authorize::{self, Action};
use crate::lifecycle::{self, Event, Outcome};
use crate::slug;

/// Gateway insert retries after a slug collision.
const SLUG_ATTEMPTS: usize = 3;

const DEFAULT_PAGE: i64 = 20;
const MAX_PAGE: i64 = 100;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub format: Option<PostFormat>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EditPost {
    pub title: Option<String>,
    pub body: Option<String>,
    pub format: Option<PostFormat>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListPosts {
    pub status: Option<PostStatus>,
    pub format: Option<PostFormat>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub status: Option<PostStatus>,
    pub format: Option<PostFormat>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// How a status-changing call ended. `Already*` outcomes are successes:
/// retried approvals must not surface as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Published,
    SubmittedForReview,
    Archived,
    AlreadyPublished,
    AlreadyArchived,
}

#[derive(Debug, Clone)]
pub struct TransitionReceipt {
    pub post: Post,
    pub outcome: TransitionOutcome,
}

/// A post joined with the display names its responses need.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub owner_name: Option<String>,
}

pub struct PostService {
    posts: Arc<dyn PostRepo>,
    bots: Arc<dyn BotRepo>,
    users: Arc<dyn UserRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepo>,
        bots: Arc<dyn BotRepo>,
        users: Arc<dyn UserRepo>,
    ) -> Self {
        PostService { posts, bots, users }
    }

    /// Create a draft. Any human may create; bots need the draft
    /// permission. The owner is the human behind the principal either way.
    pub async fn create(&self, principal: &Principal, new: NewPost) -> Result<Post> {
        authorize::can_create(principal).require("Post")?;

        let title = new.title.trim();
        if title.is_empty() || new.body.trim().is_empty() {
            return Err(AppError::Validation("title and body are required".into()));
        }

        let (author, owner_id) = match principal {
            Principal::Human(session) => (Author::Human(session.user_id), session.user_id),
            Principal::Bot(bot) => (Author::Bot(bot.id), bot.owner_id),
            Principal::Anonymous => unreachable!("can_create rejects anonymous"),
        };

        let mut post = Post {
            id: Uuid::now_v7(),
            title: title.to_string(),
            slug: slug::generate(title),
            body: new.body.clone(),
            excerpt: lifecycle::excerpt_of(&new.body),
            format: new.format.unwrap_or(PostFormat::Article),
            status: PostStatus::Draft,
            author,
            owner_id,
            view_count: 0,
            pinned_at: None,
            created_at: Utc::now(),
            published_at: None,
            tags: normalize_tags(new.tags),
        };

        for attempt in 0..SLUG_ATTEMPTS {
            match self.posts.insert(&post).await {
                Ok(()) => {
                    tracing::info!(post_id = %post.id, slug = %post.slug, "created draft");
                    return Ok(post);
                }
                Err(AppError::Conflict(_)) if attempt + 1 < SLUG_ATTEMPTS => {
                    post.slug = slug::generate_with_nonce(&post.title);
                }
                Err(err) => return Err(err),
            }
        }
        Err(AppError::Conflict("could not assign a unique slug".into()))
    }

    /// Fetch one post under the visibility rules. Denials are 404s
    /// indistinguishable from a missing id.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<Post> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Read).require("Post")?;
        Ok(post)
    }

    /// List posts. Anonymous and human requests see PUBLISHED only; a bot
    /// credential additionally sees the bot's own posts in any status.
    pub async fn list(
        &self,
        principal: &Principal,
        query: ListPosts,
    ) -> Result<(Vec<Post>, u64)> {
        let scope = match principal {
            Principal::Bot(bot) => PostScope::BotFeed {
                bot_id: bot.id,
                status: query.status,
            },
            _ => PostScope::Public,
        };
        let (limit, offset) = page(query.limit, query.offset);
        self.posts
            .list(&PostQuery {
                scope,
                format: query.format,
                limit,
                offset,
            })
            .await
    }

    /// The owner's review queue, reached with a bot credential: DRAFT and
    /// PENDING_REVIEW posts by default.
    pub async fn reviews(
        &self,
        principal: &Principal,
        query: ReviewQuery,
    ) -> Result<(Vec<Post>, u64)> {
        let Principal::Bot(bot) = principal else {
            return Err(AppError::Authentication(
                "invalid or missing API key".into(),
            ));
        };
        let statuses = match query.status {
            Some(status) => vec![status],
            None => vec![PostStatus::Draft, PostStatus::PendingReview],
        };
        let (limit, offset) = page(query.limit, query.offset);
        self.posts
            .list(&PostQuery {
                scope: PostScope::Owner {
                    owner_id: bot.owner_id,
                    statuses,
                },
                format: query.format,
                limit,
                offset,
            })
            .await
    }

    /// Edit content fields. Author-only, and only while the post is not
    /// frozen; the excerpt follows the body. `status` is not an editable
    /// field — transitions have their own operations.
    pub async fn edit(&self, principal: &Principal, id: Uuid, edit: EditPost) -> Result<Post> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::EditContent).require("Post")?;

        if let Some(title) = &edit.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("title cannot be empty".into()));
            }
        }
        if let Some(body) = &edit.body {
            if body.trim().is_empty() {
                return Err(AppError::Validation("body cannot be empty".into()));
            }
        }

        let patch = ContentPatch {
            title: edit.title.map(|t| t.trim().to_string()),
            excerpt: edit.body.as_deref().map(lifecycle::excerpt_of),
            body: edit.body,
            format: edit.format,
            tags: edit.tags.map(normalize_tags),
        };

        match self.posts.update_content(id, &patch).await? {
            Some(updated) => Ok(updated),
            // the post froze between our read and the conditional write
            None => Err(AppError::InvalidTransition(
                "post is no longer editable".into(),
            )),
        }
    }

    /// Bot hand-off of a draft: straight to PUBLISHED for a trusted bot
    /// with publish permission, PENDING_REVIEW otherwise.
    pub async fn submit(&self, principal: &Principal, id: Uuid) -> Result<TransitionReceipt> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Submit).require("Post")?;
        let Principal::Bot(bot) = principal else {
            unreachable!("submit authorization only passes for bots");
        };
        self.run(
            post,
            Event::Submit {
                trusted: bot.trusted,
                can_publish: bot.can_publish,
            },
        )
        .await
    }

    /// Owner publication, session identity.
    pub async fn publish(&self, principal: &Principal, id: Uuid) -> Result<TransitionReceipt> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Publish).require("Post")?;
        self.run(post, Event::Publish).await
    }

    /// Owner approval of a pending post; the owner may act through a bot
    /// credential they hold.
    pub async fn approve(&self, principal: &Principal, id: Uuid) -> Result<TransitionReceipt> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Approve).require("Post")?;
        self.run(post, Event::Approve).await
    }

    /// Owner rejection; archives the post. The optional reason is echoed to
    /// the caller but never persisted as state.
    pub async fn reject(&self, principal: &Principal, id: Uuid) -> Result<TransitionReceipt> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Reject).require("Post")?;
        self.run(post, Event::Reject).await
    }

    /// Owner archival. Non-owners get a 404, never a 403.
    pub async fn archive(&self, principal: &Principal, id: Uuid) -> Result<TransitionReceipt> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Archive).require("Post")?;
        self.run(post, Event::Archive).await
    }

    /// Relaxed view-count increment; published posts only.
    pub async fn record_view(&self, id: Uuid) -> Result<u64> {
        let post = self.load(id).await?;
        if post.status != PostStatus::Published {
            return Err(AppError::not_found("Post"));
        }
        self.posts
            .increment_views(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    pub async fn view_count(&self, id: Uuid) -> Result<u64> {
        let post = self.load(id).await?;
        if post.status != PostStatus::Published {
            return Err(AppError::not_found("Post"));
        }
        Ok(post.view_count)
    }

    /// Admin pin / unpin.
    pub async fn set_pinned(
        &self,
        principal: &Principal,
        id: Uuid,
        pinned: bool,
    ) -> Result<Post> {
        let post = self.load(id).await?;
        authorize::authorize(principal, &post, Action::Pin).require("Post")?;
        let pinned_at = pinned.then(Utc::now);
        self.posts
            .set_pinned(id, pinned_at)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    /// Join a post with the author/owner display names its API responses
    /// carry. A dangling referent degrades to `None` rather than failing
    /// the read.
    pub async fn view(&self, post: Post) -> Result<PostView> {
        let (author_name, author_avatar) = match post.author {
            Author::Human(id) => match self.users.get(id).await? {
                Some(User { name, image, .. }) => (Some(name), image),
                None => (None, None),
            },
            Author::Bot(id) => match self.bots.get(id).await? {
                Some(Bot { name, avatar, .. }) => (Some(name), avatar),
                None => (None, None),
            },
        };
        let owner_name = self.users.get(post.owner_id).await?.map(|u| u.name);
        Ok(PostView {
            post,
            author_name,
            author_avatar,
            owner_name,
        })
    }

    pub async fn view_all(&self, posts: Vec<Post>) -> Result<Vec<PostView>> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.view(post).await?);
        }
        Ok(views)
    }

    async fn load(&self, id: Uuid) -> Result<Post> {
        self.posts
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    /// Apply an engine decision through the gateway's conditional write.
    /// Losing the race to an equivalent transition is reported as the
    /// idempotent outcome, not an error.
    async fn run(&self, post: Post, event: Event) -> Result<TransitionReceipt> {
        match lifecycle::transition(post.status, event)? {
            Outcome::AlreadyDone { status } => Ok(TransitionReceipt {
                outcome: already(status),
                post,
            }),
            Outcome::Apply {
                from,
                to,
                stamp_published,
            } => {
                match self
                    .posts
                    .transition(post.id, from, to, stamp_published, Utc::now())
                    .await?
                {
                    Some(updated) => {
                        tracing::info!(
                            post_id = %updated.id,
                            from = post.status.as_str(),
                            to = to.as_str(),
                            "post transitioned"
                        );
                        Ok(TransitionReceipt {
                            outcome: applied(to),
                            post: updated,
                        })
                    }
                    None => {
                        // Concurrent writer got there first. If the post now
                        // sits where we were headed, report the idempotent
                        // outcome; otherwise the caller raced a conflicting
                        // change.
                        let current = self.load(post.id).await?;
                        if current.status == to {
                            Ok(TransitionReceipt {
                                outcome: already(to),
                                post: current,
                            })
                        } else {
                            Err(AppError::Conflict(
                                "post was modified concurrently".into(),
                            ))
                        }
                    }
                }
            }
        }
    }
}

fn applied(to: PostStatus) -> TransitionOutcome {
    match to {
        PostStatus::Published => TransitionOutcome::Published,
        PostStatus::PendingReview => TransitionOutcome::SubmittedForReview,
        PostStatus::Archived => TransitionOutcome::Archived,
        PostStatus::Draft => unreachable!("no event transitions into DRAFT"),
    }
}

fn already(status: PostStatus) -> TransitionOutcome {
    match status {
        PostStatus::Published => TransitionOutcome::AlreadyPublished,
        _ => TransitionOutcome::AlreadyArchived,
    }
}

fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
