//! # Engagement Service
//!
//! Reactions and bookmarks: human-session-only writes against published
//! posts, with uniqueness surfacing as 409 Conflict rather than silent
//! upserts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AppError, Bookmark, EngagementRepo, Post, PostRepo, PostStatus, Principal, Reaction,
    ReactionType, Result,
};

use crate::authorize::{self, Action};

#[derive(Debug, Clone)]
pub struct ReactionSummary {
    pub counts: HashMap<ReactionType, u64>,
    pub user_reactions: Vec<ReactionType>,
    pub total: u64,
}

pub struct EngagementService {
    engagement: Arc<dyn EngagementRepo>,
    posts: Arc<dyn PostRepo>,
}

impl EngagementService {
    pub fn new(engagement: Arc<dyn EngagementRepo>, posts: Arc<dyn PostRepo>) -> Self {
        EngagementService { engagement, posts }
    }

    pub async fn reactions(
        &self,
        principal: &Principal,
        post_id: Uuid,
    ) -> Result<ReactionSummary> {
        let post = self.published(post_id).await?;
        let user_id = match principal {
            Principal::Human(session) => Some(session.user_id),
            _ => None,
        };
        let (counts, user_reactions) = self.engagement.reaction_counts(post.id, user_id).await?;
        let total = counts.values().sum();
        Ok(ReactionSummary {
            counts,
            user_reactions,
            total,
        })
    }

    pub async fn react(
        &self,
        principal: &Principal,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<()> {
        let post = self.load(post_id).await?;
        authorize::authorize(principal, &post, Action::React).require("Post")?;
        let Principal::Human(session) = principal else {
            unreachable!("react authorization only passes for humans");
        };
        let inserted = self
            .engagement
            .add_reaction(&Reaction {
                user_id: session.user_id,
                post_id: post.id,
                kind,
                created_at: Utc::now(),
            })
            .await?;
        if !inserted {
            return Err(AppError::Conflict("already reacted".into()));
        }
        Ok(())
    }

    /// Removing an absent reaction is a no-op, matching uniqueness going in
    /// the other direction.
    pub async fn unreact(
        &self,
        principal: &Principal,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<()> {
        let post = self.load(post_id).await?;
        authorize::authorize(principal, &post, Action::React).require("Post")?;
        let Principal::Human(session) = principal else {
            unreachable!("react authorization only passes for humans");
        };
        self.engagement
            .remove_reaction(session.user_id, post.id, kind)
            .await
    }

    pub async fn bookmark(&self, principal: &Principal, post_id: Uuid) -> Result<()> {
        let post = self.load(post_id).await?;
        authorize::authorize(principal, &post, Action::Bookmark).require("Post")?;
        let Principal::Human(session) = principal else {
            unreachable!("bookmark authorization only passes for humans");
        };
        let inserted = self
            .engagement
            .add_bookmark(&Bookmark {
                user_id: session.user_id,
                post_id: post.id,
                created_at: Utc::now(),
            })
            .await?;
        if !inserted {
            return Err(AppError::Conflict("post already bookmarked".into()));
        }
        Ok(())
    }

    pub async fn unbookmark(&self, principal: &Principal, post_id: Uuid) -> Result<()> {
        let post = self.load(post_id).await?;
        authorize::authorize(principal, &post, Action::Bookmark).require("Post")?;
        let Principal::Human(session) = principal else {
            unreachable!("bookmark authorization only passes for humans");
        };
        self.engagement
            .remove_bookmark(session.user_id, post.id)
            .await
    }

    /// Anonymous callers simply see `false`; this endpoint powers a UI
    /// toggle and is not worth a 401.
    pub async fn is_bookmarked(&self, principal: &Principal, post_id: Uuid) -> Result<bool> {
        let Principal::Human(session) = principal else {
            return Ok(false);
        };
        self.engagement
            .is_bookmarked(session.user_id, post_id)
            .await
    }

    /// The user's bookmarked posts, newest first, published only — a
    /// bookmark survives archival but stops rendering.
    pub async fn bookmarks(
        &self,
        principal: &Principal,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let Principal::Human(session) = principal else {
            return Err(AppError::Authentication("session required".into()));
        };
        let limit = limit.clamp(1, 100);
        let bookmarks = self
            .engagement
            .list_bookmarks(session.user_id, limit, offset.max(0))
            .await?;
        let mut posts = Vec::with_capacity(bookmarks.len());
        for bookmark in bookmarks {
            if let Some(post) = self.posts.get(bookmark.post_id).await? {
                if post.status == PostStatus::Published {
                    posts.push(post);
                }
            }
        }
        Ok(posts)
    }

    async fn load(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    async fn published(&self, post_id: Uuid) -> Result<Post> {
        match self.posts.get(post_id).await? {
            Some(post) if post.status == PostStatus::Published => Ok(post),
            _ => Err(AppError::not_found("Post")),
        }
    }
}
