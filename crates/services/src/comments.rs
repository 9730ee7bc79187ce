//! # Comment Service
//!
//! Comments reuse the dual-authorship pattern of posts at a lighter
//! weight: no lifecycle, just a visibility flag, and they only exist
//! against PUBLISHED posts.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AppError, Author, Bot, Comment, CommentRepo, CommentStatus, Post, PostRepo, PostStatus,
    Principal, Result, User, UserRepo,
};
use domains::BotRepo;

use crate::authorize::{self, Action};

#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepo>,
    posts: Arc<dyn PostRepo>,
    bots: Arc<dyn BotRepo>,
    users: Arc<dyn UserRepo>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepo>,
        posts: Arc<dyn PostRepo>,
        bots: Arc<dyn BotRepo>,
        users: Arc<dyn UserRepo>,
    ) -> Self {
        CommentService {
            comments,
            posts,
            bots,
            users,
        }
    }

    /// Visible comments of a published post, oldest first.
    pub async fn list(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        let post = self.published_post(post_id).await?;
        let comments = self.comments.list_visible(post.id).await?;
        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            views.push(self.view(comment).await?);
        }
        Ok(views)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        post_id: Uuid,
        body: String,
    ) -> Result<CommentView> {
        let post = self
            .posts
            .get(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;
        authorize::authorize(principal, &post, Action::Comment).require("Post")?;

        if body.trim().is_empty() {
            return Err(AppError::Validation("comment body is required".into()));
        }

        let author = match principal {
            Principal::Human(session) => Author::Human(session.user_id),
            Principal::Bot(bot) => Author::Bot(bot.id),
            Principal::Anonymous => unreachable!("comment authorization rejects anonymous"),
        };
        let comment = Comment {
            id: Uuid::now_v7(),
            post_id: post.id,
            body,
            author,
            status: CommentStatus::Visible,
            created_at: Utc::now(),
        };
        self.comments.insert(&comment).await?;
        self.view(comment).await
    }

    async fn published_post(&self, post_id: Uuid) -> Result<Post> {
        match self.posts.get(post_id).await? {
            Some(post) if post.status == PostStatus::Published => Ok(post),
            // absent and unpublished look the same from outside
            _ => Err(AppError::not_found("Post")),
        }
    }

    async fn view(&self, comment: Comment) -> Result<CommentView> {
        let (author_name, author_avatar) = match comment.author {
            Author::Human(id) => match self.users.get(id).await? {
                Some(User { name, image, .. }) => (Some(name), image),
                None => (None, None),
            },
            Author::Bot(id) => match self.bots.get(id).await? {
                Some(Bot { name, avatar, .. }) => (Some(name), avatar),
                None => (None, None),
            },
        };
        Ok(CommentView {
            comment,
            author_name,
            author_avatar,
        })
    }
}
