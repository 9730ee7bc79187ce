//! # MemoryGateway
//!
//! DashMap-backed gateway used by the test suites and the default dev
//! profile. Per-key shard locks give the compare-and-set semantics the
//! ports require: `get_mut` holds the entry while a transition checks its
//! precondition and writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use domains::{
    AppError, Bookmark, Bot, BotPatch, BotRepo, BotStats, BotStatus, Comment, CommentRepo,
    CommentStatus, EngagementRepo, Post, PostQuery, PostRepo, PostScope, PostStatus, Reaction,
    ReactionType, Result, User, UserRepo,
};

#[derive(Default)]
pub struct MemoryGateway {
    users: DashMap<Uuid, User>,
    bots: DashMap<Uuid, Bot>,
    /// api_key_hash → bot id. Maintained alongside `bots` so credential
    /// lookups stay O(1).
    key_index: DashMap<String, Uuid>,
    posts: DashMap<Uuid, Post>,
    /// slug → post id, the uniqueness constraint.
    slug_index: DashMap<String, Uuid>,
    comments: DashMap<Uuid, Comment>,
    reactions: DashMap<(Uuid, Uuid, ReactionType), Reaction>,
    bookmarks: DashMap<(Uuid, Uuid), Bookmark>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepo for MemoryGateway {
    async fn insert(&self, post: &Post) -> Result<()> {
        match self.slug_index.entry(post.slug.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "slug '{}' already exists",
                    post.slug
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(post.id);
            }
        }
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let Some(id) = self.slug_index.get(slug).map(|e| *e) else {
            return Ok(None);
        };
        PostRepo::get(self, id).await
    }

    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64)> {
        let mut rows: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| {
                let post = entry.value();
                let in_scope = match &query.scope {
                    PostScope::Public => post.status == PostStatus::Published,
                    PostScope::BotFeed { bot_id, status } => match status {
                        Some(status) => {
                            post.author.is_bot(*bot_id) && post.status == *status
                        }
                        None => {
                            post.status == PostStatus::Published
                                || post.author.is_bot(*bot_id)
                        }
                    },
                    PostScope::Owner { owner_id, statuses } => {
                        post.owner_id == *owner_id && statuses.contains(&post.status)
                    }
                };
                in_scope && query.format.map_or(true, |f| post.format == f)
            })
            .map(|entry| entry.value().clone())
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_content(
        &self,
        id: Uuid,
        patch: &domains::ContentPatch,
    ) -> Result<Option<Post>> {
        let Some(mut entry) = self.posts.get_mut(&id) else {
            return Ok(None);
        };
        if entry.content_frozen() {
            return Ok(None);
        }
        if let Some(title) = &patch.title {
            entry.title = title.clone();
        }
        if let Some(body) = &patch.body {
            entry.body = body.clone();
        }
        if let Some(excerpt) = &patch.excerpt {
            entry.excerpt = excerpt.clone();
        }
        if let Some(format) = patch.format {
            entry.format = format;
        }
        if let Some(tags) = &patch.tags {
            entry.tags = tags.clone();
        }
        Ok(Some(entry.clone()))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: &[PostStatus],
        to: PostStatus,
        stamp_published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let Some(mut entry) = self.posts.get_mut(&id) else {
            return Ok(None);
        };
        if !from.contains(&entry.status) {
            return Ok(None);
        }
        entry.status = to;
        if stamp_published && entry.published_at.is_none() {
            entry.published_at = Some(now);
        }
        Ok(Some(entry.clone()))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<u64>> {
        let Some(mut entry) = self.posts.get_mut(&id) else {
            return Ok(None);
        };
        entry.view_count += 1;
        Ok(Some(entry.view_count))
    }

    async fn set_pinned(
        &self,
        id: Uuid,
        pinned_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Post>> {
        let Some(mut entry) = self.posts.get_mut(&id) else {
            return Ok(None);
        };
        entry.pinned_at = pinned_at;
        Ok(Some(entry.clone()))
    }
}

#[async_trait]
impl BotRepo for MemoryGateway {
    async fn insert(&self, bot: &Bot) -> Result<()> {
        match self.key_index.entry(bot.api_key_hash.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("API key hash already exists".into()))
            }
            Entry::Vacant(slot) => {
                slot.insert(bot.id);
            }
        }
        self.bots.insert(bot.id, bot.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Bot>> {
        Ok(self.bots.get(&id).map(|b| b.value().clone()))
    }

    async fn find_active_by_key_hash(&self, key_hash: &str) -> Result<Option<Bot>> {
        let Some(id) = self.key_index.get(key_hash).map(|e| *e) else {
            return Ok(None);
        };
        Ok(self
            .bots
            .get(&id)
            .filter(|bot| bot.status == BotStatus::Active && bot.api_key_hash == key_hash)
            .map(|b| b.value().clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Bot>> {
        let mut bots: Vec<Bot> = self
            .bots
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        bots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bots)
    }

    async fn update(&self, id: Uuid, patch: &BotPatch) -> Result<Option<Bot>> {
        let Some(mut entry) = self.bots.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            entry.name = name.clone();
        }
        if let Some(description) = &patch.description {
            entry.description = description.clone();
        }
        if let Some(avatar) = &patch.avatar {
            entry.avatar = avatar.clone();
        }
        if let Some(trusted) = patch.trusted {
            entry.trusted = trusted;
        }
        if let Some(can_draft) = patch.can_draft {
            entry.can_draft = can_draft;
        }
        if let Some(can_publish) = patch.can_publish {
            entry.can_publish = can_publish;
        }
        if let Some(can_comment) = patch.can_comment {
            entry.can_comment = can_comment;
        }
        Ok(Some(entry.clone()))
    }

    async fn set_key(&self, id: Uuid, key_hash: &str, key_hint: &str) -> Result<Option<Bot>> {
        let Some(mut entry) = self.bots.get_mut(&id) else {
            return Ok(None);
        };
        // the old hash must never match again once this returns
        self.key_index.remove(&entry.api_key_hash);
        self.key_index.insert(key_hash.to_string(), id);
        entry.api_key_hash = key_hash.to_string();
        entry.api_key_hint = key_hint.to_string();
        Ok(Some(entry.clone()))
    }

    async fn set_status(&self, id: Uuid, status: BotStatus) -> Result<Option<Bot>> {
        let Some(mut entry) = self.bots.get_mut(&id) else {
            return Ok(None);
        };
        entry.status = status;
        Ok(Some(entry.clone()))
    }

    async fn stats(&self, bot_id: Uuid) -> Result<BotStats> {
        let posts = self
            .posts
            .iter()
            .filter(|entry| entry.author.is_bot(bot_id))
            .count() as u64;
        let comments = self
            .comments
            .iter()
            .filter(|entry| entry.author.is_bot(bot_id))
            .count() as u64;
        Ok(BotStats { posts, comments })
    }
}

#[async_trait]
impl UserRepo for MemoryGateway {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl CommentRepo for MemoryGateway {
    async fn insert(&self, comment: &Comment) -> Result<()> {
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn list_visible(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| {
                entry.post_id == post_id && entry.status == CommentStatus::Visible
            })
            .map(|entry| entry.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl EngagementRepo for MemoryGateway {
    async fn add_reaction(&self, reaction: &Reaction) -> Result<bool> {
        let key = (reaction.user_id, reaction.post_id, reaction.kind);
        match self.reactions.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(reaction.clone());
                Ok(true)
            }
        }
    }

    async fn remove_reaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<()> {
        self.reactions.remove(&(user_id, post_id, kind));
        Ok(())
    }

    async fn reaction_counts(
        &self,
        post_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(HashMap<ReactionType, u64>, Vec<ReactionType>)> {
        let mut counts: HashMap<ReactionType, u64> = HashMap::new();
        let mut mine = Vec::new();
        for entry in self.reactions.iter() {
            if entry.post_id != post_id {
                continue;
            }
            *counts.entry(entry.kind).or_insert(0) += 1;
            if Some(entry.user_id) == user_id {
                mine.push(entry.kind);
            }
        }
        Ok((counts, mine))
    }

    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<bool> {
        match self.bookmarks.entry((bookmark.user_id, bookmark.post_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(bookmark.clone());
                Ok(true)
            }
        }
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.bookmarks.remove(&(user_id, post_id));
        Ok(())
    }

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self.bookmarks.contains_key(&(user_id, post_id)))
    }

    async fn list_bookmarks(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bookmark>> {
        let mut bookmarks: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookmarks
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Author;

    fn post_with(slug: &str, status: PostStatus) -> Post {
        let owner = Uuid::now_v7();
        Post {
            id: Uuid::now_v7(),
            title: "t".into(),
            slug: slug.into(),
            body: "b".into(),
            excerpt: "b".into(),
            format: domains::PostFormat::Article,
            status,
            author: Author::Human(owner),
            owner_id: owner,
            view_count: 0,
            pinned_at: None,
            created_at: Utc::now(),
            published_at: None,
            tags: vec![],
        }
    }

    fn bot_with(hash: &str) -> Bot {
        Bot {
            id: Uuid::now_v7(),
            name: "b".into(),
            description: None,
            avatar: None,
            api_key_hash: hash.into(),
            api_key_hint: "1234".into(),
            trusted: false,
            status: BotStatus::Active,
            can_draft: true,
            can_publish: false,
            can_comment: true,
            owner_id: Uuid::now_v7(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_slugs_conflict() {
        let gw = MemoryGateway::new();
        PostRepo::insert(&gw, &post_with("same-slug", PostStatus::Draft))
            .await
            .unwrap();
        let err = PostRepo::insert(&gw, &post_with("same-slug", PostStatus::Draft))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn slug_lookup_resolves_the_row() {
        let gw = MemoryGateway::new();
        let post = post_with("find-me", PostStatus::Published);
        let id = post.id;
        PostRepo::insert(&gw, &post).await.unwrap();

        let found = gw.get_by_slug("find-me").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(gw.get_by_slug("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let gw = MemoryGateway::new();
        let post = post_with("cas", PostStatus::PendingReview);
        let id = post.id;
        PostRepo::insert(&gw, &post).await.unwrap();

        let first = gw
            .transition(
                id,
                &[PostStatus::Draft, PostStatus::PendingReview],
                PostStatus::Published,
                true,
                Utc::now(),
            )
            .await
            .unwrap()
            .expect("first approval applies");
        let stamped = first.published_at.unwrap();

        // the second identical approval fails its precondition and must not
        // restamp
        let second = gw
            .transition(
                id,
                &[PostStatus::Draft, PostStatus::PendingReview],
                PostStatus::Published,
                true,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(second.is_none());
        let current = PostRepo::get(&gw, id).await.unwrap().unwrap();
        assert_eq!(current.published_at.unwrap(), stamped);
    }

    #[tokio::test]
    async fn frozen_posts_refuse_content_updates() {
        let gw = MemoryGateway::new();
        let post = post_with("frozen", PostStatus::Published);
        let id = post.id;
        PostRepo::insert(&gw, &post).await.unwrap();

        let patch = domains::ContentPatch {
            title: Some("new".into()),
            ..Default::default()
        };
        assert!(gw.update_content(id, &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoked_bots_fail_key_lookup() {
        let gw = MemoryGateway::new();
        let bot = bot_with("hash-a");
        let id = bot.id;
        BotRepo::insert(&gw, &bot).await.unwrap();

        assert!(gw
            .find_active_by_key_hash("hash-a")
            .await
            .unwrap()
            .is_some());
        gw.set_status(id, BotStatus::Revoked).await.unwrap();
        assert!(gw
            .find_active_by_key_hash("hash-a")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn regenerating_a_key_swaps_the_lookup_atomically() {
        let gw = MemoryGateway::new();
        let bot = bot_with("old-hash");
        let id = bot.id;
        BotRepo::insert(&gw, &bot).await.unwrap();

        gw.set_key(id, "new-hash", "5678").await.unwrap().unwrap();
        assert!(gw
            .find_active_by_key_hash("old-hash")
            .await
            .unwrap()
            .is_none());
        let found = gw
            .find_active_by_key_hash("new-hash")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.api_key_hint, "5678");
    }

    #[tokio::test]
    async fn reactions_and_bookmarks_are_unique() {
        let gw = MemoryGateway::new();
        let user = Uuid::now_v7();
        let post = Uuid::now_v7();

        let reaction = Reaction {
            user_id: user,
            post_id: post,
            kind: ReactionType::Like,
            created_at: Utc::now(),
        };
        assert!(gw.add_reaction(&reaction).await.unwrap());
        assert!(!gw.add_reaction(&reaction).await.unwrap());
        // a different type is a different row
        let insightful = Reaction {
            kind: ReactionType::Insightful,
            ..reaction.clone()
        };
        assert!(gw.add_reaction(&insightful).await.unwrap());

        let bookmark = Bookmark {
            user_id: user,
            post_id: post,
            created_at: Utc::now(),
        };
        assert!(gw.add_bookmark(&bookmark).await.unwrap());
        assert!(!gw.add_bookmark(&bookmark).await.unwrap());
    }

    #[tokio::test]
    async fn bot_feed_scope_exposes_own_drafts_only() {
        let gw = MemoryGateway::new();
        let bot_id = Uuid::now_v7();
        let mut mine = post_with("mine", PostStatus::Draft);
        mine.author = Author::Bot(bot_id);
        let theirs = post_with("theirs", PostStatus::Draft);
        let public = post_with("public", PostStatus::Published);
        for p in [&mine, &theirs, &public] {
            PostRepo::insert(&gw, p).await.unwrap();
        }

        let (rows, total) = gw
            .list(&PostQuery {
                scope: PostScope::BotFeed {
                    bot_id,
                    status: None,
                },
                format: None,
                limit: 20,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(total, 2);
        let slugs: Vec<_> = rows.iter().map(|p| p.slug.as_str()).collect();
        assert!(slugs.contains(&"mine") && slugs.contains(&"public"));
    }
}
