//! # PostgresGateway
//!
//! sqlx-backed gateway. Status transitions are single conditional
//! `UPDATE ... WHERE status = ANY(...)` statements so the guard check and
//! the write are one atomic operation; unique violations surface as
//! `AppError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

use domains::{
    AppError, Author, Bookmark, Bot, BotPatch, BotRepo, BotStats, BotStatus, Comment, CommentRepo,
    CommentStatus, ContentPatch, Post, PostFormat, PostQuery, PostRepo, PostScope, PostStatus,
    Reaction, ReactionType, Result, User, UserRepo, UserRole,
};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresGateway {
    pool: PgPool,
}

impl PostgresGateway {
    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(internal)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;
        Ok(PostgresGateway { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PostgresGateway { pool }
    }

    async fn post_tags(&self, post_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT t.name FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = $1 ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows.into_iter().map(|r| r.get("name")).collect())
    }

    /// Tags for a page of posts in one round-trip.
    async fn tags_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT pt.post_id, t.name FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ANY($1) ORDER BY t.name",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.get("post_id"))
                .or_default()
                .push(row.get("name"));
        }
        Ok(map)
    }

    /// Replace a post's tag links inside an open transaction.
    async fn write_tags(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post_id: Uuid,
        tags: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut **tx)
            .await
            .map_err(internal)?;
        for name in tags {
            let tag_id: Uuid = sqlx::query(
                "INSERT INTO tags (id, name) VALUES ($1, $2) \
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(Uuid::now_v7())
            .bind(name)
            .fetch_one(&mut **tx)
            .await
            .map_err(internal)?
            .get("id");
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut **tx)
                .await
                .map_err(internal)?;
        }
        Ok(())
    }
}

const POST_COLUMNS: &str = "id, title, slug, body, excerpt, format, status, author_type, \
     user_author_id, bot_author_id, owner_id, view_count, pinned_at, created_at, published_at";

fn post_from_row(row: &PgRow) -> Result<Post> {
    let author_type: String = row.get("author_type");
    let user_author: Option<Uuid> = row.get("user_author_id");
    let bot_author: Option<Uuid> = row.get("bot_author_id");
    // the stored columns must satisfy the dual-authorship XOR
    let author = match (author_type.as_str(), user_author, bot_author) {
        ("USER", Some(id), None) => Author::Human(id),
        ("BOT", None, Some(id)) => Author::Bot(id),
        _ => {
            return Err(AppError::Internal(
                "post row violates author exclusivity".into(),
            ))
        }
    };
    let view_count: i64 = row.get("view_count");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        body: row.get("body"),
        excerpt: row.get("excerpt"),
        format: parse_with(PostFormat::parse, row.get("format"))?,
        status: parse_with(PostStatus::parse, row.get("status"))?,
        author,
        owner_id: row.get("owner_id"),
        view_count: view_count.max(0) as u64,
        pinned_at: row.get("pinned_at"),
        created_at: row.get("created_at"),
        published_at: row.get("published_at"),
        tags: Vec::new(),
    })
}

fn bot_from_row(row: &PgRow) -> Result<Bot> {
    Ok(Bot {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        avatar: row.get("avatar"),
        api_key_hash: row.get("api_key_hash"),
        api_key_hint: row.get("api_key_hint"),
        trusted: row.get("trusted"),
        status: parse_with(BotStatus::parse, row.get("status"))?,
        can_draft: row.get("can_draft"),
        can_publish: row.get("can_publish"),
        can_comment: row.get("can_comment"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    let author_type: String = row.get("author_type");
    let user_author: Option<Uuid> = row.get("user_author_id");
    let bot_author: Option<Uuid> = row.get("bot_author_id");
    let author = match (author_type.as_str(), user_author, bot_author) {
        ("USER", Some(id), None) => Author::Human(id),
        ("BOT", None, Some(id)) => Author::Bot(id),
        _ => {
            return Err(AppError::Internal(
                "comment row violates author exclusivity".into(),
            ))
        }
    };
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        body: row.get("body"),
        author,
        status: parse_with(CommentStatus::parse, row.get("status"))?,
        created_at: row.get("created_at"),
    })
}

fn parse_with<T>(parse: fn(&str) -> Option<T>, raw: String) -> Result<T> {
    parse(&raw).ok_or_else(|| AppError::Internal(format!("unknown enum value '{raw}'")))
}

fn author_columns(author: Author) -> (&'static str, Option<Uuid>, Option<Uuid>) {
    match author {
        Author::Human(id) => ("USER", Some(id), None),
        Author::Bot(id) => ("BOT", None, Some(id)),
    }
}

fn internal(err: sqlx::Error) -> AppError {
    AppError::Internal(err.to_string())
}

/// Map unique-constraint violations to `Conflict`, everything else to
/// `Internal`.
fn map_insert(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::Conflict(format!("{what} already exists"));
        }
    }
    internal(err)
}

fn statuses(list: &[PostStatus]) -> Vec<String> {
    list.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl PostRepo for PostgresGateway {
    async fn insert(&self, post: &Post) -> Result<()> {
        let (author_type, user_author, bot_author) = author_columns(post.author);
        let mut tx = self.pool.begin().await.map_err(internal)?;
        sqlx::query(
            "INSERT INTO posts (id, title, slug, body, excerpt, format, status, author_type, \
             user_author_id, bot_author_id, owner_id, view_count, pinned_at, created_at, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.body)
        .bind(&post.excerpt)
        .bind(post.format.as_str())
        .bind(post.status.as_str())
        .bind(author_type)
        .bind(user_author)
        .bind(bot_author)
        .bind(post.owner_id)
        .bind(post.view_count as i64)
        .bind(post.pinned_at)
        .bind(post.created_at)
        .bind(post.published_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert(e, "slug"))?;

        Self::write_tags(&mut tx, post.id, &post.tags).await?;
        tx.commit().await.map_err(internal)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        match row {
            Some(row) => {
                let mut post = post_from_row(&row)?;
                post.tags = self.post_tags(post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        match row {
            Some(row) => {
                let mut post = post_from_row(&row)?;
                post.tags = self.post_tags(post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64)> {
        // WHERE clause per scope; bindings line up across the count and the
        // page query.
        let (clause, bind_status, bind_uuid, bind_statuses): (
            &str,
            Option<String>,
            Option<Uuid>,
            Option<Vec<String>>,
        ) = match &query.scope {
            PostScope::Public => ("status = 'PUBLISHED'", None, None, None),
            PostScope::BotFeed {
                bot_id,
                status: Some(status),
            } => (
                "bot_author_id = $1 AND status = $2",
                Some(status.as_str().to_string()),
                Some(*bot_id),
                None,
            ),
            PostScope::BotFeed {
                bot_id,
                status: None,
            } => (
                "(status = 'PUBLISHED' OR bot_author_id = $1)",
                None,
                Some(*bot_id),
                None,
            ),
            PostScope::Owner { owner_id, statuses: wanted } => (
                "owner_id = $1 AND status = ANY($2)",
                None,
                Some(*owner_id),
                Some(statuses(wanted)),
            ),
        };

        let mut where_sql = clause.to_string();
        let mut next_param = 1
            + bind_uuid.is_some() as usize
            + bind_status.is_some() as usize
            + bind_statuses.is_some() as usize;
        if query.format.is_some() {
            where_sql.push_str(&format!(" AND format = ${next_param}"));
            next_param += 1;
        }

        let count_sql = format!("SELECT COUNT(*) AS n FROM posts WHERE {where_sql}");
        let page_sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {where_sql} \
             ORDER BY created_at DESC LIMIT ${next_param} OFFSET ${}",
            next_param + 1
        );

        macro_rules! bind_common {
            ($q:expr) => {{
                let mut q = $q;
                if let Some(id) = bind_uuid {
                    q = q.bind(id);
                }
                if let Some(status) = &bind_status {
                    q = q.bind(status);
                }
                if let Some(list) = &bind_statuses {
                    q = q.bind(list);
                }
                if let Some(format) = query.format {
                    q = q.bind(format.as_str());
                }
                q
            }};
        }

        let total: i64 = bind_common!(sqlx::query(&count_sql))
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?
            .get("n");

        let rows = bind_common!(sqlx::query(&page_sql))
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            posts.push(post_from_row(row)?);
        }
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.tags_for(&ids).await?;
        for post in &mut posts {
            post.tags = tags.remove(&post.id).unwrap_or_default();
        }
        Ok((posts, total.max(0) as u64))
    }

    async fn update_content(&self, id: Uuid, patch: &ContentPatch) -> Result<Option<Post>> {
        let mut tx = self.pool.begin().await.map_err(internal)?;
        let row = sqlx::query(&format!(
            "UPDATE posts SET \
                 title   = COALESCE($2, title), \
                 body    = COALESCE($3, body), \
                 excerpt = COALESCE($4, excerpt), \
                 format  = COALESCE($5, format) \
             WHERE id = $1 AND status IN ('DRAFT', 'PENDING_REVIEW') \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.body)
        .bind(&patch.excerpt)
        .bind(patch.format.map(|f| f.as_str()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(internal)?;
            return Ok(None);
        };
        let mut post = post_from_row(&row)?;
        if let Some(tags) = &patch.tags {
            Self::write_tags(&mut tx, id, tags).await?;
        }
        tx.commit().await.map_err(internal)?;
        post.tags = self.post_tags(id).await?;
        Ok(Some(post))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: &[PostStatus],
        to: PostStatus,
        stamp_published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        // guard check and write in one statement; published_at is stamped
        // at most once
        let row = sqlx::query(&format!(
            "UPDATE posts SET \
                 status = $2, \
                 published_at = CASE WHEN $3 THEN COALESCE(published_at, $4) \
                                     ELSE published_at END \
             WHERE id = $1 AND status = ANY($5) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(to.as_str())
        .bind(stamp_published)
        .bind(now)
        .bind(statuses(from))
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        match row {
            Some(row) => {
                let mut post = post_from_row(&row)?;
                post.tags = self.post_tags(post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<u64>> {
        let row = sqlx::query(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(|r| {
            let count: i64 = r.get("view_count");
            count.max(0) as u64
        }))
    }

    async fn set_pinned(
        &self,
        id: Uuid,
        pinned_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET pinned_at = $2 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(pinned_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        match row {
            Some(row) => {
                let mut post = post_from_row(&row)?;
                post.tags = self.post_tags(post.id).await?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }
}

const BOT_COLUMNS: &str = "id, name, description, avatar, api_key_hash, api_key_hint, trusted, \
     status, can_draft, can_publish, can_comment, owner_id, created_at";

#[async_trait]
impl BotRepo for PostgresGateway {
    async fn insert(&self, bot: &Bot) -> Result<()> {
        sqlx::query(
            "INSERT INTO bots (id, name, description, avatar, api_key_hash, api_key_hint, \
             trusted, status, can_draft, can_publish, can_comment, owner_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(bot.id)
        .bind(&bot.name)
        .bind(&bot.description)
        .bind(&bot.avatar)
        .bind(&bot.api_key_hash)
        .bind(&bot.api_key_hint)
        .bind(bot.trusted)
        .bind(bot.status.as_str())
        .bind(bot.can_draft)
        .bind(bot.can_publish)
        .bind(bot.can_comment)
        .bind(bot.owner_id)
        .bind(bot.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert(e, "API key hash"))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Bot>> {
        let row = sqlx::query(&format!("SELECT {BOT_COLUMNS} FROM bots WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        row.as_ref().map(bot_from_row).transpose()
    }

    async fn find_active_by_key_hash(&self, key_hash: &str) -> Result<Option<Bot>> {
        let row = sqlx::query(&format!(
            "SELECT {BOT_COLUMNS} FROM bots WHERE api_key_hash = $1 AND status = 'ACTIVE'"
        ))
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.as_ref().map(bot_from_row).transpose()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Bot>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOT_COLUMNS} FROM bots WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows.iter().map(bot_from_row).collect()
    }

    async fn update(&self, id: Uuid, patch: &BotPatch) -> Result<Option<Bot>> {
        // double-Option fields distinguish "leave alone" from "set null"
        let row = sqlx::query(&format!(
            "UPDATE bots SET \
                 name        = COALESCE($2, name), \
                 description = CASE WHEN $3 THEN $4 ELSE description END, \
                 avatar      = CASE WHEN $5 THEN $6 ELSE avatar END, \
                 trusted     = COALESCE($7, trusted), \
                 can_draft   = COALESCE($8, can_draft), \
                 can_publish = COALESCE($9, can_publish), \
                 can_comment = COALESCE($10, can_comment) \
             WHERE id = $1 RETURNING {BOT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.avatar.is_some())
        .bind(patch.avatar.clone().flatten())
        .bind(patch.trusted)
        .bind(patch.can_draft)
        .bind(patch.can_publish)
        .bind(patch.can_comment)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.as_ref().map(bot_from_row).transpose()
    }

    async fn set_key(&self, id: Uuid, key_hash: &str, key_hint: &str) -> Result<Option<Bot>> {
        let row = sqlx::query(&format!(
            "UPDATE bots SET api_key_hash = $2, api_key_hint = $3 \
             WHERE id = $1 RETURNING {BOT_COLUMNS}"
        ))
        .bind(id)
        .bind(key_hash)
        .bind(key_hint)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.as_ref().map(bot_from_row).transpose()
    }

    async fn set_status(&self, id: Uuid, status: BotStatus) -> Result<Option<Bot>> {
        let row = sqlx::query(&format!(
            "UPDATE bots SET status = $2 WHERE id = $1 RETURNING {BOT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        row.as_ref().map(bot_from_row).transpose()
    }

    async fn stats(&self, bot_id: Uuid) -> Result<BotStats> {
        let posts: i64 = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE bot_author_id = $1")
            .bind(bot_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?
            .get("n");
        let comments: i64 =
            sqlx::query("SELECT COUNT(*) AS n FROM comments WHERE bot_author_id = $1")
                .bind(bot_id)
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?
                .get("n");
        Ok(BotStats {
            posts: posts.max(0) as u64,
            comments: comments.max(0) as u64,
        })
    }
}

#[async_trait]
impl UserRepo for PostgresGateway {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, image, role, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        row.map(|row| {
            Ok(User {
                id: row.get("id"),
                name: row.get("name"),
                image: row.get("image"),
                role: parse_with(UserRole::parse, row.get("role"))?,
                created_at: row.get("created_at"),
            })
        })
        .transpose()
    }

    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, image, role, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert(e, "user"))?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepo for PostgresGateway {
    async fn insert(&self, comment: &Comment) -> Result<()> {
        let (author_type, user_author, bot_author) = author_columns(comment.author);
        sqlx::query(
            "INSERT INTO comments (id, post_id, body, author_type, user_author_id, \
             bot_author_id, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(&comment.body)
        .bind(author_type)
        .bind(user_author)
        .bind(bot_author)
        .bind(comment.status.as_str())
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(())
    }

    async fn list_visible(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, post_id, body, author_type, user_author_id, bot_author_id, status, \
             created_at FROM comments \
             WHERE post_id = $1 AND status = 'VISIBLE' ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows.iter().map(comment_from_row).collect()
    }
}

#[async_trait]
impl domains::EngagementRepo for PostgresGateway {
    async fn add_reaction(&self, reaction: &Reaction) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO reactions (user_id, post_id, kind, created_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(reaction.user_id)
        .bind(reaction.post_id)
        .bind(reaction.kind.as_str())
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_reaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        kind: ReactionType,
    ) -> Result<()> {
        sqlx::query("DELETE FROM reactions WHERE user_id = $1 AND post_id = $2 AND kind = $3")
            .bind(user_id)
            .bind(post_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn reaction_counts(
        &self,
        post_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(HashMap<ReactionType, u64>, Vec<ReactionType>)> {
        let rows = sqlx::query(
            "SELECT kind, COUNT(*) AS n FROM reactions WHERE post_id = $1 GROUP BY kind",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        let mut counts = HashMap::new();
        for row in rows {
            let kind = parse_with(ReactionType::parse, row.get("kind"))?;
            let n: i64 = row.get("n");
            counts.insert(kind, n.max(0) as u64);
        }

        let mut mine = Vec::new();
        if let Some(user_id) = user_id {
            let rows =
                sqlx::query("SELECT kind FROM reactions WHERE post_id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(internal)?;
            for row in rows {
                mine.push(parse_with(ReactionType::parse, row.get("kind"))?);
            }
        }
        Ok((counts, mine))
    }

    async fn add_bookmark(&self, bookmark: &Bookmark) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO bookmarks (user_id, post_id, created_at) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(bookmark.user_id)
        .bind(bookmark.post_id)
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(())
    }

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS x FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.is_some())
    }

    async fn list_bookmarks(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query(
            "SELECT user_id, post_id, created_at FROM bookmarks \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows
            .into_iter()
            .map(|row| Bookmark {
                user_id: row.get("user_id"),
                post_id: row.get("post_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
