//! Audio repository: posts, comments, and feed assembly

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{AudioDetail, AudioPost, Comment, FeedItem, NewAudio, PublicUser};

const DETAIL_QUERY: &str = r#"
    SELECT a.id, a.title, a.description, a.file_path, a.tags, a.created_at,
           u.id AS owner_id, u.username, u.avatar,
           (SELECT COUNT(*) FROM likes l WHERE l.audio_id = a.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.audio_id = a.id) AS comment_count
    FROM audios a
    JOIN users u ON u.id = a.user_id
"#;

fn detail_from_row(row: &PgRow) -> AudioDetail {
    AudioDetail {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        file_path: row.get("file_path"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
        user: PublicUser {
            id: row.get("owner_id"),
            username: row.get("username"),
            avatar: row.get("avatar"),
        },
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        audio_id: row.get("audio_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        user: PublicUser {
            id: row.get("author_id"),
            username: row.get("username"),
            avatar: row.get("avatar"),
        },
    }
}

/// Audio repository
#[derive(Clone)]
pub struct AudioRepository {
    pool: PgPool,
}

impl AudioRepository {
    /// Create a new audio repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new audio post
    pub async fn create(&self, owner_id: Uuid, new_audio: &NewAudio) -> ApiResult<AudioPost> {
        info!("Creating audio post '{}' for user {}", new_audio.title, owner_id);

        let row = sqlx::query(
            r#"
            INSERT INTO audios (user_id, title, description, file_path, tags)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, file_path, tags, created_at
            "#,
        )
        .bind(owner_id)
        .bind(&new_audio.title)
        .bind(&new_audio.description)
        .bind(&new_audio.file_path)
        .bind(&new_audio.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(AudioPost {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            file_path: row.get("file_path"),
            tags: row.get("tags"),
            created_at: row.get("created_at"),
        })
    }

    /// Check whether an audio post exists
    pub async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM audios WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Get an audio post by ID with its owner and derived counts
    pub async fn find_detail(&self, id: Uuid) -> ApiResult<Option<AudioDetail>> {
        let row = sqlx::query(&format!("{DETAIL_QUERY} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(detail_from_row))
    }

    /// List a user's audio posts, newest first
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page_size: u32,
        offset: i64,
    ) -> ApiResult<Vec<AudioDetail>> {
        let rows = sqlx::query(&format!(
            r#"{DETAIL_QUERY}
            WHERE a.user_id = $1
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(detail_from_row).collect())
    }

    /// Assemble the feed: posts newest first, annotated with owner fields,
    /// derived counts, and the viewer's like state when a viewer is known.
    ///
    /// Ties on the creation timestamp are broken by post ID so the ordering
    /// stays deterministic and adjacent pages never overlap on a static
    /// dataset.
    pub async fn feed(
        &self,
        viewer_id: Option<Uuid>,
        page_size: u32,
        offset: i64,
    ) -> ApiResult<Vec<FeedItem>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.title, a.description, a.file_path, a.tags, a.created_at,
                   u.id AS owner_id, u.username, u.avatar,
                   (SELECT COUNT(*) FROM likes l WHERE l.audio_id = a.id) AS like_count,
                   (SELECT COUNT(*) FROM comments c WHERE c.audio_id = a.id) AS comment_count,
                   EXISTS(
                       SELECT 1 FROM likes l
                       WHERE l.audio_id = a.id AND l.user_id = $1
                   ) AS liked
            FROM audios a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(viewer_id)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| FeedItem {
                id: row.get("id"),
                title: row.get("title"),
                description: row.get("description"),
                file_path: row.get("file_path"),
                tags: row.get("tags"),
                created_at: row.get("created_at"),
                user: PublicUser {
                    id: row.get("owner_id"),
                    username: row.get("username"),
                    avatar: row.get("avatar"),
                },
                like_count: row.get("like_count"),
                comment_count: row.get("comment_count"),
                liked: viewer_id.map(|_| row.get("liked")),
            })
            .collect();

        Ok(items)
    }

    /// Add a comment to an audio post
    ///
    /// Content must be non-empty after trimming whitespace.
    pub async fn add_comment(
        &self,
        audio_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }

        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO comments (audio_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, audio_id, user_id, content, created_at
            )
            SELECT i.id, i.audio_id, i.content, i.created_at,
                   u.id AS author_id, u.username, u.avatar
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(audio_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_from_row(&row))
    }

    /// List comments on an audio post, newest first
    pub async fn list_comments(&self, audio_id: Uuid) -> ApiResult<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.audio_id, c.content, c.created_at,
                   u.id AS author_id, u.username, u.avatar
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.audio_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(audio_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }
}
