//! Social repository: like and follow edges
//!
//! Both relationships are existence-only rows keyed by their pair of IDs.
//! Toggling inserts with ON CONFLICT DO NOTHING and falls back to a delete,
//! so the uniqueness check lives in the storage constraint and two
//! concurrent toggles can never produce a duplicate edge. Counts are always
//! computed from the edge rows, never from stored counters.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Social repository
#[derive(Clone)]
pub struct SocialRepository {
    pool: PgPool,
}

impl SocialRepository {
    /// Create a new social repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Toggle a like edge, returning the resulting state
    ///
    /// Returns true when the call created the edge, false when it removed
    /// it. A concurrent insert losing the race lands in the delete branch
    /// and reports false, matching what a sequential second call would see.
    pub async fn toggle_like(&self, user_id: Uuid, audio_id: Uuid) -> ApiResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (user_id, audio_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, audio_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(audio_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            info!("User {} liked audio {}", user_id, audio_id);
            return Ok(true);
        }

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND audio_id = $2
            "#,
        )
        .bind(user_id)
        .bind(audio_id)
        .execute(&self.pool)
        .await?;

        info!("User {} unliked audio {}", user_id, audio_id);
        Ok(false)
    }

    /// Toggle a follow edge, returning the resulting state
    ///
    /// Self-follow is rejected before touching storage.
    pub async fn toggle_follow(&self, follower_id: Uuid, target_id: Uuid) -> ApiResult<bool> {
        if follower_id == target_id {
            return Err(ApiError::Validation("Cannot follow yourself".to_string()));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, following_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, following_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(target_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            info!("User {} followed user {}", follower_id, target_id);
            return Ok(true);
        }

        sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND following_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        info!("User {} unfollowed user {}", follower_id, target_id);
        Ok(false)
    }

    /// Check whether a like edge exists
    pub async fn is_liked(&self, user_id: Uuid, audio_id: Uuid) -> ApiResult<bool> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND audio_id = $2)",
        )
        .bind(user_id)
        .bind(audio_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked)
    }

    /// Count like edges for an audio post
    pub async fn count_likes(&self, audio_id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE audio_id = $1")
            .bind(audio_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count a user's followers
    pub async fn count_followers(&self, user_id: Uuid) -> ApiResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Count how many users a user follows
    pub async fn count_following(&self, user_id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
