//! User repository for database operations
//!
//! Covers credential storage (registration, login lookup, password
//! verification) and profile reads/updates. Passwords are hashed with
//! Argon2 before they reach the database; derived profile counts are
//! computed from the relation tables on every read.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewUser, Profile, UpdateProfile, User};

const USER_COLUMNS: &str =
    "id, email, username, password_hash, bio, avatar, created_at, updated_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password
    ///
    /// A duplicate email or username surfaces as [`ApiError::Conflict`],
    /// whether caught by the pre-insert check in the handler or by the
    /// unique constraint under a concurrent registration.
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        info!("Creating new user: {}", new_user.username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                ApiError::Internal
            })?
            .to_string();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("Email or username already exists".to_string())
            }
            _ => ApiError::from(e),
        })?;

        Ok(user_from_row(&row))
    }

    /// Find a user by login identifier (email or username)
    pub async fn find_by_login(&self, login: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 OR username = $1
            "#,
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Verify a user's password against its stored hash
    pub fn verify_password(&self, user: &User, password: &str) -> ApiResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            error!("Failed to parse password hash: {}", e);
            ApiError::Internal
        })?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Update a user's profile; absent fields are left unchanged
    pub async fn update_profile(&self, id: Uuid, update: &UpdateProfile) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET bio = COALESCE($2, bio),
                avatar = COALESCE($3, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&update.bio)
        .bind(&update.avatar)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

        Ok(user_from_row(&row))
    }

    /// Fetch a public profile by username with derived counts
    pub async fn profile_by_username(&self, username: &str) -> ApiResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.bio, u.avatar,
                   (SELECT COUNT(*) FROM audios a WHERE a.user_id = u.id) AS audio_count,
                   (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS follower_count,
                   (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Profile {
            id: row.get("id"),
            username: row.get("username"),
            bio: row.get("bio"),
            avatar: row.get("avatar"),
            audio_count: row.get("audio_count"),
            follower_count: row.get("follower_count"),
            following_count: row.get("following_count"),
        }))
    }
}
