//! Application state shared across handlers

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{AudioRepository, SocialRepository, UserRepository};
use crate::upload::UploadConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub social_repository: SocialRepository,
    pub audio_repository: AudioRepository,
    pub upload_config: UploadConfig,
}
