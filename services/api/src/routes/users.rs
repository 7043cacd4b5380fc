//! User routes: public profiles, profile updates, follows

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{FeedQuery, UpdateProfile},
    state::AppState,
};

/// Get a public profile by username, with derived counts
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repository
        .profile_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(profile))
}

/// Update the authenticated user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfile>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .update_profile(auth_user.id, &payload)
        .await?;

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "bio": user.bio,
        "avatar": user.avatar,
    })))
}

/// Toggle a follow on another user
pub async fn toggle_follow(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if state.user_repository.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let following = state
        .social_repository
        .toggle_follow(auth_user.id, id)
        .await?;

    Ok(Json(json!({ "following": following })))
}

/// List a user's audio posts, newest first
pub async fn list_user_audios(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repository
        .profile_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let (_, page_size) = query.normalize();
    let audios = state
        .audio_repository
        .list_by_owner(profile.id, page_size, query.offset())
        .await?;

    Ok(Json(audios))
}
