//! Authentication routes: register, login, current user

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, UserResponse},
    state::AppState,
    validation::{validate_email, validate_password, validate_username},
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_username(&payload.username).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;

    // The unique constraint is the authority; this check just gives a
    // clean error for the common case
    if state
        .user_repository
        .find_by_login(&payload.email)
        .await?
        .is_some()
        || state
            .user_repository
            .find_by_login(&payload.username)
            .await?
            .is_some()
    {
        return Err(ApiError::Conflict(
            "Email or username already exists".to_string(),
        ));
    }

    let user = state
        .user_repository
        .create(&NewUser {
            email: payload.email,
            username: payload.username,
            password: payload.password,
        })
        .await?;

    let token = state.jwt_service.issue(user.id).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        ApiError::Internal
    })?;

    info!("Registered user {}", user.username);

    let response = AuthResponse {
        token,
        user: UserResponse::from(&user),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email or username
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for {}", payload.login);

    let user = state
        .user_repository
        .find_by_login(&payload.login)
        .await?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    if !state
        .user_repository
        .verify_password(&user, &payload.password)?
    {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.jwt_service.issue(user.id).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        ApiError::Internal
    })?;

    let response = AuthResponse {
        token,
        user: UserResponse::from(&user),
    };

    Ok(Json(response))
}

/// Return the authenticated user's own profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth_user.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse::from(&user)))
}
