//! API service routes

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    middleware::{auth_middleware, optional_auth_middleware},
    state::AppState,
    upload::MAX_UPLOAD_BYTES,
};

mod audio;
mod auth;
mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/audio",
            post(audio::upload_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/audio/:id/like", post(audio::toggle_like))
        .route("/api/audio/:id/comment", post(audio::add_comment))
        .route("/api/users/profile", patch(users::update_profile))
        .route("/api/users/:id/follow", post(users::toggle_follow))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The feed personalizes per-viewer like state when a valid token is
    // present but serves anonymous viewers too
    let feed_routes = Router::new()
        .route("/api/audio/feed", get(audio::get_feed))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/audio/:id", get(audio::get_audio))
        .route("/api/audio/:id/comments", get(audio::list_comments))
        .route("/api/users/:username", get(users::get_profile))
        .route("/api/users/:username/audios", get(users::list_user_audios))
        .merge(feed_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&state.upload_config.dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "wavecast-api"
    }))
}
