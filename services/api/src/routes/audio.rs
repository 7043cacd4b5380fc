//! Audio routes: upload, feed, single post, likes, comments

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{FeedQuery, NewAudio},
    state::AppState,
    upload::{self, MAX_UPLOAD_BYTES},
};

/// Upload a new audio post (multipart: audio file, title, description, tags)
pub async fn upload_audio(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut title = None;
    let mut description = None;
    let mut tags = Vec::new();
    let mut file_name = None;
    let mut file_data = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::Validation(format!("Invalid multipart request: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Invalid title field: {}", e))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Invalid description field: {}", e))
                })?);
            }
            "tags" => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Invalid tags field: {}", e))
                })?;
                tags = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "audio" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !upload::is_allowed_mime(&content_type) {
                    return Err(ApiError::Validation(
                        "Invalid file type. Only MP3 and WAV files are allowed".to_string(),
                    ));
                }

                file_name = Some(field.file_name().unwrap_or("audio").to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read audio file: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;
    let file_data =
        file_data.ok_or_else(|| ApiError::Validation("No audio file provided".to_string()))?;
    let file_name = file_name.unwrap_or_else(|| "audio".to_string());

    if file_data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::Validation(
            "Audio file exceeds the 10 MiB limit".to_string(),
        ));
    }

    let file_path = upload::store_audio(&state.upload_config.dir, &file_name, &file_data)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store uploaded audio: {}", e);
            ApiError::Internal
        })?;

    let audio = state
        .audio_repository
        .create(
            auth_user.id,
            &NewAudio {
                title,
                description: description.filter(|d| !d.trim().is_empty()),
                file_path,
                tags,
            },
        )
        .await?;

    info!("User {} uploaded audio {}", auth_user.id, audio.id);

    Ok((StatusCode::CREATED, Json(audio)))
}

/// Get the feed, newest first, with per-viewer like annotation when
/// authenticated
pub async fn get_feed(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<impl IntoResponse> {
    let (_, page_size) = query.normalize();
    let viewer_id = viewer.map(|Extension(user)| user.id);

    let items = state
        .audio_repository
        .feed(viewer_id, page_size, query.offset())
        .await?;

    Ok(Json(items))
}

/// Get a single audio post with owner and counts
pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let audio = state
        .audio_repository
        .find_detail(id)
        .await?
        .ok_or(ApiError::NotFound("Audio"))?;

    Ok(Json(audio))
}

/// Toggle the caller's like on an audio post
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.audio_repository.exists(id).await? {
        return Err(ApiError::NotFound("Audio"));
    }

    let liked = state.social_repository.toggle_like(auth_user.id, id).await?;

    Ok(Json(json!({ "liked": liked })))
}

/// Add a comment to an audio post
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<crate::models::CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if !state.audio_repository.exists(id).await? {
        return Err(ApiError::NotFound("Audio"));
    }

    let comment = state
        .audio_repository
        .add_comment(id, auth_user.id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List comments on an audio post, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.audio_repository.exists(id).await? {
        return Err(ApiError::NotFound("Audio"));
    }

    let comments = state.audio_repository.list_comments(id).await?;

    Ok(Json(comments))
}
