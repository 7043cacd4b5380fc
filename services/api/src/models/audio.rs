//! Audio post, comment, and feed models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::PublicUser;

/// Audio post entity
#[derive(Debug, Clone, Serialize)]
pub struct AudioPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// New audio post payload, produced by the upload handler
#[derive(Debug, Clone)]
pub struct NewAudio {
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub tags: Vec<String>,
}

/// Audio post with its owner's public fields and derived counts
#[derive(Debug, Clone, Serialize)]
pub struct AudioDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub user: PublicUser,
    pub like_count: i64,
    pub comment_count: i64,
}

/// Feed entry: an audio post annotated with owner fields, derived counts,
/// and (for authenticated viewers) whether the viewer has liked it.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub user: PublicUser,
    pub like_count: i64,
    pub comment_count: i64,
    /// Absent for anonymous viewers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

/// Comment with its author's public fields
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub audio_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: PublicUser,
}

/// Request for comment creation
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// Query parameters for paginated listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub page_size: Option<u32>,
}

impl FeedQuery {
    /// Clamp the query to valid bounds: page >= 1, page_size in [1, 100],
    /// defaulting to page 1 with 10 items.
    pub fn normalize(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(10).clamp(1, 100);
        (page, page_size)
    }

    /// Row offset for the normalized page
    pub fn offset(&self) -> i64 {
        let (page, page_size) = self.normalize();
        (page as i64 - 1) * page_size as i64
    }
}
