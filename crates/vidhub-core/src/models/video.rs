use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::OwnerDetails;

/// A stored video. `video_file` and `thumbnail` are always non-empty asset URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Length in seconds, as reported by the media store at upload time
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Fields required to insert a new video.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub owner_id: Uuid,
}

/// Fields replaced together by the update workflow.
#[derive(Debug, Clone)]
pub struct VideoDetailsUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// A video row joined with its owner. `owner_details` is absent when the owner
/// row no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    #[serde(flatten)]
    pub video: Video,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_details: Option<OwnerDetails>,
}
