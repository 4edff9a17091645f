//! Video workflows: listing, publish (upload), retrieval, update, delete and
//! publish-status toggle.
//!
//! Ordering rules shared by every mutating workflow:
//! - validation and the ownership check run before any remote side effect;
//! - new assets are uploaded before the record that references them is written;
//! - superseded assets are scheduled for deletion only after the write succeeded.
//!
//! If an upload succeeds and a later step fails, the uploaded asset is left behind.
//! That leak is accepted; it is logged but not compensated.

use crate::services::media::upload_asset;
use crate::state::AppState;
use crate::utils::upload::TempUpload;
use uuid::Uuid;
use vidhub_core::models::{
    NewVideo, Video, VideoDetailsUpdate, VideoListParams, VideoListQuery, VideoWithOwner,
};
use vidhub_core::validation::{parse_id, require_non_blank};
use vidhub_core::AppError;
use vidhub_storage::AssetKind;

/// Fields received for a new video.
#[derive(Debug, Default)]
pub struct PublishVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<TempUpload>,
    pub thumbnail: Option<TempUpload>,
}

/// Fields received for a video update.
#[derive(Debug, Default)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<TempUpload>,
}

pub struct VideoWorkflow<'a> {
    state: &'a AppState,
}

impl<'a> VideoWorkflow<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// One page of published videos, joined with their owners.
    #[tracing::instrument(skip(self, params))]
    pub async fn list(&self, params: &VideoListParams) -> Result<Vec<VideoWithOwner>, AppError> {
        let query = VideoListQuery::from_params(params)?;
        tracing::debug!(
            page = query.page,
            limit = query.limit,
            sort = %query.sort_field,
            owner_id = ?query.owner_id,
            "Listing videos"
        );
        self.state.videos.list(&query).await
    }

    /// Upload both assets, then persist the video owned by `owner_id`.
    #[tracing::instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn publish(&self, owner_id: Uuid, input: PublishVideoInput) -> Result<Video, AppError> {
        let title = require_non_blank("title", input.title.as_deref())?;
        let description = require_non_blank("description", input.description.as_deref())?;
        let video_file = input
            .video_file
            .ok_or_else(|| AppError::InvalidInput("videoFile is required".to_string()))?;
        let thumbnail = input
            .thumbnail
            .ok_or_else(|| AppError::InvalidInput("thumbnail is required".to_string()))?;

        let video_asset = upload_asset(self.state, video_file, AssetKind::Video).await?;
        let thumbnail_asset = upload_asset(self.state, thumbnail, AssetKind::Image).await?;

        let duration = video_asset.duration.unwrap_or_else(|| {
            tracing::warn!(key = %video_asset.key, "Media store reported no duration; storing 0");
            0.0
        });

        let created = self
            .state
            .videos
            .create(NewVideo {
                video_file: video_asset.url,
                thumbnail: thumbnail_asset.url,
                title,
                description,
                duration,
                owner_id,
            })
            .await?;

        let video = self
            .state
            .videos
            .find_by_id(created.id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Video {} missing right after creation", created.id))
            })?;

        tracing::info!(video_id = %video.id, duration = video.duration, "Video published");
        Ok(video)
    }

    /// Fetch a video and record the view. Unpublished videos are only visible to their owner.
    #[tracing::instrument(skip(self), fields(viewer_id = %viewer_id))]
    pub async fn get(&self, viewer_id: Uuid, raw_id: &str) -> Result<VideoWithOwner, AppError> {
        let video_id = parse_id("videoId", raw_id)?;
        let video = self.find_visible(viewer_id, video_id).await?;

        self.state.videos.increment_views(video.id).await?;

        // Deleted since the lookup above: leave the history untouched
        let viewed = self
            .state
            .videos
            .find_with_owner_by_ids(&[video.id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        self.state.users.record_watch(viewer_id, video.id).await?;
        Ok(viewed)
    }

    /// Replace title, description and thumbnail. Owner only.
    #[tracing::instrument(skip(self, input), fields(caller_id = %caller_id))]
    pub async fn update(
        &self,
        caller_id: Uuid,
        raw_id: &str,
        input: UpdateVideoInput,
    ) -> Result<Video, AppError> {
        let video_id = parse_id("videoId", raw_id)?;
        let thumbnail = input
            .thumbnail
            .ok_or_else(|| AppError::InvalidInput("thumbnail is required".to_string()))?;
        let title = require_non_blank("title", input.title.as_deref())?;
        let description = require_non_blank("description", input.description.as_deref())?;

        let existing = self.find_owned(caller_id, video_id).await?;

        let thumbnail_asset = upload_asset(self.state, thumbnail, AssetKind::Image).await?;

        let updated = self
            .state
            .videos
            .update_details(
                video_id,
                VideoDetailsUpdate {
                    title,
                    description,
                    thumbnail: thumbnail_asset.url,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        if existing.thumbnail != updated.thumbnail {
            self.state
                .cleanup
                .schedule(existing.thumbnail, "replaced_thumbnail");
        }

        tracing::info!(video_id = %updated.id, "Video details updated");
        Ok(updated)
    }

    /// Delete the record, then schedule both of its assets for deletion. Owner only.
    #[tracing::instrument(skip(self), fields(caller_id = %caller_id))]
    pub async fn delete(&self, caller_id: Uuid, raw_id: &str) -> Result<Video, AppError> {
        let video_id = parse_id("videoId", raw_id)?;
        self.find_owned(caller_id, video_id).await?;

        let deleted = self
            .state
            .videos
            .delete(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        self.state
            .cleanup
            .schedule(deleted.video_file.clone(), "deleted_video_file");
        self.state
            .cleanup
            .schedule(deleted.thumbnail.clone(), "deleted_video_thumbnail");

        tracing::info!(video_id = %deleted.id, "Video deleted");
        Ok(deleted)
    }

    /// Flip `isPublished`. Owner only.
    #[tracing::instrument(skip(self), fields(caller_id = %caller_id))]
    pub async fn toggle_publish(&self, caller_id: Uuid, raw_id: &str) -> Result<Video, AppError> {
        let video_id = parse_id("videoId", raw_id)?;
        self.find_owned(caller_id, video_id).await?;

        let video = self
            .state
            .videos
            .toggle_publish(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        tracing::info!(video_id = %video.id, is_published = video.is_published, "Publish status toggled");
        Ok(video)
    }

    async fn find_owned(&self, caller_id: Uuid, video_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .state
            .videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        if !video.is_owned_by(caller_id) {
            tracing::warn!(video_id = %video_id, "Rejected mutation by non-owner");
            return Err(AppError::Forbidden(
                "Only the owner can modify this video".to_string(),
            ));
        }
        Ok(video)
    }

    async fn find_visible(&self, viewer_id: Uuid, video_id: Uuid) -> Result<Video, AppError> {
        match self.state.videos.find_by_id(video_id).await? {
            Some(video) if video.is_published || video.is_owned_by(viewer_id) => Ok(video),
            _ => Err(AppError::NotFound("Video not found".to_string())),
        }
    }
}
