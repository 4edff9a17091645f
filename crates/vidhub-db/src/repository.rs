//! Repository trait abstractions
//!
//! Workflows depend on these traits rather than on PostgreSQL, so they can run
//! against the in-memory implementations in tests.

use async_trait::async_trait;
use uuid::Uuid;
use vidhub_core::models::{
    NewUser, NewVideo, User, Video, VideoDetailsUpdate, VideoListQuery, VideoWithOwner,
};
use vidhub_core::AppError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Duplicate username or email is a `Conflict`.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Match on username or email, whichever is supplied (both must match when both are).
    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// True when another user already holds the username or the email.
    async fn username_or_email_taken(&self, username: &str, email: &str)
        -> Result<bool, AppError>;

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError>;

    /// Replace the stored refresh token only while it still equals `current`.
    /// Returns `false` when it was already rotated or cleared.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    async fn update_account(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError>;

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, AppError>;

    async fn update_cover_image(
        &self,
        id: Uuid,
        cover_image: &str,
    ) -> Result<Option<User>, AppError>;

    /// Move `video_id` to the end of the user's watch history.
    async fn record_watch(&self, id: Uuid, video_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, new_video: NewVideo) -> Result<Video, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Videos with owner details, in the order of `ids`. Unknown ids are skipped.
    async fn find_with_owner_by_ids(&self, ids: &[Uuid]) -> Result<Vec<VideoWithOwner>, AppError>;

    /// One page of published videos matching the query, joined with owner details.
    async fn list(&self, query: &VideoListQuery) -> Result<Vec<VideoWithOwner>, AppError>;

    /// Replace title, description and thumbnail in a single write.
    async fn update_details(
        &self,
        id: Uuid,
        update: VideoDetailsUpdate,
    ) -> Result<Option<Video>, AppError>;

    /// Flip `is_published` in a single write.
    async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Delete the record, returning it as it was.
    async fn delete(&self, id: Uuid) -> Result<Option<Video>, AppError>;
}
