//! Repository wrappers that inject failures or interleaved writes into the
//! in-memory repositories.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;
use vidhub_core::models::{
    NewUser, NewVideo, User, Video, VideoDetailsUpdate, VideoListQuery, VideoWithOwner,
};
use vidhub_core::AppError;
use vidhub_db::test_helpers::InMemoryDatabase;
use vidhub_db::{UserRepository, VideoRepository};

/// Users repository where another session can rotate the refresh token right after
/// a caller has read the user, as a concurrent `/refresh-token` call would.
pub struct InterleavedUsers {
    inner: InMemoryDatabase,
    rotate_after_read: Mutex<Option<String>>,
}

impl InterleavedUsers {
    pub fn new(inner: InMemoryDatabase) -> Self {
        Self {
            inner,
            rotate_after_read: Mutex::new(None),
        }
    }

    /// The next `find_by_id` stores `token` after reading, returning the stale user.
    pub fn rotate_after_next_read(&self, token: &str) {
        *self.rotate_after_read.lock().unwrap() = Some(token.to_string());
    }
}

#[async_trait]
impl UserRepository for InterleavedUsers {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        UserRepository::create(&self.inner, new_user).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = UserRepository::find_by_id(&self.inner, id).await?;
        let pending = self.rotate_after_read.lock().unwrap().take();
        if let Some(token) = pending {
            self.inner.set_refresh_token(id, Some(&token)).await?;
        }
        Ok(user)
    }

    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        self.inner.find_by_login(username, email).await
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        self.inner.username_or_email_taken(username, email).await
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.inner.set_refresh_token(id, token).await
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError> {
        self.inner.rotate_refresh_token(id, current, next).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        self.inner.update_password(id, password_hash).await
    }

    async fn update_account(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        self.inner.update_account(id, full_name, email).await
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, AppError> {
        self.inner.update_avatar(id, avatar).await
    }

    async fn update_cover_image(
        &self,
        id: Uuid,
        cover_image: &str,
    ) -> Result<Option<User>, AppError> {
        self.inner.update_cover_image(id, cover_image).await
    }

    async fn record_watch(&self, id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        self.inner.record_watch(id, video_id).await
    }
}

/// Videos repository with switchable faults.
pub struct FaultyVideos {
    inner: InMemoryDatabase,
    fail_updates: AtomicBool,
    delete_on_view: AtomicBool,
}

impl FaultyVideos {
    pub fn new(inner: InMemoryDatabase) -> Self {
        Self {
            inner,
            fail_updates: AtomicBool::new(false),
            delete_on_view: AtomicBool::new(false),
        }
    }

    /// Make `update_details` fail as a lost database connection would.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Delete the video while its view is being recorded.
    pub fn delete_on_view(&self, delete: bool) {
        self.delete_on_view.store(delete, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for FaultyVideos {
    async fn create(&self, new_video: NewVideo) -> Result<Video, AppError> {
        VideoRepository::create(&self.inner, new_video).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        VideoRepository::find_by_id(&self.inner, id).await
    }

    async fn find_with_owner_by_ids(&self, ids: &[Uuid]) -> Result<Vec<VideoWithOwner>, AppError> {
        self.inner.find_with_owner_by_ids(ids).await
    }

    async fn list(&self, query: &VideoListQuery) -> Result<Vec<VideoWithOwner>, AppError> {
        self.inner.list(query).await
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: VideoDetailsUpdate,
    ) -> Result<Option<Video>, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.update_details(id, update).await
    }

    async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.inner.toggle_publish(id).await
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = self.inner.increment_views(id).await?;
        if self.delete_on_view.load(Ordering::SeqCst) {
            VideoRepository::delete(&self.inner, id).await?;
        }
        Ok(video)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        VideoRepository::delete(&self.inner, id).await
    }
}
