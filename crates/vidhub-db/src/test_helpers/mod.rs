//! In-memory repository implementations for testing
//!
//! These mirror the PostgreSQL repositories closely enough to drive the HTTP layer
//! without a database: unique username/email, owner join, listing filter/sort/page.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vidhub_core::models::{
    NewUser, NewVideo, OwnerDetails, SortDirection, SortField, User, Video, VideoDetailsUpdate,
    VideoListQuery, VideoWithOwner,
};
use vidhub_core::AppError;

use crate::repository::{UserRepository, VideoRepository};

/// Shared in-memory tables. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    /// Number of writes issued against `videos`
    video_writes: Arc<Mutex<usize>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn insert_video(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn remove_user(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn video(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn video_count(&self) -> usize {
        self.videos.lock().unwrap().len()
    }

    pub fn video_writes(&self) -> usize {
        *self.video_writes.lock().unwrap()
    }

    fn bump_writes(&self) {
        *self.video_writes.lock().unwrap() += 1;
    }

    fn owner_details(&self, owner_id: Uuid) -> Option<OwnerDetails> {
        self.users
            .lock()
            .unwrap()
            .get(&owner_id)
            .map(|u| OwnerDetails {
                username: u.username.clone(),
                full_name: u.full_name.clone(),
                avatar: u.avatar.clone(),
            })
    }

    fn with_owner(&self, video: Video) -> VideoWithOwner {
        let owner_details = self.owner_details(video.owner_id);
        VideoWithOwner {
            video,
            owner_details,
        }
    }

    fn update_user<F>(&self, id: Uuid, apply: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id)?;
        apply(user);
        user.updated_at = Utc::now();
        Some(user.clone())
    }

    fn update_video<F>(&self, id: Uuid, apply: F) -> Option<Video>
    where
        F: FnOnce(&mut Video),
    {
        let mut videos = self.videos.lock().unwrap();
        let video = videos.get_mut(&id)?;
        apply(video);
        let updated = video.clone();
        drop(videos);
        self.bump_writes();
        Some(updated)
    }
}

fn compare_by(field: SortField, a: &Video, b: &Video) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Views => a.views.cmp(&b.views),
        SortField::Duration => a.duration.total_cmp(&b.duration),
        SortField::Title => a.title.cmp(&b.title),
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let username = new_user.username.to_lowercase();
        let email = new_user.email.to_lowercase();
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict(
                "Duplicate value violates users_username_key".to_string(),
            ));
        }
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(
                "Duplicate value violates users_email_key".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            username,
            email,
            avatar: new_user.avatar,
            cover_image: new_user.cover_image,
            password_hash: new_user.password_hash,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.user(id))
    }

    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }
        let username = username.map(str::to_lowercase);
        let email = email.map(str::to_lowercase);
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| {
                username.as_deref().map_or(true, |n| u.username == n)
                    && email.as_deref().map_or(true, |e| u.email == e)
            })
            .cloned())
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let username = username.to_lowercase();
        let email = email.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        self.update_user(id, |u| u.refresh_token = token.map(str::to_string));
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(next.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        self.update_user(id, |u| u.password_hash = password_hash.to_string());
        Ok(())
    }

    async fn update_account(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let email = email.to_lowercase();
        let taken = self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.id != id && u.email == email);
        if taken {
            return Err(AppError::Conflict(
                "Duplicate value violates users_email_key".to_string(),
            ));
        }
        Ok(self.update_user(id, |u| {
            u.full_name = full_name.to_string();
            u.email = email;
        }))
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, AppError> {
        Ok(self.update_user(id, |u| u.avatar = avatar.to_string()))
    }

    async fn update_cover_image(
        &self,
        id: Uuid,
        cover_image: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self.update_user(id, |u| u.cover_image = Some(cover_image.to_string())))
    }

    async fn record_watch(&self, id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.watch_history.retain(|v| *v != video_id);
            user.watch_history.push(video_id);
        }
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for InMemoryDatabase {
    async fn create(&self, new_video: NewVideo) -> Result<Video, AppError> {
        if new_video.video_file.is_empty() || new_video.thumbnail.is_empty() {
            return Err(AppError::InvalidInput(
                "videoFile and thumbnail must be non-empty".to_string(),
            ));
        }
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            video_file: new_video.video_file,
            thumbnail: new_video.thumbnail,
            title: new_video.title,
            description: new_video.description,
            duration: new_video.duration,
            views: 0,
            is_published: true,
            owner_id: new_video.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().insert(video.id, video.clone());
        self.bump_writes();
        Ok(video)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.video(id))
    }

    async fn find_with_owner_by_ids(&self, ids: &[Uuid]) -> Result<Vec<VideoWithOwner>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.video(*id))
            .map(|v| self.with_owner(v))
            .collect())
    }

    async fn list(&self, query: &VideoListQuery) -> Result<Vec<VideoWithOwner>, AppError> {
        let offset = usize::try_from(query.offset()?).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let needle = query.search.to_lowercase();

        let mut matching: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.is_published)
            .filter(|v| v.title.to_lowercase().contains(&needle))
            .filter(|v| query.owner_id.map_or(true, |owner| v.owner_id == owner))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ord = compare_by(query.sort_field, a, b).then_with(|| a.id.cmp(&b.id));
            match query.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|v| self.with_owner(v))
            .collect())
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: VideoDetailsUpdate,
    ) -> Result<Option<Video>, AppError> {
        Ok(self.update_video(id, |v| {
            v.title = update.title;
            v.description = update.description;
            v.thumbnail = update.thumbnail;
            v.updated_at = Utc::now();
        }))
    }

    async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.update_video(id, |v| {
            v.is_published = !v.is_published;
            v.updated_at = Utc::now();
        }))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.update_video(id, |v| v.views += 1))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let removed = self.videos.lock().unwrap().remove(&id);
        if removed.is_some() {
            self.bump_writes();
            for user in self.users.lock().unwrap().values_mut() {
                user.watch_history.retain(|v| *v != id);
            }
        }
        Ok(removed)
    }
}
