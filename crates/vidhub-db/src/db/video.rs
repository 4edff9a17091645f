use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;
use vidhub_core::models::{NewVideo, Video, VideoDetailsUpdate, VideoListQuery, VideoWithOwner};
use vidhub_core::AppError;

use super::listing::{build_list_query, VideoOwnerRow, VIDEO_WITH_OWNER_COLUMNS};
use crate::repository::VideoRepository;

const VIDEO_COLUMNS: &str = "id, video_file, thumbnail, title, description, duration, views, \
                             is_published, owner_id, created_at, updated_at";

/// Repository for videos
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, new_video), fields(db.table = "videos", db.operation = "insert", owner_id = %new_video.owner_id))]
    async fn create(&self, new_video: NewVideo) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (video_file, thumbnail, title, description, duration, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(&new_video.video_file)
        .bind(&new_video.thumbnail)
        .bind(&new_video.title)
        .bind(&new_video.description)
        .bind(new_video.duration)
        .bind(new_video.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "videos", db.operation = "select", count = ids.len()))]
    async fn find_with_owner_by_ids(&self, ids: &[Uuid]) -> Result<Vec<VideoWithOwner>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<Postgres, VideoOwnerRow>(&format!(
            "SELECT {VIDEO_WITH_OWNER_COLUMNS} FROM videos v \
             LEFT JOIN users u ON u.id = v.owner_id WHERE v.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<Uuid, VideoWithOwner> = rows
            .into_iter()
            .map(|row| (row.video.id, VideoWithOwner::from(row)))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list(&self, query: &VideoListQuery) -> Result<Vec<VideoWithOwner>, AppError> {
        let offset = query.offset()?;
        let mut qb = build_list_query(query, offset);

        let rows = qb
            .build_query_as::<VideoOwnerRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(VideoWithOwner::from).collect())
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn update_details(
        &self,
        id: Uuid,
        update: VideoDetailsUpdate,
    ) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.thumbnail)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn toggle_publish(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos SET is_published = NOT is_published, updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "DELETE FROM videos WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if video.is_some() {
            // Drop dangling references from every watch history
            sqlx::query(
                "UPDATE users SET watch_history = array_remove(watch_history, $1) WHERE $1 = ANY(watch_history)",
            )
            .bind(id)
            .execute(&self.pool)
            .await?;
        }

        Ok(video)
    }
}
