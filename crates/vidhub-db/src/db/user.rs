use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidhub_core::models::{NewUser, User};
use vidhub_core::AppError;

use crate::repository::UserRepository;

const USER_COLUMNS: &str = "id, full_name, username, email, avatar, cover_image, password_hash, \
                            refresh_token, watch_history, created_at, updated_at";

/// Repository for user accounts
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[tracing::instrument(skip(self, new_user), fields(db.table = "users", db.operation = "insert"))]
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (full_name, username, email, avatar, cover_image, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.full_name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.avatar)
        .bind(&new_user.cover_image)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }

        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::TEXT IS NULL OR username = $1)
              AND ($2::TEXT IS NULL OR email = $2)
            LIMIT 1
            "#
        ))
        .bind(username.map(str::to_lowercase))
        .bind(email.map(str::to_lowercase))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username.to_lowercase())
        .bind(email.to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, current, next), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
            "#,
        )
        .bind(id)
        .bind(current)
        .bind(next)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn update_account(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            UPDATE users SET full_name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(full_name)
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn update_avatar(&self, id: Uuid, avatar: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn update_cover_image(
        &self,
        id: Uuid,
        cover_image: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "UPDATE users SET cover_image = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(cover_image)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    async fn record_watch(&self, id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET watch_history = array_append(array_remove(watch_history, $2), $2)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
