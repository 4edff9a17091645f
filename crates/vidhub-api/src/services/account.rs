//! User accounts: registration, sessions (login, logout, refresh-token rotation),
//! profile updates and watch history.

use crate::auth::password::{hash_password, verify_password};
use crate::services::media::upload_asset;
use crate::state::AppState;
use crate::utils::upload::TempUpload;
use uuid::Uuid;
use validator::Validate;
use vidhub_core::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, NewUser, TokenPair,
    UpdateAccountRequest, User, UserResponse, VideoWithOwner,
};
use vidhub_core::validation::{require_email, require_non_blank};
use vidhub_core::AppError;
use vidhub_storage::AssetKind;

/// Fields received on registration.
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<TempUpload>,
    pub cover_image: Option<TempUpload>,
}

/// Which profile image an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Avatar,
    CoverImage,
}

impl ProfileImage {
    fn field(&self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::CoverImage => "coverImage",
        }
    }
}

pub struct AccountService<'a> {
    state: &'a AppState,
}

impl<'a> AccountService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserResponse, AppError> {
        let full_name = require_non_blank("fullName", input.full_name.as_deref())?;
        let username = require_non_blank("username", input.username.as_deref())?.to_lowercase();
        let email = require_email("email", input.email.as_deref())?;
        let password = require_non_blank("password", input.password.as_deref())?;

        if self
            .state
            .users
            .username_or_email_taken(&username, &email)
            .await?
        {
            return Err(AppError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let avatar_file = input
            .avatar
            .ok_or_else(|| AppError::InvalidInput("avatar is required".to_string()))?;

        let avatar = upload_asset(self.state, avatar_file, AssetKind::Image).await?;
        let cover_image = match input.cover_image {
            Some(file) => Some(upload_asset(self.state, file, AssetKind::Image).await?.url),
            None => None,
        };

        let user = self
            .state
            .users
            .create(NewUser {
                full_name,
                username,
                email,
                avatar: avatar.url,
                cover_image,
                password_hash: hash_password(&password)?,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(UserResponse::from(user))
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let username = non_empty(request.username.as_deref());
        let email = non_empty(request.email.as_deref());
        if username.is_none() && email.is_none() {
            return Err(AppError::InvalidInput(
                "username or email is required".to_string(),
            ));
        }

        let user = self
            .state
            .users
            .find_by_login(username, email)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(AppError::Unauthorized(
                "Invalid user credentials".to_string(),
            ));
        }

        let tokens = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: UserResponse::from(user),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.state.users.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Exchange a refresh token for a new pair. The presented token must be the one
    /// currently stored for the user; the stored token is replaced.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, AppError> {
        let presented = non_empty(refresh_token)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized request".to_string()))?;

        let claims = self.state.tokens.verify_refresh(presented)?;
        let user = self
            .state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

        let tokens = self.state.tokens.issue_pair(&user)?;
        let rotated = user.refresh_token.as_deref() == Some(presented)
            && self
                .state
                .users
                .rotate_refresh_token(user.id, presented, &tokens.refresh_token)
                .await?;

        if !rotated {
            tracing::warn!(user_id = %user.id, "Refresh token is expired or already used");
            return Err(AppError::Unauthorized(
                "Refresh token is expired or used".to_string(),
            ));
        }

        Ok(tokens)
    }

    #[tracing::instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn change_password(
        &self,
        user: &User,
        request: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        if !verify_password(&request.old_password, &user.password_hash)? {
            return Err(AppError::InvalidInput("Invalid old password".to_string()));
        }

        let hash = hash_password(&request.new_password)?;
        self.state.users.update_password(user.id, &hash).await?;
        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn update_account(
        &self,
        user_id: Uuid,
        request: UpdateAccountRequest,
    ) -> Result<UserResponse, AppError> {
        let full_name = require_non_blank("fullName", Some(request.full_name.as_str()))?;
        let email = require_email("email", Some(request.email.as_str()))?;

        let user = self
            .state
            .users
            .update_account(user_id, &full_name, &email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(UserResponse::from(user))
    }

    /// Upload a new avatar or cover image, write it, then retire the previous asset.
    #[tracing::instrument(skip(self, user, file), fields(user_id = %user.id))]
    pub async fn replace_image(
        &self,
        user: &User,
        which: ProfileImage,
        file: Option<TempUpload>,
    ) -> Result<UserResponse, AppError> {
        let file = file.ok_or_else(|| {
            AppError::InvalidInput(format!("{} file is required", which.field()))
        })?;

        let asset = upload_asset(self.state, file, AssetKind::Image).await?;

        let (updated, previous) = match which {
            ProfileImage::Avatar => (
                self.state.users.update_avatar(user.id, &asset.url).await?,
                Some(user.avatar.clone()),
            ),
            ProfileImage::CoverImage => (
                self.state
                    .users
                    .update_cover_image(user.id, &asset.url)
                    .await?,
                user.cover_image.clone(),
            ),
        };
        let updated = updated.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(previous) = previous.filter(|p| !p.is_empty() && *p != asset.url) {
            let reason = match which {
                ProfileImage::Avatar => "replaced_avatar",
                ProfileImage::CoverImage => "replaced_cover_image",
            };
            self.state.cleanup.schedule(previous, reason);
        }

        Ok(UserResponse::from(updated))
    }

    /// Videos in the caller's watch history, oldest first. Videos that have since been
    /// unpublished by someone else are left out.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn watch_history(&self, user: &User) -> Result<Vec<VideoWithOwner>, AppError> {
        let videos = self
            .state
            .videos
            .find_with_owner_by_ids(&user.watch_history)
            .await?;

        Ok(videos
            .into_iter()
            .filter(|v| v.video.is_published || v.video.is_owned_by(user.id))
            .collect())
    }

    async fn start_session(&self, user: &User) -> Result<TokenPair, AppError> {
        let tokens = self.state.tokens.issue_pair(user)?;
        self.state
            .users
            .set_refresh_token(user.id, Some(&tokens.refresh_token))
            .await?;
        Ok(tokens)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
