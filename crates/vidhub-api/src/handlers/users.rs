use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{ApiResponse, Empty};
use crate::services::{AccountService, ProfileImage, RegisterInput};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, UploadLimits};
use axum::extract::{Multipart, State};
use std::sync::Arc;
use vidhub_core::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, TokenPair,
    UpdateAccountRequest, UserResponse, VideoWithOwner,
};
use vidhub_storage::AssetKind;

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "users",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: fullName, username, email, password, avatar (file), coverImage (optional file)"),
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
        (status = 500, description = "Media store or database failure", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let limits = UploadLimits::from(&state.config);
    let mut form = read_upload_form(
        multipart,
        &limits,
        &[("avatar", AssetKind::Image), ("coverImage", AssetKind::Image)],
    )
    .await?;

    let input = RegisterInput {
        full_name: form.text("fullName").map(str::to_string),
        username: form.text("username").map(str::to_string),
        email: form.text("email").map(str::to_string),
        password: form.text("password").map(str::to_string),
        avatar: form.take_file("avatar"),
        cover_image: form.take_file("coverImage"),
    };

    let user = AccountService::new(&state).register(input).await?;
    Ok(ApiResponse::created(user, "User registered successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Missing username/email or password", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, HttpAppError> {
    let response = AccountService::new(&state).login(request).await?;
    Ok(ApiResponse::ok(response, "User logged in successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<Empty>),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<ApiResponse<Empty>, HttpAppError> {
    AccountService::new(&state).logout(auth.id()).await?;
    Ok(ApiResponse::ok(Empty {}, "User logged out"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    tag = "users",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid, expired or already used refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> Result<ApiResponse<TokenPair>, HttpAppError> {
    let tokens = AccountService::new(&state)
        .refresh(request.refresh_token.as_deref())
        .await?;
    Ok(ApiResponse::ok(tokens, "Access token refreshed"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 400, description = "Wrong old password or weak new password", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<ApiResponse<Empty>, HttpAppError> {
    AccountService::new(&state)
        .change_password(&auth.user, request)
        .await?;
    Ok(ApiResponse::ok(Empty {}, "Password changed successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    tag = "users",
    responses(
        (status = 200, description = "The caller", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn current_user(auth: AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(UserResponse::from(auth.user), "Current user fetched successfully")
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    tag = "users",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 409, description = "Email taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateAccountRequest>,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let user = AccountService::new(&state)
        .update_account(auth.id(), request)
        .await?;
    Ok(ApiResponse::ok(user, "Account details updated successfully"))
}

async fn replace_profile_image(
    state: &AppState,
    auth: &AuthUser,
    which: ProfileImage,
    field: &str,
    multipart: Multipart,
) -> Result<UserResponse, HttpAppError> {
    let limits = UploadLimits::from(&state.config);
    let mut form = read_upload_form(multipart, &limits, &[(field, AssetKind::Image)]).await?;

    let user = AccountService::new(state)
        .replace_image(&auth.user, which, form.take_file(field))
        .await?;
    Ok(user)
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/avatar",
    tag = "users",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field: avatar (file)"),
    responses(
        (status = 200, description = "Avatar replaced", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or invalid file", body = ErrorResponse),
        (status = 500, description = "Media store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let user =
        replace_profile_image(&state, &auth, ProfileImage::Avatar, "avatar", multipart).await?;
    Ok(ApiResponse::ok(user, "Avatar updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/cover-image",
    tag = "users",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field: coverImage (file)"),
    responses(
        (status = 200, description = "Cover image replaced", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or invalid file", body = ErrorResponse),
        (status = 500, description = "Media store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<UserResponse>, HttpAppError> {
    let user = replace_profile_image(
        &state,
        &auth,
        ProfileImage::CoverImage,
        "coverImage",
        multipart,
    )
    .await?;
    Ok(ApiResponse::ok(user, "Cover image updated successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/history",
    tag = "users",
    responses(
        (status = 200, description = "Watch history", body = ApiResponse<Vec<VideoWithOwner>>),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn watch_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<VideoWithOwner>>, HttpAppError> {
    let videos = AccountService::new(&state).watch_history(&auth.user).await?;
    Ok(ApiResponse::ok(videos, "Watch history fetched successfully"))
}
