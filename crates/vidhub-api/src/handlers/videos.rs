use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::services::{PublishVideoInput, UpdateVideoInput, VideoWorkflow};
use crate::state::AppState;
use crate::utils::upload::{read_upload_form, UploadLimits};
use axum::extract::{Multipart, Path, Query, State};
use std::sync::Arc;
use vidhub_core::models::{Video, VideoListParams, VideoWithOwner};
use vidhub_storage::AssetKind;

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "videos",
    params(VideoListParams),
    responses(
        (status = 200, description = "One page of published videos", body = ApiResponse<Vec<VideoWithOwner>>),
        (status = 400, description = "Invalid page, limit, query, sortBy or userId", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(params): Query<VideoListParams>,
) -> Result<ApiResponse<Vec<VideoWithOwner>>, HttpAppError> {
    let videos = VideoWorkflow::new(&state).list(&params).await?;
    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: title, description, videoFile (file), thumbnail (file)"),
    responses(
        (status = 200, description = "Video published", body = ApiResponse<Video>),
        (status = 400, description = "Missing field or file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Media store or database failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<Video>, HttpAppError> {
    let limits = UploadLimits::from(&state.config);
    let mut form = read_upload_form(
        multipart,
        &limits,
        &[("videoFile", AssetKind::Video), ("thumbnail", AssetKind::Image)],
    )
    .await?;

    let input = PublishVideoInput {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        video_file: form.take_file("videoFile"),
        thumbnail: form.take_file("thumbnail"),
    };

    let video = VideoWorkflow::new(&state).publish(auth.id(), input).await?;
    Ok(ApiResponse::ok(video, "Video published successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video identifier")),
    responses(
        (status = 200, description = "Video found", body = ApiResponse<VideoWithOwner>),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<VideoWithOwner>, HttpAppError> {
    let video = VideoWorkflow::new(&state).get(auth.id(), &video_id).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video identifier")),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: title, description, thumbnail (file)"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<Video>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Media store or database failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<Video>, HttpAppError> {
    let limits = UploadLimits::from(&state.config);
    let mut form =
        read_upload_form(multipart, &limits, &[("thumbnail", AssetKind::Image)]).await?;

    let input = UpdateVideoInput {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        thumbnail: form.take_file("thumbnail"),
    };

    let video = VideoWorkflow::new(&state)
        .update(auth.id(), &video_id, input)
        .await?;
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video identifier")),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<Video>),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Video>, HttpAppError> {
    let video = VideoWorkflow::new(&state).delete(auth.id(), &video_id).await?;
    Ok(ApiResponse::ok(video, "Video deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{videoId}/toggle-publish",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video identifier")),
    responses(
        (status = 200, description = "Publish status flipped", body = ApiResponse<Video>),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_publish_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Video>, HttpAppError> {
    let video = VideoWorkflow::new(&state)
        .toggle_publish(auth.id(), &video_id)
        .await?;
    Ok(ApiResponse::ok(video, "Publish status toggled successfully"))
}
