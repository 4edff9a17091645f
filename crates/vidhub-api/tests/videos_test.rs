//! Video API integration tests.
//!
//! Run with: `cargo test -p vidhub-api --test videos_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::faults::FaultyVideos;
use helpers::fixtures;
use helpers::storage::VIDEO_DURATION;
use helpers::{api_path, bearer, setup_test_app, setup_test_app_with, TestApp};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use vidhub_db::test_helpers::InMemoryDatabase;

fn titles(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|v| v["title"].as_str().expect("title").to_string())
        .collect()
}

async fn setup_faulty_app() -> (TestApp, Arc<FaultyVideos>) {
    let db = InMemoryDatabase::new();
    let videos = Arc::new(FaultyVideos::new(db.clone()));
    let app = setup_test_app_with(db.clone(), Arc::new(db), videos.clone()).await;
    (app, videos)
}

fn publish_form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title)
        .add_text("description", "A short clip")
        .add_part("videoFile", fixtures::video_part())
        .add_part("thumbnail", fixtures::image_part("thumb.png"))
}

#[tokio::test]
async fn test_list_returns_requested_page_in_ascending_view_order() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");

    for views in 1..=12 {
        app.db
            .insert_video(fixtures::video(owner.id, &format!("Cat clip {}", views), views));
    }
    app.db.insert_video(fixtures::video(owner.id, "Dog clip", 7));
    let mut hidden = fixtures::video(owner.id, "Cat secret", 8);
    hidden.is_published = false;
    app.db.insert_video(hidden);

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_query_param("query", "cat")
        .add_query_param("page", "2")
        .add_query_param("limit", "5")
        .add_query_param("sortBy", "views")
        .add_query_param("sortType", "asc")
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        titles(&body),
        (6..=10).map(|v| format!("Cat clip {}", v)).collect::<Vec<_>>()
    );

    let views: Vec<i64> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|v| v["views"].as_i64().expect("views"))
        .collect();
    assert_eq!(views, vec![6, 7, 8, 9, 10]);

    let first = &body["data"][0];
    assert_eq!(first["owner"], owner.id.to_string());
    assert_eq!(first["ownerDetails"]["username"], "alice");
}

#[tokio::test]
async fn test_list_descending_and_filtered_by_owner() {
    let app = setup_test_app().await;
    let (alice, token) = app.create_user("alice");
    let (bob, _) = app.create_user("bob");

    app.db.insert_video(fixtures::video(alice.id, "Cat one", 1));
    app.db.insert_video(fixtures::video(alice.id, "Cat two", 2));
    app.db.insert_video(fixtures::video(bob.id, "Cat three", 3));

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_query_param("query", "CAT")
        .add_query_param("sortBy", "views")
        .add_query_param("sortType", "desc")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        titles(&response.json()),
        vec!["Cat three", "Cat two", "Cat one"]
    );

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_query_param("query", "cat")
        .add_query_param("sortBy", "views")
        .add_query_param("userId", alice.id.to_string())
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(titles(&response.json()), vec!["Cat one", "Cat two"]);
}

#[tokio::test]
async fn test_list_rejects_invalid_parameters() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");

    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![("page", "1")],
        vec![("query", "   ")],
        vec![("query", "cat"), ("page", "0")],
        vec![("query", "cat"), ("limit", "abc")],
        vec![("query", "cat"), ("limit", "-3")],
        vec![("query", "cat"), ("sortBy", "password")],
        vec![("query", "cat"), ("userId", "not-a-uuid")],
        vec![
            ("query", "cat"),
            ("page", "9223372036854775807"),
            ("limit", "100"),
        ],
    ];

    for params in cases {
        let mut request = app
            .client()
            .get(&api_path("/videos"))
            .add_header("Authorization", bearer(&token));
        for (key, value) in &params {
            request = request.add_query_param(key, value);
        }
        let response = request.await;

        assert_eq!(response.status_code(), 400, "params: {:?}", params);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_video_routes_require_access_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_query_param("query", "cat")
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_query_param("query", "cat")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_publish_video_stores_assets_duration_and_owner() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", bearer(&token))
        .multipart(publish_form("My first video"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let data = &body["data"];
    assert_eq!(data["title"], "My first video");
    assert_eq!(data["description"], "A short clip");
    assert_eq!(data["duration"], VIDEO_DURATION);
    assert_eq!(data["views"], 0);
    assert_eq!(data["isPublished"], true);
    assert_eq!(data["owner"], owner.id.to_string());

    let uploaded = app.media.uploaded_urls();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(data["videoFile"], uploaded[0].as_str());
    assert_eq!(data["thumbnail"], uploaded[1].as_str());
    assert!(uploaded[0].ends_with(".mp4"));
    assert!(uploaded[1].ends_with(".png"));
    assert_eq!(app.db.video_count(), 1);
}

#[tokio::test]
async fn test_publish_video_missing_title_is_rejected_before_upload() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");

    let form = MultipartForm::new()
        .add_text("title", "  ")
        .add_text("description", "desc")
        .add_part("videoFile", fixtures::video_part())
        .add_part("thumbnail", fixtures::image_part("thumb.png"));

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.media.upload_count(), 0);
    assert_eq!(app.db.video_count(), 0);
}

#[tokio::test]
async fn test_publish_video_missing_file_is_rejected() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");

    let form = MultipartForm::new()
        .add_text("title", "Title")
        .add_text("description", "desc")
        .add_part("thumbnail", fixtures::image_part("thumb.png"));

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "videoFile is required");
    assert_eq!(app.db.video_count(), 0);
}

#[tokio::test]
async fn test_publish_video_with_disallowed_extension_is_rejected() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");

    let form = MultipartForm::new()
        .add_text("title", "Title")
        .add_text("description", "desc")
        .add_part("videoFile", fixtures::image_part("clip.exe"))
        .add_part("thumbnail", fixtures::image_part("thumb.png"));

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.media.upload_count(), 0);
}

#[tokio::test]
async fn test_publish_video_upload_failure_is_server_error() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");
    app.media.fail_uploads(true);

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", bearer(&token))
        .multipart(publish_form("Doomed"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(app.db.video_count(), 0);
}

#[tokio::test]
async fn test_get_video_records_view_and_history() {
    let app = setup_test_app().await;
    let (owner, _) = app.create_user("alice");
    let (viewer, token) = app.create_user("bob");
    let video = fixtures::video(owner.id, "Cat clip", 3);
    app.db.insert_video(video.clone());

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["id"], video.id.to_string());
    assert_eq!(body["data"]["views"], 4);
    assert_eq!(body["data"]["ownerDetails"]["username"], "alice");

    let viewer = app.db.user(viewer.id).expect("viewer");
    assert_eq!(viewer.watch_history, vec![video.id]);
}

#[tokio::test]
async fn test_get_video_deleted_mid_view_leaves_history_untouched() {
    let (app, videos) = setup_faulty_app().await;
    let (owner, _) = app.create_user("alice");
    let (viewer, token) = app.create_user("bob");
    let video = fixtures::video(owner.id, "Cat clip", 3);
    app.db.insert_video(video.clone());
    videos.delete_on_view(true);

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 404);
    let viewer = app.db.user(viewer.id).expect("viewer");
    assert!(viewer.watch_history.is_empty());
}

#[tokio::test]
async fn test_get_video_unknown_or_malformed_id() {
    let app = setup_test_app().await;
    let (_, token) = app.create_user("alice");

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", Uuid::new_v4())))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get(&api_path("/videos/12345"))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "videoId is not a valid identifier");
}

#[tokio::test]
async fn test_unpublished_video_is_visible_only_to_owner() {
    let app = setup_test_app().await;
    let (owner, owner_token) = app.create_user("alice");
    let (_, other_token) = app.create_user("bob");
    let mut video = fixtures::video(owner.id, "Draft", 0);
    video.is_published = false;
    app.db.insert_video(video.clone());

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&other_token))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&owner_token))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_update_by_non_owner_is_forbidden_without_side_effects() {
    let app = setup_test_app().await;
    let (owner, _) = app.create_user("alice");
    let (_, intruder_token) = app.create_user("mallory");
    let video = fixtures::video(owner.id, "Original", 1);
    app.db.insert_video(video.clone());
    let writes_before = app.db.video_writes();

    let form = MultipartForm::new()
        .add_text("title", "Hijacked")
        .add_text("description", "nope")
        .add_part("thumbnail", fixtures::image_part("evil.png"));

    let response = app
        .client()
        .patch(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&intruder_token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.db.video_writes(), writes_before);
    assert_eq!(app.media.upload_count(), 0);
    assert!(app.media.deleted_urls().is_empty());
    assert_eq!(app.db.video(video.id).expect("video").title, "Original");
}

#[tokio::test]
async fn test_update_replaces_thumbnail_and_deletes_old_one_once() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");
    let video = fixtures::video(owner.id, "Original", 1);
    app.db.insert_video(video.clone());

    let form = MultipartForm::new()
        .add_text("title", "Renamed")
        .add_text("description", "Updated description")
        .add_part("thumbnail", fixtures::image_part("new.jpg"));

    let response = app
        .client()
        .patch(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let new_thumbnail = app.media.uploaded_urls()[0].clone();
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["description"], "Updated description");
    assert_eq!(body["data"]["thumbnail"], new_thumbnail.as_str());

    let deleted = app.wait_for_deletes(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(deleted, vec![video.thumbnail.clone()]);
    assert_eq!(app.media.deleted_urls().len(), 1);
}

#[tokio::test]
async fn test_failed_update_write_keeps_old_thumbnail() {
    let (app, videos) = setup_faulty_app().await;
    let (owner, token) = app.create_user("alice");
    let video = fixtures::video(owner.id, "Original", 1);
    app.db.insert_video(video.clone());
    videos.fail_updates(true);

    let form = MultipartForm::new()
        .add_text("title", "Renamed")
        .add_text("description", "Updated description")
        .add_part("thumbnail", fixtures::image_part("new.jpg"));

    let response = app
        .client()
        .patch(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DATABASE_ERROR");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.media.deleted_urls().is_empty());
    let stored = app.db.video(video.id).expect("video");
    assert_eq!(stored.thumbnail, video.thumbnail);
    assert_eq!(stored.title, "Original");
}

#[tokio::test]
async fn test_update_requires_thumbnail() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");
    let video = fixtures::video(owner.id, "Original", 1);
    app.db.insert_video(video.clone());

    let form = MultipartForm::new()
        .add_text("title", "Renamed")
        .add_text("description", "Updated description");

    let response = app
        .client()
        .patch(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.db.video(video.id).expect("video").title, "Original");
}

#[tokio::test]
async fn test_delete_video_removes_record_and_schedules_assets() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");
    let video = fixtures::video(owner.id, "Short lived", 1);
    app.db.insert_video(video.clone());

    let response = app
        .client()
        .delete(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["id"], video.id.to_string());
    assert!(app.db.video(video.id).is_none());

    let mut deleted = app.wait_for_deletes(2).await;
    deleted.sort();
    let mut expected = vec![video.video_file.clone(), video.thumbnail.clone()];
    expected.sort();
    assert_eq!(deleted, expected);

    let response = app
        .client()
        .delete(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_delete_video_by_non_owner_is_forbidden() {
    let app = setup_test_app().await;
    let (owner, _) = app.create_user("alice");
    let (_, other_token) = app.create_user("bob");
    let video = fixtures::video(owner.id, "Keep me", 1);
    app.db.insert_video(video.clone());

    let response = app
        .client()
        .delete(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", bearer(&other_token))
        .await;

    assert_eq!(response.status_code(), 403);
    assert!(app.db.video(video.id).is_some());
}

#[tokio::test]
async fn test_toggle_publish_flips_status_for_owner_only() {
    let app = setup_test_app().await;
    let (owner, token) = app.create_user("alice");
    let (_, other_token) = app.create_user("bob");
    let video = fixtures::video(owner.id, "Toggle me", 1);
    app.db.insert_video(video.clone());
    let path = api_path(&format!("/videos/{}/toggle-publish", video.id));

    let response = app
        .client()
        .patch(&path)
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["isPublished"], false);

    let response = app
        .client()
        .patch(&path)
        .add_header("Authorization", bearer(&other_token))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .patch(&path)
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["isPublished"], true);
}
