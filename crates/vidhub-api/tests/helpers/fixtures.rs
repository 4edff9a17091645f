//! Seed data and multipart parts for integration tests.

#![allow(dead_code)]

use axum_test::multipart::Part;
use chrono::{Duration, Utc};
use uuid::Uuid;
use vidhub_api::auth::password::hash_password;
use vidhub_core::models::{User, Video};

/// Password of every seeded user.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn user(username: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        full_name: format!("{} Tester", username),
        username: username.to_lowercase(),
        email: format!("{}@example.com", username.to_lowercase()),
        avatar: format!("http://media.test/images/{}-avatar.png", username),
        cover_image: None,
        password_hash: hash_password(TEST_PASSWORD).expect("hash password"),
        refresh_token: None,
        watch_history: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// A published video whose creation time is offset by `views` seconds so that
/// creation order and view order agree.
pub fn video(owner_id: Uuid, title: &str, views: i64) -> Video {
    let now = Utc::now();
    Video {
        id: Uuid::new_v4(),
        video_file: format!("http://media.test/videos/{}.mp4", Uuid::new_v4()),
        thumbnail: format!("http://media.test/images/{}.png", Uuid::new_v4()),
        title: title.to_string(),
        description: format!("About {}", title),
        duration: 10.0,
        views,
        is_published: true,
        owner_id,
        created_at: now + Duration::seconds(views),
        updated_at: now,
    }
}

pub fn video_part() -> Part {
    Part::bytes(b"\x00\x00\x00\x18ftypmp42 fake video".to_vec())
        .file_name("clip.mp4")
        .mime_type("video/mp4")
}

pub fn image_part(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\n fake image".to_vec())
        .file_name(name)
        .mime_type("image/png")
}
