//! SQL for the video listing: join owners, filter, sort, paginate in one statement.

use sqlx::{Postgres, QueryBuilder};
use vidhub_core::models::{OwnerDetails, Video, VideoListQuery, VideoWithOwner};

/// Columns selected for a video joined with its owner (`v` = videos, `u` = users).
pub(crate) const VIDEO_WITH_OWNER_COLUMNS: &str = "v.id, v.video_file, v.thumbnail, v.title, \
     v.description, v.duration, v.views, v.is_published, v.owner_id, v.created_at, v.updated_at, \
     u.username AS owner_username, u.full_name AS owner_full_name, u.avatar AS owner_avatar";

/// Row produced by `VIDEO_WITH_OWNER_COLUMNS`. Owner columns are NULL when the
/// join found no user.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VideoOwnerRow {
    #[sqlx(flatten)]
    pub video: Video,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    pub owner_avatar: Option<String>,
}

impl From<VideoOwnerRow> for VideoWithOwner {
    fn from(row: VideoOwnerRow) -> Self {
        let owner_details = match (row.owner_username, row.owner_full_name, row.owner_avatar) {
            (Some(username), Some(full_name), Some(avatar)) => Some(OwnerDetails {
                username,
                full_name,
                avatar,
            }),
            _ => None,
        };
        VideoWithOwner {
            video: row.video,
            owner_details,
        }
    }
}

/// Escape `%`, `_` and `\` so the search text matches literally under ILIKE.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the listing statement. The owner filter is only present when the query
/// names an owner; ties on the sort column are broken by id.
pub(crate) fn build_list_query(query: &VideoListQuery, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {VIDEO_WITH_OWNER_COLUMNS} FROM videos v LEFT JOIN users u ON u.id = v.owner_id \
         WHERE v.is_published = TRUE AND v.title ILIKE "
    ));
    qb.push_bind(format!("%{}%", escape_like(&query.search)));
    qb.push(" ESCAPE '\\'");

    if let Some(owner_id) = query.owner_id {
        qb.push(" AND v.owner_id = ");
        qb.push_bind(owner_id);
    }

    // Column and direction come from closed enums, never from the request text.
    let direction = query.direction.as_sql();
    qb.push(format!(
        " ORDER BY v.{} {}, v.id {}",
        query.sort_field.column(),
        direction,
        direction
    ));
    qb.push(" OFFSET ");
    qb.push_bind(offset);
    qb.push(" LIMIT ");
    qb.push_bind(query.limit);
    qb
}
