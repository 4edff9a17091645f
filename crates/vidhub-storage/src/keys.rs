//! Shared key generation for storage backends.
//!
//! Key format: `videos/{uuid}.{ext}` for video assets, `images/{uuid}.{ext}` for images.

use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Kind of asset held by the media store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetKind::Video => "videos",
            AssetKind::Image => "images",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetKind::Video => write!(f, "video"),
            AssetKind::Image => write!(f, "image"),
        }
    }
}

/// Generate a fresh storage key for an asset.
///
/// The extension is lowercased and kept only when it is plain alphanumeric.
pub fn generate_asset_key(kind: AssetKind, extension: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match extension
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        Some(ext) => format!("{}/{}.{}", kind.prefix(), id, ext),
        None => format!("{}/{}", kind.prefix(), id),
    }
}

/// Strip `{base_url}/` from a URL, returning the key if what remains is a valid key.
pub fn key_from_url(base_url: &str, url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let key = url.strip_prefix(base)?.strip_prefix('/')?;
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return None;
    }
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_asset_key_layout() {
        let key = generate_asset_key(AssetKind::Video, Some("MP4"));
        assert!(key.starts_with("videos/"));
        assert!(key.ends_with(".mp4"));

        let key = generate_asset_key(AssetKind::Image, Some("../png"));
        assert!(key.starts_with("images/"));
        assert!(!key.contains(".."));

        assert_ne!(
            generate_asset_key(AssetKind::Image, Some("png")),
            generate_asset_key(AssetKind::Image, Some("png"))
        );
    }

    #[test]
    fn test_key_from_url() {
        let base = "http://localhost:4000/media/";
        assert_eq!(
            key_from_url(base, "http://localhost:4000/media/images/a.png").as_deref(),
            Some("images/a.png")
        );
        assert_eq!(key_from_url(base, "https://cdn.example.com/images/a.png"), None);
        assert_eq!(key_from_url(base, "http://localhost:4000/media/"), None);
        assert_eq!(
            key_from_url(base, "http://localhost:4000/media/../secret"),
            None
        );
        assert_eq!(key_from_url(base, "http://localhost:4000/mediax/a.png"), None);
    }
}
