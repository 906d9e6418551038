use serde::{Deserialize, Serialize};

use crate::domain::{SessionId, VideoId};

pub const CSRF_TOKEN_HEADER: &str = "Csrf-Token";
pub const FILESIZE_HEADER: &str = "filesize";
pub const TITLE_HEADER: &str = "title";
pub const DESCRIPTION_HEADER: &str = "description";
pub const TAGS_HEADER: &str = "tags";
pub const CATEGORY_HEADER: &str = "category";
pub const STATUS_HEADER: &str = "status";

/// Multipart field name carrying the video bytes.
pub const UPLOAD_FILE_FIELD: &str = "file";

pub const EMBED_URL_PREFIX: &str = "www.youtube.com/embed/";

/// Per-session endpoints exposed by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    Progress,
    Cancel,
    VideoId,
    Update,
}

impl Endpoint {
    pub fn segment(self) -> &'static str {
        match self {
            Endpoint::Upload => "upload",
            Endpoint::Progress => "progress",
            Endpoint::Cancel => "cancel",
            Endpoint::VideoId => "video-id",
            Endpoint::Update => "update",
        }
    }

    /// Path segments below the service base, e.g. `["abc123", "progress"]`.
    pub fn path_segments(self, session_id: &SessionId) -> [&str; 2] {
        [session_id.as_str(), self.segment()]
    }
}

/// Metadata sent both as upload headers and as the update JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: String,
    pub category: String,
}

pub fn embed_url(video_id: &VideoId) -> String {
    format!("{EMBED_URL_PREFIX}{}", video_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_are_scoped_by_session() {
        let session = SessionId::new("abc123").expect("session");
        assert_eq!(Endpoint::Upload.path_segments(&session), ["abc123", "upload"]);
        assert_eq!(
            Endpoint::VideoId.path_segments(&session),
            ["abc123", "video-id"]
        );
    }

    #[test]
    fn update_body_uses_expected_field_names() {
        let metadata = VideoMetadata {
            title: "Demo".to_string(),
            description: "A demo".to_string(),
            tags: vec!["rust".to_string(), "video".to_string()],
            status: "unlisted".to_string(),
            category: "22".to_string(),
        };
        let json = serde_json::to_value(&metadata).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Demo",
                "description": "A demo",
                "tags": ["rust", "video"],
                "status": "unlisted",
                "category": "22",
            })
        );
    }

    #[test]
    fn embed_url_prefixes_video_id() {
        let id = VideoId::new("dQw4w9WgXcQ").expect("id");
        assert_eq!(embed_url(&id), "www.youtube.com/embed/dQw4w9WgXcQ");
    }
}
