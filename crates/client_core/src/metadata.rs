use serde::{Deserialize, Serialize};
use shared::protocol::VideoMetadata;

/// Editable form fields as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadataForm {
    pub title: String,
    pub description: String,
    /// Comma-separated, e.g. `rust, video`.
    pub tags: String,
    pub category: String,
    pub status: String,
}

impl VideoMetadataForm {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn to_metadata(&self) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tag_list(),
            status: self.status.clone(),
            category: self.category.clone(),
        }
    }
}
