use serde::{Deserialize, Serialize};

/// Course fields the assessment pipeline reads. Course metadata itself is
/// owned by the portal; this crate never writes it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseRef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_reference: Option<String>,
}

impl CourseRef {
    pub fn new(id: &str, title: &str, description: &str, video_reference: Option<&str>) -> Self {
        CourseRef {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            video_reference: video_reference.map(|r| r.to_string()),
        }
    }
}
