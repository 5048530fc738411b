use serde::{Deserialize, Serialize};

use crate::models::domain::content_source::SourceKind;

/// Best-effort facts about a video, gathered during acquisition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MediaMetadata {
    pub duration_secs: Option<f64>,
    pub category: Option<String>,
    pub view_count: Option<u64>,
}

impl MediaMetadata {
    pub fn is_empty(&self) -> bool {
        self.duration_secs.is_none() && self.category.is_none() && self.view_count.is_none()
    }
}

/// Flattened text handed to prompt composition. Lives for one pipeline run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EnrichedContent {
    pub text: String,
    pub content_type: SourceKind,
    /// Material actually describing the subject (description, transcript,
    /// readable file name) without labels or placeholders.
    pub substance: String,
    pub confidence: f64,
    pub fallback: bool,
}

impl EnrichedContent {
    pub fn substance_len(&self) -> usize {
        self.substance.trim().chars().count()
    }
}
