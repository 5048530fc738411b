use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::{ContentSource, SourceKind};

static YOUTUBE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/|live/)|youtube-nocookie\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("YOUTUBE_URL_REGEX is a valid regex pattern")
});

pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "wmv", "mkv"];

/// Eleven-character video ID from any supported YouTube URL form.
pub fn extract_video_id(reference: &str) -> Option<String> {
    YOUTUBE_URL_REGEX
        .captures(reference.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn has_video_extension(reference: &str) -> bool {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Classifies a course's content reference. Never fails: a missing or blank
/// reference is plain text.
pub fn classify(reference: Option<&str>, title: &str, description: &str) -> ContentSource {
    let reference = reference.map(str::trim).unwrap_or_default();

    let kind = if reference.is_empty() {
        SourceKind::PlainText
    } else if extract_video_id(reference).is_some() {
        SourceKind::Youtube
    } else if has_video_extension(reference) {
        SourceKind::VideoFile
    } else {
        SourceKind::Document
    };

    log::debug!("Classified content reference '{}' as {}", reference, kind);

    ContentSource {
        kind,
        reference: reference.to_string(),
        title: title.trim().to_string(),
        description: description.trim().to_string(),
    }
}
