use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Youtube,
    VideoFile,
    Document,
    PlainText,
}

impl SourceKind {
    pub fn is_video(&self) -> bool {
        matches!(self, SourceKind::Youtube | SourceKind::VideoFile)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "YouTube video",
            SourceKind::VideoFile => "uploaded video file",
            SourceKind::Document => "document",
            SourceKind::PlainText => "course description",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Youtube => write!(f, "youtube"),
            SourceKind::VideoFile => write!(f, "video_file"),
            SourceKind::Document => write!(f, "document"),
            SourceKind::PlainText => write!(f, "plain_text"),
        }
    }
}

/// A classified piece of course material. Built once per request, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSource {
    pub kind: SourceKind,
    pub reference: String,
    pub title: String,
    pub description: String,
}

impl ContentSource {
    /// File name component of the reference, if it has one.
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.reference)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
    }

    /// Lower-cased extension of the reference without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.reference)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File stem with separators turned into spaces, e.g. `fire_safety-2024` -> `fire safety 2024`.
    pub fn readable_stem(&self) -> Option<String> {
        let stem = Path::new(&self.reference).file_stem()?.to_str()?;
        let words: Vec<&str> = stem
            .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}
