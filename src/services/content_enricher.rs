use std::fmt::Write;

use crate::{
    models::domain::{ContentSource, EnrichedContent, MediaMetadata, SourceKind, TranscriptionResult},
    services::audio_acquirer::DESCRIPTION_ONLY_CONFIDENCE,
};

const UNTITLED: &str = "Untitled course";
const NO_DESCRIPTION: &str = "No description provided.";
const NO_TRANSCRIPT: &str = "No transcript available.";
const MAX_LISTED_HIGHLIGHTS: usize = 10;
const MAX_LISTED_ENTITIES: usize = 15;

fn preamble(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Youtube => {
            "The following material was transcribed from a YouTube video assigned as course content."
        }
        SourceKind::VideoFile => {
            "The following material was transcribed from a training video uploaded to the course."
        }
        SourceKind::Document => {
            "The course material is an attached document. Only its file details, title and description are available."
        }
        SourceKind::PlainText => {
            "The course has no attached material. Only its title and description are available."
        }
    }
}

fn file_type_guidance(extension: Option<&str>) -> &'static str {
    match extension {
        Some("pdf") => "PDF document: typically a manual, policy or procedure; expect definitions, rules and step-by-step instructions.",
        Some("xls") | Some("xlsx") | Some("csv") | Some("ods") => "Spreadsheet: typically tabular data such as schedules, checklists, price lists or metrics; expect questions about what the data tracks and how it is used.",
        Some("doc") | Some("docx") | Some("odt") | Some("rtf") => "Word-processor document: typically a guide, handbook or written procedure.",
        Some("ppt") | Some("pptx") | Some("odp") => "Slide presentation: typically a summary of key points, one idea per slide.",
        Some("txt") | Some("md") => "Plain text notes: typically short explanations or lists.",
        _ => "Unknown file type: infer the subject from the file name, title and description.",
    }
}

/// `m:ss` for durations under an hour, `h:mm:ss` above.
pub fn format_duration(total_secs: f64) -> String {
    let secs = total_secs.max(0.0).round() as u64;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn format_views(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value.trim()
    }
}

/// Builds the labelled text block for prompt composition. Never fails; every
/// missing field becomes a neutral placeholder.
pub fn enrich(
    source: &ContentSource,
    transcript: Option<&TranscriptionResult>,
    metadata: &MediaMetadata,
) -> EnrichedContent {
    let mut text = String::new();
    let mut substance: Vec<String> = Vec::new();

    let description = source.description.trim();
    if !description.is_empty() {
        substance.push(description.to_string());
    }

    let _ = writeln!(text, "{}", preamble(source.kind));
    let _ = writeln!(text);
    let _ = writeln!(text, "CONTENT TYPE: {}", source.kind.label());
    let _ = writeln!(text, "TITLE: {}", or_placeholder(&source.title, UNTITLED));

    let duration = metadata
        .duration_secs
        .or_else(|| transcript.and_then(|t| t.duration_secs()));
    if let Some(duration) = duration.filter(|_| source.kind.is_video()) {
        let _ = writeln!(text, "DURATION: {}", format_duration(duration));
    }
    if let Some(category) = metadata.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(text, "CATEGORY: {}", category.trim());
    }
    if let Some(views) = metadata.view_count {
        let _ = writeln!(text, "POPULARITY: {} views", format_views(views));
    }

    let _ = writeln!(text, "DESCRIPTION: {}", or_placeholder(description, NO_DESCRIPTION));
    let _ = writeln!(text);

    let (confidence, fallback) = match source.kind {
        SourceKind::Youtube | SourceKind::VideoFile => match transcript {
            Some(transcript) if !transcript.text.trim().is_empty() => {
                let _ = writeln!(text, "TRANSCRIPT (confidence {:.2}):", transcript.confidence);
                let _ = writeln!(text, "{}", transcript.text.trim());
                substance.push(transcript.text.trim().to_string());

                if !transcript.highlights.is_empty() {
                    let _ = writeln!(text);
                    let _ = writeln!(text, "KEY POINTS:");
                    for highlight in transcript.highlights.iter().take(MAX_LISTED_HIGHLIGHTS) {
                        let _ = writeln!(text, "- {}", highlight.text);
                    }
                }
                if !transcript.entities.is_empty() {
                    let _ = writeln!(text);
                    let _ = writeln!(text, "ENTITIES:");
                    for entity in transcript.entities.iter().take(MAX_LISTED_ENTITIES) {
                        let _ = writeln!(text, "- {} ({})", entity.text, entity.category);
                    }
                }
                (transcript.confidence, false)
            }
            _ => {
                let _ = writeln!(text, "TRANSCRIPT: {}", NO_TRANSCRIPT);
                (DESCRIPTION_ONLY_CONFIDENCE, true)
            }
        },
        SourceKind::Document => {
            let _ = writeln!(
                text,
                "FILE: {}",
                source.file_name().unwrap_or("unnamed file")
            );
            let _ = writeln!(
                text,
                "FILE TYPE: {}",
                file_type_guidance(source.extension().as_deref())
            );
            if let Some(stem) = source.readable_stem() {
                substance.push(stem);
            }
            (1.0, false)
        }
        SourceKind::PlainText => (1.0, false),
    };

    EnrichedContent {
        text: text.trim_end().to_string(),
        content_type: source.kind,
        substance: substance.join("\n"),
        confidence,
        fallback,
    }
}
