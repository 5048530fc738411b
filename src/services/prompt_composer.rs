use schemars::schema_for;

use crate::{
    constants::prompts::{
        DOCUMENT_GUIDANCE, OUTPUT_CONTRACT, PLAIN_TEXT_GUIDANCE, VIDEO_FILE_GUIDANCE,
        YOUTUBE_GUIDANCE,
    },
    models::{
        domain::{EnrichedContent, SourceKind},
        dto::GeneratedQuestionDto,
    },
};

fn guidance(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Youtube => YOUTUBE_GUIDANCE,
        SourceKind::VideoFile => VIDEO_FILE_GUIDANCE,
        SourceKind::Document => DOCUMENT_GUIDANCE,
        SourceKind::PlainText => PLAIN_TEXT_GUIDANCE,
    }
}

/// JSON schema of one generated element, pretty-printed for the prompt.
pub fn question_schema() -> String {
    let schema = schema_for!(GeneratedQuestionDto);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

pub fn compose(
    title: &str,
    description: &str,
    content: &EnrichedContent,
    requested_count: usize,
) -> String {
    let title = if title.trim().is_empty() {
        "Untitled course"
    } else {
        title.trim()
    };
    let description = if description.trim().is_empty() {
        "No description provided."
    } else {
        description.trim()
    };

    let contract = OUTPUT_CONTRACT
        .replace("{count}", &requested_count.to_string())
        .replace("{schema}", &question_schema());

    format!(
        "Create a multiple-choice assessment for the course \"{}\".\n\nCourse summary: {}\n\n{}\n\n## MATERIAL\n\n{}\n\n{}",
        title,
        description,
        guidance(content.content_type),
        content.text,
        contract
    )
}
