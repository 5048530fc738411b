use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::{
    config::Config,
    constants::{
        fallback_questions::FALLBACK_QUESTION_BANK, prompts::ASSESSMENT_SYSTEM_PROMPT,
    },
    errors::{AppError, AppResult},
    models::{
        domain::{Assessment, AssessmentQuestion, EnrichedContent},
        dto::GeneratedQuestionDto,
    },
    services::{
        model_service::{CompletionRequest, GenerativeTextClient},
        prompt_composer,
    },
};

pub const MIN_CONTENT_LEN: usize = 20;

static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("CODE_FENCE_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.generation_temperature,
            max_tokens: config.generation_max_tokens,
            timeout: config.generation_timeout(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Templated questions about `title`, at most the size of the bank.
pub fn fallback_questions(title: &str, requested_count: usize) -> Vec<AssessmentQuestion> {
    let title = if title.trim().is_empty() {
        "this course"
    } else {
        title.trim()
    };

    FALLBACK_QUESTION_BANK
        .iter()
        .take(requested_count)
        .filter_map(|template| {
            AssessmentQuestion::new(
                template.question.replace("{title}", title),
                template.options.map(|o| o.replace("{title}", title)),
                template.correct_index,
                template.explanation,
            )
            .ok()
        })
        .collect()
}

/// End index (exclusive) of the array opening at `start`, skipping brackets in strings.
fn balanced_end(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced array in `body` holding at least one JSON object.
fn find_object_array(body: &str) -> Result<Vec<Value>, String> {
    let mut last_error = "no JSON array of objects found".to_string();
    for (start, _) in body.match_indices('[') {
        let Some(end) = balanced_end(body, start) else {
            continue;
        };
        match serde_json::from_str::<Value>(&body[start..end]) {
            Ok(Value::Array(items)) if items.iter().any(Value::is_object) => return Ok(items),
            Ok(_) => {}
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(last_error)
}

/// First top-level JSON array of objects in free-form model output. A fenced
/// block is searched first, then the whole response.
pub fn extract_json_array(raw: &str) -> AppResult<Vec<Value>> {
    let fenced = CODE_FENCE_REGEX
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|inner| inner.contains('['));

    if let Some(items) = fenced.and_then(|body| find_object_array(body).ok()) {
        return Ok(items);
    }
    find_object_array(raw).map_err(AppError::MalformedGenerationOutput)
}

/// Extracts and validates generated questions, dropping malformed elements.
pub fn parse_questions(raw: &str) -> AppResult<Vec<AssessmentQuestion>> {
    let items = extract_json_array(raw)?;
    let total = items.len();

    let questions: Vec<AssessmentQuestion> = items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let dto = GeneratedQuestionDto::from_value(item)?;
            match AssessmentQuestion::try_from(dto) {
                Ok(question) => Some(question),
                Err(e) => {
                    log::warn!("Dropping generated question {}: {}", position, e);
                    None
                }
            }
        })
        .collect();

    if questions.len() < total {
        log::warn!("Kept {} of {} generated questions", questions.len(), total);
    }
    Ok(questions)
}

pub struct AssessmentGenerator {
    client: Arc<dyn GenerativeTextClient>,
    settings: GenerationSettings,
    min_content_len: usize,
}

impl AssessmentGenerator {
    pub fn new(client: Arc<dyn GenerativeTextClient>, settings: GenerationSettings) -> Self {
        Self {
            client,
            settings,
            min_content_len: MIN_CONTENT_LEN,
        }
    }

    pub async fn generate(
        &self,
        course_id: &str,
        title: &str,
        description: &str,
        content: &EnrichedContent,
        requested_count: usize,
    ) -> AppResult<Assessment> {
        if requested_count == 0 {
            return Err(AppError::ValidationError(
                "requested question count must be at least 1".to_string(),
            ));
        }

        if content.substance_len() < self.min_content_len {
            let questions = fallback_questions(title, requested_count);
            log::warn!(
                "Content for course {} is too thin ({} chars); using {} templated questions",
                course_id,
                content.substance_len(),
                questions.len()
            );
            return Ok(Assessment::new(
                course_id,
                questions,
                requested_count,
                true,
                content.confidence,
            ));
        }

        let request = CompletionRequest {
            system: ASSESSMENT_SYSTEM_PROMPT.to_string(),
            prompt: prompt_composer::compose(title, description, content, requested_count),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        log::info!(
            "Requesting {} questions for course {} ({} content)",
            requested_count,
            course_id,
            content.content_type
        );
        let raw = tokio::time::timeout(self.settings.timeout, self.client.complete(request))
            .await
            .map_err(|_| {
                AppError::GenerationFailed(format!(
                    "no response within {:?}",
                    self.settings.timeout
                ))
            })??;

        let questions = parse_questions(&raw)?;
        log::info!(
            "Generated {} of {} requested questions for course {}",
            questions.len(),
            requested_count,
            course_id
        );
        Ok(Assessment::new(
            course_id,
            questions,
            requested_count,
            false,
            content.confidence,
        ))
    }
}
