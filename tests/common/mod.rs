#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use course_assessment::{
    db::retry::RetryPolicy,
    errors::{AppError, AppResult},
    models::domain::{AssessmentQuestionRecord, CourseRef},
    repositories::{AssessmentRepository, CourseRepository},
    services::{
        assessment_generator::{AssessmentGenerator, GenerationSettings},
        assessment_service::AssessmentService,
        audio_acquirer::AudioAcquirer,
        course_lock::{CourseLocks, RegenerationPolicy},
        media_tools::MediaToolkit,
        model_service::{CompletionRequest, GenerativeTextClient},
        pipeline::AssessmentPipeline,
        transcription::TranscriptionEngine,
    },
};

pub struct InMemoryAssessmentRepository {
    rows: Arc<RwLock<HashMap<String, Vec<AssessmentQuestionRecord>>>>,
    replace_calls: AtomicUsize,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            replace_calls: AtomicUsize::new(0),
        }
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }

    pub async fn row_count(&self, course_id: &str) -> usize {
        self.rows
            .read()
            .await
            .get(course_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn replace_for_course(
        &self,
        course_id: &str,
        records: Vec<AssessmentQuestionRecord>,
    ) -> AppResult<()> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        if records.iter().any(|r| r.course_id != course_id) {
            return Err(AppError::ValidationError(format!(
                "records must belong to course {}",
                course_id
            )));
        }
        let mut rows = self.rows.write().await;
        rows.insert(course_id.to_string(), records);
        Ok(())
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<AssessmentQuestionRecord>> {
        let rows = self.rows.read().await;
        let mut records = rows.get(course_id).cloned().unwrap_or_default();
        records.sort_by_key(|r| r.position);
        Ok(records)
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(course_id).map(|r| r.len() as u64).unwrap_or(0))
    }
}

pub struct InMemoryCourseRepository {
    courses: HashMap<String, CourseRef>,
}

impl InMemoryCourseRepository {
    pub fn new(courses: Vec<CourseRef>) -> Self {
        Self {
            courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CourseRef>> {
        Ok(self.courses.get(id).cloned())
    }
}

/// Generative client returning a canned response, optionally after a delay,
/// and counting calls.
pub struct ScriptedTextClient {
    response: String,
    delay: Duration,
    calls: AtomicUsize,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedTextClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerativeTextClient for ScriptedTextClient {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.response.clone())
    }
}

pub fn question_json(index: usize) -> serde_json::Value {
    json!({
        "question": format!("What does step {} of the procedure require?", index + 1),
        "options": ["Wearing gloves", "Skipping the check", "Working alone", "Ignoring signage"],
        "correctIndex": 0,
        "explanation": "The procedure requires gloves at every step."
    })
}

/// Free-form response wrapping `valid` good questions and, optionally, one
/// element with only three options.
pub fn model_response(valid: usize, with_three_option_element: bool) -> String {
    let mut items: Vec<serde_json::Value> = (0..valid).map(question_json).collect();
    if with_three_option_element {
        items.insert(
            2.min(items.len()),
            json!({
                "question": "Which three options are there?",
                "options": ["One", "Two", "Three"],
                "correctIndex": 1,
                "explanation": "Malformed on purpose."
            }),
        );
    }
    format!(
        "```json\n{}\n```",
        serde_json::to_string_pretty(&items).unwrap()
    )
}

/// Toolkit whose external binaries do not exist, so no process or network
/// call can succeed.
pub fn offline_toolkit(work_dir: &Path) -> MediaToolkit {
    MediaToolkit {
        work_dir: work_dir.to_path_buf(),
        ffmpeg_bin: "ffmpeg-not-installed".to_string(),
        ffprobe_bin: "ffprobe-not-installed".to_string(),
        ytdlp_bin: "yt-dlp-not-installed".to_string(),
        fallback_downloader_bin: "youtube-dl-not-installed".to_string(),
    }
}

pub struct Harness {
    pub pipeline: Arc<AssessmentPipeline>,
    pub writer: Arc<AssessmentService>,
    pub repository: Arc<InMemoryAssessmentRepository>,
    pub client: Arc<ScriptedTextClient>,
}

pub fn harness(
    work_dir: &Path,
    client: ScriptedTextClient,
    courses: Vec<CourseRef>,
    policy: RegenerationPolicy,
) -> Harness {
    harness_with_settings(work_dir, client, courses, policy, GenerationSettings::default())
}

pub fn harness_with_settings(
    work_dir: &Path,
    client: ScriptedTextClient,
    courses: Vec<CourseRef>,
    policy: RegenerationPolicy,
    settings: GenerationSettings,
) -> Harness {
    let repository = Arc::new(InMemoryAssessmentRepository::new());
    let writer = Arc::new(AssessmentService::new(
        repository.clone(),
        RetryPolicy::new(2, Duration::from_millis(1)),
    ));
    let client = Arc::new(client);

    let pipeline = AssessmentPipeline::new(
        AudioAcquirer::with_strategies(offline_toolkit(work_dir), Vec::new()),
        TranscriptionEngine::new(None, Duration::from_millis(1), 5),
        AssessmentGenerator::new(client.clone(), settings),
        Arc::clone(&writer),
        Arc::new(InMemoryCourseRepository::new(courses)),
        CourseLocks::new(policy),
        "en",
    );

    Harness {
        pipeline: Arc::new(pipeline),
        writer,
        repository,
        client,
    }
}
