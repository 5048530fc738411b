pub mod assemblyai;
pub mod engine;
pub mod simulated;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{errors::AppResult, models::domain::TranscriptionResult, services::media_tools::AudioArtifact};

pub use assemblyai::AssemblyAiProvider;
pub use engine::TranscriptionEngine;
pub use simulated::SimulatedTranscriber;

/// Provider-side job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPoll {
    pub status: JobStatus,
    pub result: Option<TranscriptionResult>,
    pub error: Option<String>,
}

impl JobPoll {
    pub fn pending(status: JobStatus) -> Self {
        Self {
            status,
            result: None,
            error: None,
        }
    }

    pub fn completed(result: TranscriptionResult) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            result: None,
            error: Some(reason.into()),
        }
    }
}

/// Context a provider may use besides the audio bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptionRequest {
    pub language_hint: String,
    /// File name of the original media, when there is one.
    pub source_name: String,
    pub title: String,
    pub description: String,
    pub auto_highlights: bool,
    pub entity_detection: bool,
    pub sentiment_analysis: bool,
}

impl TranscriptionRequest {
    pub fn new(language_hint: &str, source_name: &str, title: &str, description: &str) -> Self {
        Self {
            language_hint: language_hint.to_string(),
            source_name: source_name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            auto_highlights: true,
            entity_detection: true,
            sentiment_analysis: true,
        }
    }
}

/// Asynchronous speech-to-text capability: submit a job, then poll it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn provider_id(&self) -> &'static str;
    async fn submit(&self, audio: &AudioArtifact, request: &TranscriptionRequest) -> AppResult<String>;
    async fn poll(&self, job_id: &str) -> AppResult<JobPoll>;
}
