use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        transcription::{Entity, Highlight, Polarity, SentimentRecord, TranscriptWord},
        TranscriptionResult,
    },
    services::media_tools::AudioArtifact,
};

use super::{JobPoll, JobStatus, TranscriptionProvider, TranscriptionRequest};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct CreateTranscriptRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
    auto_highlights: bool,
    entity_detection: bool,
    sentiment_analysis: bool,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: JobStatus,
    text: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    words: Vec<WordResponse>,
    auto_highlights_result: Option<HighlightsResponse>,
    #[serde(default)]
    entities: Vec<EntityResponse>,
    #[serde(default)]
    sentiment_analysis_results: Vec<SentimentResponse>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WordResponse {
    text: String,
    start: u64,
    end: u64,
}

#[derive(Debug, Deserialize)]
struct HighlightsResponse {
    #[serde(default)]
    results: Vec<HighlightResponse>,
}

#[derive(Debug, Deserialize)]
struct HighlightResponse {
    text: String,
    rank: f64,
}

#[derive(Debug, Deserialize)]
struct EntityResponse {
    text: String,
    entity_type: String,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    text: String,
    sentiment: String,
    confidence: f64,
}

impl TranscriptResponse {
    fn into_result(self) -> TranscriptionResult {
        let mut result = TranscriptionResult::new(
            self.text.unwrap_or_default(),
            self.confidence.unwrap_or(0.0),
        );
        result.words = self
            .words
            .into_iter()
            .map(|w| TranscriptWord {
                text: w.text,
                start_sec: w.start as f64 / 1000.0,
                end_sec: w.end as f64 / 1000.0,
            })
            .collect();
        result.highlights = self
            .auto_highlights_result
            .map(|h| h.results)
            .unwrap_or_default()
            .into_iter()
            .map(|h| Highlight {
                text: h.text,
                weight: h.rank,
            })
            .collect();
        result.entities = self
            .entities
            .into_iter()
            .map(|e| Entity {
                text: e.text,
                category: e.entity_type,
            })
            .collect();
        result.sentiment = self
            .sentiment_analysis_results
            .into_iter()
            .map(|s| SentimentRecord {
                text: s.text,
                polarity: Polarity::parse(&s.sentiment),
                confidence: s.confidence.clamp(0.0, 1.0),
            })
            .collect();
        result
    }

    fn into_poll(self) -> JobPoll {
        match self.status {
            JobStatus::Completed => JobPoll::completed(self.into_result()),
            JobStatus::Error => JobPoll::failed(
                self.error
                    .unwrap_or_else(|| "provider reported an error without a reason".to_string()),
            ),
            status => JobPoll::pending(status),
        }
    }
}

/// AssemblyAI v2 REST client: upload, create transcript, poll transcript.
pub struct AssemblyAiProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: SecretString,
}

impl AssemblyAiProvider {
    pub fn new(http: reqwest::Client, api_base: &str, api_key: SecretString) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn map_transport(err: reqwest::Error) -> AppError {
        if err.is_connect() || err.is_timeout() {
            AppError::ProviderUnavailable(err.to_string())
        } else {
            AppError::TranscriptionFailed(err.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status.is_server_error() {
            Err(AppError::ProviderUnavailable(format!("{}: {}", status, body)))
        } else {
            Err(AppError::TranscriptionFailed(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl TranscriptionProvider for AssemblyAiProvider {
    fn provider_id(&self) -> &'static str {
        "assemblyai"
    }

    async fn submit(&self, audio: &AudioArtifact, request: &TranscriptionRequest) -> AppResult<String> {
        let bytes = tokio::fs::read(&audio.path).await.map_err(|e| {
            AppError::TranscriptionFailed(format!("cannot read {}: {}", audio.path.display(), e))
        })?;

        let upload = self
            .http
            .post(format!("{}/upload", self.api_base))
            .header("authorization", self.api_key.expose_secret())
            .body(bytes)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let upload: UploadResponse = Self::check_status(upload)
            .await?
            .json()
            .await
            .map_err(Self::map_transport)?;

        let body = CreateTranscriptRequest {
            audio_url: &upload.upload_url,
            language_code: &request.language_hint,
            auto_highlights: request.auto_highlights,
            entity_detection: request.entity_detection,
            sentiment_analysis: request.sentiment_analysis,
        };
        let created = self
            .http
            .post(format!("{}/transcript", self.api_base))
            .header("authorization", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let created: TranscriptResponse = Self::check_status(created)
            .await?
            .json()
            .await
            .map_err(Self::map_transport)?;

        log::info!("Submitted transcription job {} to AssemblyAI", created.id);
        Ok(created.id)
    }

    async fn poll(&self, job_id: &str) -> AppResult<JobPoll> {
        let response = self
            .http
            .get(format!("{}/transcript/{}", self.api_base, job_id))
            .header("authorization", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::TranscriptionFailed(e.to_string()))?;
        let transcript: TranscriptResponse = Self::check_status(response)
            .await
            .map_err(|e| AppError::TranscriptionFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::TranscriptionFailed(e.to_string()))?;
        Ok(transcript.into_poll())
    }
}
