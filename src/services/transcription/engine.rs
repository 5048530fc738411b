use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::TranscriptionResult,
    services::media_tools::AudioArtifact,
};

use super::{
    AssemblyAiProvider, JobStatus, SimulatedTranscriber, TranscriptionProvider,
    TranscriptionRequest,
};

/// Lifecycle of one transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionState {
    Submitted,
    Polling { attempt: u32 },
    Completed,
    Failed,
    TimedOut,
}

pub struct TranscriptionEngine {
    provider: Option<Arc<dyn TranscriptionProvider>>,
    simulated: Arc<SimulatedTranscriber>,
    poll_interval: Duration,
    max_polls: u32,
}

impl TranscriptionEngine {
    /// Picks the real provider when credentials are configured, otherwise
    /// every call is served by the simulated transcriber.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let provider: Option<Arc<dyn TranscriptionProvider>> =
            config.assemblyai_api_key.clone().map(|key| {
                Arc::new(AssemblyAiProvider::new(http, &config.assemblyai_api_base, key))
                    as Arc<dyn TranscriptionProvider>
            });
        Self::new(provider, config.poll_interval(), config.transcription_max_polls)
    }

    pub fn new(
        provider: Option<Arc<dyn TranscriptionProvider>>,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Self {
        Self {
            provider,
            simulated: Arc::new(SimulatedTranscriber::new()),
            poll_interval,
            max_polls: max_polls.max(1),
        }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider
            .as_ref()
            .map(|p| p.provider_id())
            .unwrap_or("simulated")
    }

    /// Transcribes `audio`. The artifact is cleaned up on every exit path.
    pub async fn transcribe(
        &self,
        audio: AudioArtifact,
        request: &TranscriptionRequest,
    ) -> AppResult<TranscriptionResult> {
        let outcome = self.run(&audio, request).await;
        audio.cleanup().await;
        outcome
    }

    async fn run(
        &self,
        audio: &AudioArtifact,
        request: &TranscriptionRequest,
    ) -> AppResult<TranscriptionResult> {
        let has_audio = audio.byte_len().await > 0;
        let provider = match &self.provider {
            Some(provider) if has_audio => Arc::clone(provider),
            Some(_) => {
                log::warn!(
                    "Audio {} is an empty placeholder; using simulated transcription",
                    audio.path.display()
                );
                return self.run_with(self.simulated.as_ref(), audio, request).await;
            }
            None => {
                log::info!("No transcription provider configured; using simulated transcription");
                return self.run_with(self.simulated.as_ref(), audio, request).await;
            }
        };

        match self.run_with(provider.as_ref(), audio, request).await {
            Err(AppError::ProviderUnavailable(reason)) => {
                log::warn!(
                    "Transcription provider {} unreachable ({}); using simulated transcription",
                    provider.provider_id(),
                    reason
                );
                self.run_with(self.simulated.as_ref(), audio, request).await
            }
            other => other,
        }
    }

    async fn run_with(
        &self,
        provider: &dyn TranscriptionProvider,
        audio: &AudioArtifact,
        request: &TranscriptionRequest,
    ) -> AppResult<TranscriptionResult> {
        let job_id = provider.submit(audio, request).await?;
        let mut state = TranscriptionState::Submitted;
        log::debug!("Transcription job {} {:?}", job_id, state);

        for attempt in 1..=self.max_polls {
            state = TranscriptionState::Polling { attempt };
            let poll = provider.poll(&job_id).await?;
            log::debug!("Transcription job {} {:?} -> {:?}", job_id, state, poll.status);

            match poll.status {
                JobStatus::Completed => {
                    state = TranscriptionState::Completed;
                    log::info!("Transcription job {} {:?} after {} polls", job_id, state, attempt);
                    return poll.result.ok_or_else(|| {
                        AppError::TranscriptionFailed(format!(
                            "job {} completed without a transcript",
                            job_id
                        ))
                    });
                }
                JobStatus::Error => {
                    state = TranscriptionState::Failed;
                    let reason = poll
                        .error
                        .unwrap_or_else(|| "unknown provider error".to_string());
                    log::warn!("Transcription job {} {:?}: {}", job_id, state, reason);
                    return Err(AppError::TranscriptionFailed(reason));
                }
                JobStatus::Queued | JobStatus::Processing => {
                    if attempt < self.max_polls {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        state = TranscriptionState::TimedOut;
        log::warn!("Transcription job {} {:?}", job_id, state);
        Err(AppError::TranscriptionTimeout {
            job_id,
            polls: self.max_polls,
        })
    }
}
