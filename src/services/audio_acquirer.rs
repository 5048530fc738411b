use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        transcription::TranscriptWord, ContentSource, MediaMetadata, SourceKind,
        TranscriptionResult,
    },
    services::{
        media_tools::{remove_scratch, AudioArtifact, MediaToolkit},
        source_classifier::extract_video_id,
    },
};

pub const YOUTUBE_TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";
pub const PLATFORM_TRANSCRIPT_CONFIDENCE: f64 = 0.9;
pub const DESCRIPTION_ONLY_CONFIDENCE: f64 = 0.5;

static CAPTION_CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text[^>]*?start="([0-9.]+)"[^>]*?dur="([0-9.]+)"[^>]*>(.*?)</text>"#)
        .expect("CAPTION_CUE_REGEX is a valid regex pattern")
});

static MARKUP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("MARKUP_REGEX is a valid regex pattern"));

#[derive(Clone, Debug, PartialEq)]
pub enum AcquiredContent {
    /// Ready-made transcript, no speech-to-text needed.
    Transcript(TranscriptionResult),
    Audio(AudioArtifact),
    /// Every strategy failed; only title and description remain.
    DescriptionOnly,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Acquisition {
    pub content: AcquiredContent,
    pub metadata: MediaMetadata,
    pub strategy: Option<&'static str>,
}

#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn acquire(&self, source: &ContentSource) -> AppResult<AcquiredContent>;
}

/// Public caption track looked up by video ID.
pub struct PlatformTranscriptStrategy {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl PlatformTranscriptStrategy {
    pub fn new(http: reqwest::Client, base_url: &str, language: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            language: language.to_string(),
        }
    }
}

fn decode_entities(raw: &str) -> String {
    let stripped = MARKUP_REGEX.replace_all(raw, "");
    stripped
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace('\n', " ")
}

/// Converts a `timedtext` XML caption track into a transcription result,
/// spreading each cue's duration evenly over its words.
pub fn parse_caption_track(xml: &str) -> Option<TranscriptionResult> {
    let mut words = Vec::new();
    let mut lines = Vec::new();

    for caps in CAPTION_CUE_REGEX.captures_iter(xml) {
        let start: f64 = caps[1].parse().unwrap_or(0.0);
        let duration: f64 = caps[2].parse().unwrap_or(0.0);
        let text = decode_entities(&caps[3]);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let cue_words: Vec<&str> = text.split_whitespace().collect();
        let step = duration / cue_words.len() as f64;
        for (i, word) in cue_words.iter().enumerate() {
            words.push(TranscriptWord {
                text: word.to_string(),
                start_sec: start + step * i as f64,
                end_sec: start + step * (i + 1) as f64,
            });
        }
        lines.push(text.to_string());
    }

    if lines.is_empty() {
        return None;
    }

    let mut result = TranscriptionResult::new(lines.join(" "), PLATFORM_TRANSCRIPT_CONFIDENCE);
    result.words = words;
    Some(result)
}

#[async_trait]
impl AcquisitionStrategy for PlatformTranscriptStrategy {
    fn name(&self) -> &'static str {
        "platform_transcript"
    }

    async fn acquire(&self, source: &ContentSource) -> AppResult<AcquiredContent> {
        let video_id = extract_video_id(&source.reference).ok_or_else(|| {
            AppError::AcquisitionFailed {
                strategy: self.name().to_string(),
                reason: format!("no video id in '{}'", source.reference),
            }
        })?;

        let failed = |reason: String| AppError::AcquisitionFailed {
            strategy: "platform_transcript".to_string(),
            reason,
        };

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("lang", self.language.as_str()), ("v", video_id.as_str())])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!("caption endpoint returned {}", response.status())));
        }
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;

        parse_caption_track(&body)
            .map(AcquiredContent::Transcript)
            .ok_or_else(|| failed(format!("no captions published for video {}", video_id)))
    }
}

/// Full media download followed by audio extraction.
pub struct DownloadExtractStrategy {
    toolkit: MediaToolkit,
}

impl DownloadExtractStrategy {
    pub fn new(toolkit: MediaToolkit) -> Self {
        Self { toolkit }
    }

    async fn extract_from(&self, video_path: &Path) -> AppResult<AcquiredContent> {
        let audio_path = self.toolkit.scratch_path("wav").await?;
        match self.toolkit.extract_audio(video_path, &audio_path).await {
            Ok(()) => Ok(AcquiredContent::Audio(AudioArtifact::temporary(audio_path))),
            Err(e) => {
                remove_scratch(&audio_path).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for DownloadExtractStrategy {
    fn name(&self) -> &'static str {
        "download_extract"
    }

    async fn acquire(&self, source: &ContentSource) -> AppResult<AcquiredContent> {
        let video_path = self.toolkit.download_video(&source.reference).await?;
        let extracted = self.extract_from(&video_path).await;
        remove_scratch(&video_path).await;
        extracted
    }
}

/// Last resort: audio-only download through a more tolerant downloader.
pub struct FallbackDownloaderStrategy {
    toolkit: MediaToolkit,
}

impl FallbackDownloaderStrategy {
    pub fn new(toolkit: MediaToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl AcquisitionStrategy for FallbackDownloaderStrategy {
    fn name(&self) -> &'static str {
        "fallback_downloader"
    }

    async fn acquire(&self, source: &ContentSource) -> AppResult<AcquiredContent> {
        let audio_path = self.toolkit.download_audio_tolerant(&source.reference).await?;
        Ok(AcquiredContent::Audio(AudioArtifact::temporary(audio_path)))
    }
}

pub struct AudioAcquirer {
    toolkit: MediaToolkit,
    youtube_strategies: Vec<Arc<dyn AcquisitionStrategy>>,
}

impl AudioAcquirer {
    pub fn new(toolkit: MediaToolkit, http: reqwest::Client, language: &str) -> Self {
        let strategies: Vec<Arc<dyn AcquisitionStrategy>> = vec![
            Arc::new(PlatformTranscriptStrategy::new(
                http,
                YOUTUBE_TIMEDTEXT_URL,
                language,
            )),
            Arc::new(DownloadExtractStrategy::new(toolkit.clone())),
            Arc::new(FallbackDownloaderStrategy::new(toolkit.clone())),
        ];
        Self::with_strategies(toolkit, strategies)
    }

    pub fn with_strategies(
        toolkit: MediaToolkit,
        youtube_strategies: Vec<Arc<dyn AcquisitionStrategy>>,
    ) -> Self {
        Self {
            toolkit,
            youtube_strategies,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.youtube_strategies.iter().map(|s| s.name()).collect()
    }

    /// Never fails: strategy errors escalate to the next strategy and the
    /// final fallback is description-only content.
    pub async fn acquire(&self, source: &ContentSource) -> Acquisition {
        match source.kind {
            SourceKind::Youtube => self.acquire_remote(source).await,
            SourceKind::VideoFile => self.acquire_local(source).await,
            SourceKind::Document | SourceKind::PlainText => Acquisition {
                content: AcquiredContent::DescriptionOnly,
                metadata: MediaMetadata::default(),
                strategy: None,
            },
        }
    }

    async fn acquire_remote(&self, source: &ContentSource) -> Acquisition {
        let metadata = match self.toolkit.probe_remote(&source.reference).await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("Metadata probe failed for {}: {}", source.reference, e);
                MediaMetadata::default()
            }
        };

        for strategy in &self.youtube_strategies {
            match strategy.acquire(source).await {
                Ok(content) => {
                    log::info!(
                        "Acquired content for {} via {}",
                        source.reference,
                        strategy.name()
                    );
                    return Acquisition {
                        content,
                        metadata,
                        strategy: Some(strategy.name()),
                    };
                }
                Err(e) => log::warn!(
                    "Acquisition strategy {} failed for {}: {}",
                    strategy.name(),
                    source.reference,
                    e
                ),
            }
        }

        log::warn!(
            "All acquisition strategies failed for {}; using title and description only (confidence {})",
            source.reference,
            DESCRIPTION_ONLY_CONFIDENCE
        );
        Acquisition {
            content: AcquiredContent::DescriptionOnly,
            metadata,
            strategy: None,
        }
    }

    async fn acquire_local(&self, source: &ContentSource) -> Acquisition {
        let video_path = Path::new(&source.reference);
        let metadata = self
            .toolkit
            .probe_local(video_path)
            .await
            .unwrap_or_default();

        let audio_path = match self.toolkit.scratch_path("wav").await {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Cannot prepare scratch audio for {}: {}", source.reference, e);
                return Acquisition {
                    content: AcquiredContent::DescriptionOnly,
                    metadata,
                    strategy: None,
                };
            }
        };

        let extracted = if self.toolkit.is_available(&self.toolkit.ffmpeg_bin).await {
            self.toolkit.extract_audio(video_path, &audio_path).await
        } else {
            Err(AppError::AcquisitionFailed {
                strategy: "extract_audio".to_string(),
                reason: format!("{} is not available", self.toolkit.ffmpeg_bin),
            })
        };

        match extracted {
            Ok(()) => Acquisition {
                content: AcquiredContent::Audio(AudioArtifact::temporary(audio_path)),
                metadata,
                strategy: Some("local_extract"),
            },
            Err(e) => {
                log::warn!(
                    "Audio extraction unavailable for {} ({}); using placeholder audio",
                    source.reference,
                    e
                );
                match tokio::fs::File::create(&audio_path).await {
                    Ok(_) => Acquisition {
                        content: AcquiredContent::Audio(AudioArtifact::temporary(audio_path)),
                        metadata,
                        strategy: Some("placeholder"),
                    },
                    Err(io_err) => {
                        log::warn!("Cannot create placeholder audio: {}", io_err);
                        Acquisition {
                            content: AcquiredContent::DescriptionOnly,
                            metadata,
                            strategy: None,
                        }
                    }
                }
            }
        }
    }
}
