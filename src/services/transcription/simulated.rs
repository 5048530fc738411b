use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        transcription::{Entity, Highlight, Polarity, SentimentRecord, TranscriptWord},
        TranscriptionResult,
    },
    services::media_tools::AudioArtifact,
};

use super::{JobPoll, TranscriptionProvider, TranscriptionRequest};

pub const SIMULATED_CONFIDENCE: f64 = 0.85;
const SECONDS_PER_WORD: f64 = 0.4;

const OPENINGS: [&str; 3] = [
    "Welcome to this training session on {topic}.",
    "In this video we walk through {topic} step by step.",
    "This session introduces the essentials of {topic}.",
];

/// Local stand-in used when no speech-to-text provider can be reached.
/// Output depends only on the request and file name, never on audio bytes.
#[derive(Default)]
pub struct SimulatedTranscriber {
    jobs: Mutex<HashMap<String, TranscriptionResult>>,
}

fn readable(name: &str) -> Option<String> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let words: Vec<&str> = stem
        .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

impl SimulatedTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synthesize(&self, request: &TranscriptionRequest) -> TranscriptionResult {
        let topic = Some(request.title.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| readable(&request.source_name))
            .unwrap_or_else(|| "the course topic".to_string());

        let digest = Sha256::digest(format!("{}|{}", topic, request.description).as_bytes());
        let opening = OPENINGS[digest[0] as usize % OPENINGS.len()].replace("{topic}", &topic);

        let mut sentences = vec![
            opening,
            format!(
                "We start by explaining the key concepts behind {} and why they matter in day-to-day work.",
                topic
            ),
        ];
        let description = request.description.trim();
        if !description.is_empty() {
            sentences.push(format!("As the course summary puts it: {}", description));
        }
        sentences.push(
            "Next we look at practical examples and the most common mistakes to avoid.".to_string(),
        );
        sentences.push(format!(
            "Finally we review best practices and summarise what every team member should remember about {}.",
            topic
        ));

        let text = sentences.join(" ");
        let words = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| TranscriptWord {
                text: w.to_string(),
                start_sec: i as f64 * SECONDS_PER_WORD,
                end_sec: (i + 1) as f64 * SECONDS_PER_WORD,
            })
            .collect();

        let sentiment = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| SentimentRecord {
                text: s.clone(),
                polarity: if i == 0 {
                    Polarity::Positive
                } else {
                    Polarity::Neutral
                },
                confidence: 0.8,
            })
            .collect();

        TranscriptionResult {
            text,
            confidence: SIMULATED_CONFIDENCE,
            words,
            highlights: vec![
                Highlight {
                    text: topic.clone(),
                    weight: 0.9,
                },
                Highlight {
                    text: "key concepts".to_string(),
                    weight: 0.7,
                },
                Highlight {
                    text: "best practices".to_string(),
                    weight: 0.6,
                },
            ],
            entities: vec![
                Entity {
                    text: topic,
                    category: "topic".to_string(),
                },
                Entity {
                    text: "team member".to_string(),
                    category: "occupation".to_string(),
                },
            ],
            sentiment,
        }
    }
}

#[async_trait]
impl TranscriptionProvider for SimulatedTranscriber {
    fn provider_id(&self) -> &'static str {
        "simulated"
    }

    async fn submit(&self, audio: &AudioArtifact, request: &TranscriptionRequest) -> AppResult<String> {
        let result = self.synthesize(request);
        let job_id = format!("simulated-{}", uuid::Uuid::new_v4());
        log::info!(
            "Simulating transcription for {} as job {}",
            audio.path.display(),
            job_id
        );
        self.jobs
            .lock()
            .map_err(|_| AppError::InternalError("simulated job table poisoned".to_string()))?
            .insert(job_id.clone(), result);
        Ok(job_id)
    }

    async fn poll(&self, job_id: &str) -> AppResult<JobPoll> {
        let result = self
            .jobs
            .lock()
            .map_err(|_| AppError::InternalError("simulated job table poisoned".to_string()))?
            .remove(job_id);
        Ok(match result {
            Some(result) => JobPoll::completed(result),
            None => JobPoll::failed(format!("unknown simulated job {}", job_id)),
        })
    }
}
