use std::time::Instant;

use crate::errors::AppError;

/// Ordered stages of one assessment generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Classification,
    Acquisition,
    Transcription,
    Enrichment,
    Generation,
    Persistence,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Classification,
        PipelineStage::Acquisition,
        PipelineStage::Transcription,
        PipelineStage::Enrichment,
        PipelineStage::Generation,
        PipelineStage::Persistence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Classification => "classification",
            PipelineStage::Acquisition => "acquisition",
            PipelineStage::Transcription => "transcription",
            PipelineStage::Enrichment => "enrichment",
            PipelineStage::Generation => "generation",
            PipelineStage::Persistence => "persistence",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Classification => "Classify the course content reference",
            PipelineStage::Acquisition => "Fetch a platform transcript or an audio track",
            PipelineStage::Transcription => "Turn acquired audio into a transcript",
            PipelineStage::Enrichment => "Build the labelled content block",
            PipelineStage::Generation => "Generate and validate questions",
            PipelineStage::Persistence => "Replace the stored assessment",
        }
    }

    /// 1-based position in `ALL`.
    pub fn position(&self) -> usize {
        Self::ALL
            .iter()
            .position(|stage| stage == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Stage-boundary logging for one run.
pub struct StageProgress {
    course_id: String,
    started: Instant,
    current: Option<PipelineStage>,
}

impl StageProgress {
    pub fn new(course_id: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            started: Instant::now(),
            current: None,
        }
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<PipelineStage> {
        self.current
    }

    pub fn enter(&mut self, stage: PipelineStage) {
        self.current = Some(stage);
        log::info!(
            "[{}/{}] {} for course {}: {}",
            stage.position(),
            PipelineStage::ALL.len(),
            stage,
            self.course_id,
            stage.description()
        );
    }

    pub fn skip(&mut self, stage: PipelineStage, reason: &str) {
        self.current = Some(stage);
        log::info!(
            "[{}/{}] {} skipped for course {}: {}",
            stage.position(),
            PipelineStage::ALL.len(),
            stage,
            self.course_id,
            reason
        );
    }

    /// Logs a surfaced failure and hands the error back for `map_err`.
    pub fn fail(&self, err: AppError) -> AppError {
        log::error!(
            "Assessment generation for course {} failed during {} after {:?} ({}): {}",
            self.course_id,
            self.current.map(|s| s.name()).unwrap_or("setup"),
            self.started.elapsed(),
            err.stage(),
            err
        );
        err
    }

    pub fn finish(&self, question_count: usize) {
        log::info!(
            "Assessment generation for course {} finished with {} questions in {:?}",
            self.course_id,
            question_count,
            self.started.elapsed()
        );
    }
}
