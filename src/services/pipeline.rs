use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Assessment, CourseRef, TranscriptionResult},
    repositories::CourseRepository,
    services::{
        assessment_generator::AssessmentGenerator,
        assessment_service::AssessmentService,
        audio_acquirer::{AcquiredContent, AudioAcquirer},
        content_enricher,
        course_lock::CourseLocks,
        pipeline_steps::{PipelineStage, StageProgress},
        source_classifier,
        transcription::{TranscriptionEngine, TranscriptionRequest},
    },
};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_REQUESTED_QUESTIONS: usize = 20;

/// Course content in, persisted assessment out.
pub struct AssessmentPipeline {
    acquirer: AudioAcquirer,
    engine: TranscriptionEngine,
    generator: AssessmentGenerator,
    writer: Arc<AssessmentService>,
    courses: Arc<dyn CourseRepository>,
    locks: CourseLocks,
    language: String,
}

impl AssessmentPipeline {
    pub fn new(
        acquirer: AudioAcquirer,
        engine: TranscriptionEngine,
        generator: AssessmentGenerator,
        writer: Arc<AssessmentService>,
        courses: Arc<dyn CourseRepository>,
        locks: CourseLocks,
        language: &str,
    ) -> Self {
        Self {
            acquirer,
            engine,
            generator,
            writer,
            courses,
            locks,
            language: language.to_string(),
        }
    }

    pub async fn generate_for_course_id(
        &self,
        course_id: &str,
        requested_count: usize,
    ) -> AppResult<Assessment> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", course_id)))?;
        self.generate_assessment(&course, requested_count).await
    }

    /// Runs every stage in order and replaces the course's stored assessment.
    /// Nothing is written unless generation succeeds.
    pub async fn generate_assessment(
        &self,
        course: &CourseRef,
        requested_count: usize,
    ) -> AppResult<Assessment> {
        if !(1..=MAX_REQUESTED_QUESTIONS).contains(&requested_count) {
            return Err(AppError::ValidationError(format!(
                "requested question count must be between 1 and {}, got {}",
                MAX_REQUESTED_QUESTIONS, requested_count
            )));
        }

        let _guard = self.locks.acquire(&course.id).await?;
        let mut progress = StageProgress::new(&course.id);

        progress.enter(PipelineStage::Classification);
        let source = source_classifier::classify(
            course.video_reference.as_deref(),
            &course.title,
            &course.description,
        );

        progress.enter(PipelineStage::Acquisition);
        let acquisition = self.acquirer.acquire(&source).await;
        log::info!(
            "Course {} {} content acquired via {} (metadata {})",
            course.id,
            source.kind,
            acquisition.strategy.unwrap_or("description only"),
            if acquisition.metadata.is_empty() { "unavailable" } else { "available" }
        );

        let transcript: Option<TranscriptionResult> = match acquisition.content {
            AcquiredContent::Transcript(transcript) => {
                progress.skip(PipelineStage::Transcription, "platform transcript already available");
                Some(transcript)
            }
            AcquiredContent::Audio(audio) => {
                progress.enter(PipelineStage::Transcription);
                let request = TranscriptionRequest::new(
                    &self.language,
                    source.file_name().unwrap_or_default(),
                    &source.title,
                    &source.description,
                );
                match self.engine.transcribe(audio, &request).await {
                    Ok(transcript) => Some(transcript),
                    Err(e) => {
                        log::warn!(
                            "Transcription for course {} did not complete ({}); continuing with title and description only",
                            course.id,
                            e
                        );
                        None
                    }
                }
            }
            AcquiredContent::DescriptionOnly => {
                progress.skip(PipelineStage::Transcription, "no audio to transcribe");
                None
            }
        };

        progress.enter(PipelineStage::Enrichment);
        let enriched = content_enricher::enrich(&source, transcript.as_ref(), &acquisition.metadata);
        if enriched.fallback {
            log::warn!(
                "Course {} uses description-only content (confidence {})",
                course.id,
                enriched.confidence
            );
        }

        progress.enter(PipelineStage::Generation);
        let assessment = self
            .generator
            .generate(
                &course.id,
                &course.title,
                &course.description,
                &enriched,
                requested_count,
            )
            .await
            .map_err(|e| progress.fail(e))?;

        progress.enter(PipelineStage::Persistence);
        self.writer
            .replace(&course.id, &assessment)
            .await
            .map_err(|e| progress.fail(e))?;

        progress.finish(assessment.questions.len());
        Ok(assessment)
    }
}
