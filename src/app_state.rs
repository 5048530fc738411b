use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::{retry::RetryPolicy, Database},
    errors::{AppError, AppResult},
    repositories::{MongoAssessmentRepository, MongoCourseRepository},
    services::{
        assessment_generator::{AssessmentGenerator, GenerationSettings},
        assessment_service::AssessmentService,
        audio_acquirer::AudioAcquirer,
        course_lock::CourseLocks,
        media_tools::MediaToolkit,
        model_service::OpenAiTextClient,
        pipeline::AssessmentPipeline,
        transcription::TranscriptionEngine,
    },
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AssessmentPipeline>,
    pub assessment_service: Arc<AssessmentService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let assessment_repository = Arc::new(MongoAssessmentRepository::new(
            &db,
            &config.assessment_questions_collection,
            config.mongo_use_transactions,
        ));
        assessment_repository.ensure_indexes().await?;
        let course_repository = Arc::new(MongoCourseRepository::new(&db, &config.courses_collection));

        let retry = RetryPolicy::new(
            config.db_retry_attempts,
            Duration::from_millis(config.db_retry_base_delay_ms),
        );
        let assessment_service = Arc::new(AssessmentService::new(assessment_repository, retry));

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP client: {}", e)))?;

        let toolkit = MediaToolkit::from_config(&config);
        let acquirer = AudioAcquirer::new(toolkit, http.clone(), &config.transcription_language);
        let engine = TranscriptionEngine::from_config(&config, http);
        let generator = AssessmentGenerator::new(
            Arc::new(OpenAiTextClient::from_config(&config)),
            GenerationSettings::from_config(&config),
        );

        log::info!(
            "Acquisition strategies: {}; transcription provider: {}",
            acquirer.strategy_names().join(" -> "),
            engine.provider_id()
        );

        let locks = CourseLocks::new(config.regeneration_policy);
        log::debug!("Course regeneration policy: {:?}", locks.policy());

        let pipeline = Arc::new(AssessmentPipeline::new(
            acquirer,
            engine,
            generator,
            Arc::clone(&assessment_service),
            course_repository,
            locks,
            &config.transcription_language,
        ));

        Ok(Self {
            pipeline,
            assessment_service,
            config: Arc::new(config),
        })
    }
}
