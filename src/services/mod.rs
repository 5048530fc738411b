pub mod assessment_generator;
pub mod assessment_service;
pub mod audio_acquirer;
pub mod content_enricher;
pub mod course_lock;
pub mod media_tools;
pub mod model_service;
pub mod pipeline;
pub mod pipeline_steps;
pub mod prompt_composer;
pub mod source_classifier;
pub mod transcription;
