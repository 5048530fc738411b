pub mod assessment;
pub mod content_source;
pub mod course;
pub mod enriched_content;
pub mod transcription;
pub use assessment::{Assessment, AssessmentQuestion, AssessmentQuestionRecord};
pub use content_source::{ContentSource, SourceKind};
pub use course::CourseRef;
pub use enriched_content::{EnrichedContent, MediaMetadata};
pub use transcription::TranscriptionResult;
