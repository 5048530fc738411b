pub mod assessment_repository;
pub mod course_repository;

pub use assessment_repository::{AssessmentRepository, MongoAssessmentRepository};
pub use course_repository::{CourseRepository, MongoCourseRepository};
