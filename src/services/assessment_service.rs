use std::sync::Arc;

use crate::{
    db::retry::{with_backoff, RetryPolicy},
    errors::AppResult,
    models::domain::{Assessment, AssessmentQuestion, AssessmentQuestionRecord},
    repositories::AssessmentRepository,
};

/// Writes the current assessment of a course, replacing any previous one.
pub struct AssessmentService {
    repository: Arc<dyn AssessmentRepository>,
    retry: RetryPolicy,
}

impl AssessmentService {
    pub fn new(repository: Arc<dyn AssessmentRepository>, retry: RetryPolicy) -> Self {
        Self { repository, retry }
    }

    pub async fn replace(&self, course_id: &str, assessment: &Assessment) -> AppResult<()> {
        let records: Vec<AssessmentQuestionRecord> = assessment
            .questions
            .iter()
            .enumerate()
            .map(|(position, question)| {
                AssessmentQuestionRecord::from_question(course_id, position, question)
            })
            .collect();
        let count = records.len();

        with_backoff(self.retry, "replace assessment", || {
            self.repository.replace_for_course(course_id, records.clone())
        })
        .await?;

        log::info!("Stored {} assessment questions for course {}", count, course_id);
        Ok(())
    }

    pub async fn current(&self, course_id: &str) -> AppResult<Vec<AssessmentQuestion>> {
        let records = with_backoff(self.retry, "load assessment", || {
            self.repository.find_by_course(course_id)
        })
        .await?;

        records.into_iter().map(AssessmentQuestion::try_from).collect()
    }

    pub async fn clear(&self, course_id: &str) -> AppResult<u64> {
        let deleted = with_backoff(self.retry, "clear assessment", || {
            self.repository.delete_by_course(course_id)
        })
        .await?;
        log::info!("Removed {} assessment questions for course {}", deleted, course_id);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::test_utils::{sample_question, InMemoryAssessmentRepository};
    use std::time::Duration;

    fn service(repository: Arc<InMemoryAssessmentRepository>) -> AssessmentService {
        AssessmentService::new(repository, RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn replace_then_read_round_trips() {
        let repository = Arc::new(InMemoryAssessmentRepository::default());
        let service = service(Arc::clone(&repository));
        let questions = vec![sample_question("First?", 0), sample_question("Second?", 3)];
        let assessment = Assessment::new("course-1", questions.clone(), 2, false, 0.9);

        service.replace("course-1", &assessment).await.expect("replace");

        assert_eq!(service.current("course-1").await.expect("read"), questions);
    }

    #[tokio::test]
    async fn replace_discards_the_previous_assessment() {
        let repository = Arc::new(InMemoryAssessmentRepository::default());
        let service = service(Arc::clone(&repository));

        let old = Assessment::new(
            "course-1",
            vec![sample_question("Old one?", 1), sample_question("Old two?", 2)],
            2,
            false,
            0.9,
        );
        service.replace("course-1", &old).await.expect("replace");

        let new_questions = vec![sample_question("New?", 0)];
        let new = Assessment::new("course-1", new_questions.clone(), 1, false, 0.9);
        service.replace("course-1", &new).await.expect("replace");

        assert_eq!(service.current("course-1").await.expect("read"), new_questions);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let repository = Arc::new(InMemoryAssessmentRepository::failing_first(2));
        let service = service(Arc::clone(&repository));
        let assessment = Assessment::new("course-1", vec![sample_question("Q?", 0)], 1, false, 1.0);

        service.replace("course-1", &assessment).await.expect("third attempt");
        assert_eq!(repository.replace_calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_a_persistence_error() {
        let repository = Arc::new(InMemoryAssessmentRepository::failing_first(10));
        let service = service(Arc::clone(&repository));
        let assessment = Assessment::new("course-1", vec![sample_question("Q?", 0)], 1, false, 1.0);

        let err = service.replace("course-1", &assessment).await.expect_err("gives up");
        assert!(matches!(err, AppError::TransientDatabaseError(_)));
        assert_eq!(err.stage(), "persistence");
        assert!(service.current("course-1").await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn clear_removes_only_that_course() {
        let repository = Arc::new(InMemoryAssessmentRepository::default());
        let service = service(Arc::clone(&repository));
        for id in ["course-1", "course-2"] {
            let assessment = Assessment::new(id, vec![sample_question("Q?", 0)], 1, false, 1.0);
            service.replace(id, &assessment).await.expect("replace");
        }

        assert_eq!(service.clear("course-1").await.expect("clear"), 1);
        assert!(service.current("course-1").await.expect("read").is_empty());
        assert_eq!(service.current("course-2").await.expect("read").len(), 1);
    }
}
