pub use fakes::*;
pub use fixtures::*;

pub mod fixtures {
    use serde_json::json;

    use crate::models::domain::{AssessmentQuestion, CourseRef, EnrichedContent, SourceKind};

    const TRANSCRIPT_SENTENCE: &str = "Before climbing, inspect the ladder for damage and keep three points of contact while you work. ";

    /// A course with a usable description and no media.
    pub fn plain_course(id: &str) -> CourseRef {
        CourseRef::new(
            id,
            "Ladder safety",
            "How to inspect, position and climb portable ladders safely at work.",
            None,
        )
    }

    pub fn sample_question(text: &str, correct_index: u8) -> AssessmentQuestion {
        AssessmentQuestion::new(
            text,
            [
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            correct_index,
            "Because it is correct.",
        )
        .expect("sample question is valid")
    }

    /// Transcribed video content of exactly `len` characters.
    pub fn transcript_content(len: usize) -> EnrichedContent {
        let substance: String = TRANSCRIPT_SENTENCE.chars().cycle().take(len).collect();
        EnrichedContent {
            text: format!("TITLE: Ladder safety\n\nTRANSCRIPT (confidence 0.90):\n{}", substance),
            content_type: SourceKind::Youtube,
            substance,
            confidence: 0.9,
            fallback: false,
        }
    }

    /// Model-style response: prose around a JSON array of `valid` questions,
    /// plus one three-option element when `with_malformed` is set.
    pub fn generated_json(valid: usize, with_malformed: bool) -> String {
        let mut items: Vec<serde_json::Value> = (0..valid)
            .map(|i| {
                json!({
                    "question": format!("  Ladder question {}?  ", i + 1),
                    "options": ["Three points of contact", "One hand", "No hands", "Jumping"],
                    "correctIndex": i % 4,
                    "explanation": "Three points of contact keeps you stable."
                })
            })
            .collect();
        if with_malformed {
            items.insert(
                1.min(items.len()),
                json!({
                    "question": "Which option is missing?",
                    "options": ["A", "B", "C"],
                    "correctIndex": 0,
                    "explanation": "Only three options."
                }),
            );
        }
        format!(
            "Here are the questions you asked for:\n{}\nLet me know if you need more.",
            serde_json::Value::Array(items)
        )
    }
}

pub mod fakes {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::{
        errors::{AppError, AppResult},
        models::domain::{AssessmentQuestionRecord, CourseRef},
        repositories::{AssessmentRepository, CourseRepository},
    };

    /// Assessment storage in a map; optionally fails the first N replacements
    /// with a transient error.
    #[derive(Default)]
    pub struct InMemoryAssessmentRepository {
        rows: Mutex<HashMap<String, Vec<AssessmentQuestionRecord>>>,
        fail_first: u32,
        replace_calls: AtomicU32,
    }

    impl InMemoryAssessmentRepository {
        pub fn failing_first(fail_first: u32) -> Self {
            Self {
                fail_first,
                ..Self::default()
            }
        }

        pub fn replace_calls(&self) -> u32 {
            self.replace_calls.load(Ordering::SeqCst)
        }

        pub fn stored(&self, course_id: &str) -> Vec<AssessmentQuestionRecord> {
            self.rows
                .lock()
                .unwrap()
                .get(course_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl AssessmentRepository for InMemoryAssessmentRepository {
        async fn replace_for_course(
            &self,
            course_id: &str,
            records: Vec<AssessmentQuestionRecord>,
        ) -> AppResult<()> {
            let call = self.replace_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_first {
                return Err(AppError::TransientDatabaseError(format!(
                    "simulated connection reset on call {}",
                    call
                )));
            }
            self.rows
                .lock()
                .unwrap()
                .insert(course_id.to_string(), records);
            Ok(())
        }

        async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<AssessmentQuestionRecord>> {
            let mut records = self.stored(course_id);
            records.sort_by_key(|r| r.position);
            Ok(records)
        }

        async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .remove(course_id)
                .map(|rows| rows.len() as u64)
                .unwrap_or(0))
        }
    }

    #[derive(Default)]
    pub struct InMemoryCourseRepository {
        courses: HashMap<String, CourseRef>,
    }

    impl InMemoryCourseRepository {
        pub fn with_courses(courses: Vec<CourseRef>) -> Self {
            Self {
                courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
            }
        }
    }

    #[async_trait]
    impl CourseRepository for InMemoryCourseRepository {
        async fn find_by_id(&self, id: &str) -> AppResult<Option<CourseRef>> {
            Ok(self.courses.get(id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assessment_generator::parse_questions;

    #[test]
    fn transcript_fixture_has_requested_length() {
        let content = transcript_content(500);
        assert_eq!(content.substance_len(), 500);
    }

    #[test]
    fn generated_json_contains_one_malformed_element() {
        let raw = generated_json(4, true);
        assert_eq!(parse_questions(&raw).expect("array").len(), 4);
        assert_eq!(parse_questions(&generated_json(2, false)).expect("array").len(), 2);
    }

    #[test]
    fn plain_course_has_no_media() {
        let course = plain_course("c1");
        assert!(course.video_reference.is_none());
        assert!(!course.description.is_empty());
    }
}
