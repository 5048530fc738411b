use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

pub const OPTION_COUNT: usize = 4;

/// A validated multiple-choice question. Exactly four options and an index in `0..4`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssessmentQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: u8,
    #[serde(default)]
    pub explanation: String,
}

impl AssessmentQuestion {
    pub fn new(
        question: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_index: u8,
        explanation: impl Into<String>,
    ) -> AppResult<Self> {
        let question = AssessmentQuestion {
            question: question.into().trim().to_string(),
            options: options.map(|o| o.trim().to_string()),
            correct_index,
            explanation: explanation.into().trim().to_string(),
        };
        if !question.is_valid() {
            return Err(AppError::ValidationError(format!(
                "Question '{}' needs text, four non-empty options and an index below {}",
                question.question, OPTION_COUNT
            )));
        }
        Ok(question)
    }

    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.iter().all(|o| !o.trim().is_empty())
            && (self.correct_index as usize) < OPTION_COUNT
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index as usize % OPTION_COUNT]
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Assessment {
    pub course_id: String,
    pub questions: Vec<AssessmentQuestion>,
    pub requested_count: usize,
    pub generated_at: DateTime<Utc>,
    /// Set when the templated question bank produced the questions.
    pub used_fallback: bool,
    pub content_confidence: f64,
}

impl Assessment {
    pub fn new(
        course_id: &str,
        questions: Vec<AssessmentQuestion>,
        requested_count: usize,
        used_fallback: bool,
        content_confidence: f64,
    ) -> Self {
        Assessment {
            course_id: course_id.to_string(),
            questions,
            requested_count,
            generated_at: Utc::now(),
            used_fallback,
            content_confidence,
        }
    }
}

/// Stored row: one document per question, four fixed option columns.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssessmentQuestionRecord {
    pub id: String,
    pub course_id: String,
    pub position: i32,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_index: i32,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl AssessmentQuestionRecord {
    pub fn from_question(course_id: &str, position: usize, question: &AssessmentQuestion) -> Self {
        let [a, b, c, d] = question.options.clone();
        AssessmentQuestionRecord {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            position: position as i32,
            question: question.question.clone(),
            option_a: a,
            option_b: b,
            option_c: c,
            option_d: d,
            correct_index: question.correct_index as i32,
            explanation: question.explanation.clone(),
            created_at: Utc::now(),
        }
    }
}

impl TryFrom<AssessmentQuestionRecord> for AssessmentQuestion {
    type Error = AppError;

    fn try_from(record: AssessmentQuestionRecord) -> Result<Self, Self::Error> {
        let index = u8::try_from(record.correct_index).map_err(|_| {
            AppError::DatabaseError(format!(
                "Stored question {} has invalid correct_index {}",
                record.id, record.correct_index
            ))
        })?;
        AssessmentQuestion::new(
            record.question,
            [record.option_a, record.option_b, record.option_c, record.option_d],
            index,
            record.explanation,
        )
        .map_err(|e| AppError::DatabaseError(format!("Stored question {} is corrupt: {}", record.id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: [&str; 4]) -> [String; 4] {
        values.map(|v| v.to_string())
    }

    #[test]
    fn new_question_trims_and_validates() {
        let question = AssessmentQuestion::new(
            "  What is PPE?  ",
            options([" Gear ", "Food", "Tools", "Forms"]),
            0,
            " Personal protective equipment ",
        )
        .expect("question should be valid");

        assert_eq!(question.question, "What is PPE?");
        assert_eq!(question.options[0], "Gear");
        assert_eq!(question.correct_option(), "Gear");
        assert_eq!(question.explanation, "Personal protective equipment");
    }

    #[test]
    fn new_question_rejects_blank_option_and_bad_index() {
        let blank = AssessmentQuestion::new("Q?", options(["a", " ", "c", "d"]), 1, "");
        assert!(matches!(blank, Err(AppError::ValidationError(_))));

        let out_of_range = AssessmentQuestion::new("Q?", options(["a", "b", "c", "d"]), 4, "");
        assert!(matches!(out_of_range, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn record_round_trips_into_question() {
        let question =
            AssessmentQuestion::new("Q?", options(["a", "b", "c", "d"]), 3, "because").unwrap();
        let record = AssessmentQuestionRecord::from_question("course-1", 2, &question);

        assert_eq!(record.position, 2);
        assert_eq!(record.option_d, "d");
        assert_eq!(record.correct_index, 3);

        let back = AssessmentQuestion::try_from(record).expect("record should convert");
        assert_eq!(back, question);
    }

    #[test]
    fn corrupt_record_is_a_database_error() {
        let question =
            AssessmentQuestion::new("Q?", options(["a", "b", "c", "d"]), 0, "").unwrap();
        let mut record = AssessmentQuestionRecord::from_question("course-1", 0, &question);
        record.correct_index = -1;

        assert!(matches!(
            AssessmentQuestion::try_from(record),
            Err(AppError::DatabaseError(_))
        ));
    }
}
