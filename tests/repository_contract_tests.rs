mod common;

use std::sync::Arc;
use std::time::Duration;

use course_assessment::{
    db::retry::RetryPolicy,
    models::domain::{Assessment, AssessmentQuestion, AssessmentQuestionRecord, CourseRef},
    repositories::{AssessmentRepository, CourseRepository},
    services::assessment_service::AssessmentService,
};

use common::{InMemoryAssessmentRepository, InMemoryCourseRepository};

fn make_question(text: &str, correct_index: u8) -> AssessmentQuestion {
    AssessmentQuestion::new(
        text,
        [
            "Report it to your supervisor".to_string(),
            "Ignore it".to_string(),
            "Fix it yourself without telling anyone".to_string(),
            "Post about it online".to_string(),
        ],
        correct_index,
        "Hazards are reported to a supervisor first.",
    )
    .expect("valid question")
}

fn records(course_id: &str, questions: &[AssessmentQuestion]) -> Vec<AssessmentQuestionRecord> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| AssessmentQuestionRecord::from_question(course_id, i, q))
        .collect()
}

#[tokio::test]
async fn record_layout_has_four_fixed_option_columns() {
    let question = make_question("What do you do with a hazard?", 0);
    let record = AssessmentQuestionRecord::from_question("course-1", 3, &question);

    assert_eq!(record.course_id, "course-1");
    assert_eq!(record.position, 3);
    assert_eq!(record.option_a, "Report it to your supervisor");
    assert_eq!(record.option_d, "Post about it online");
    assert_eq!(record.correct_index, 0);

    let value = serde_json::to_value(&record).expect("serialise");
    for column in ["course_id", "question", "option_a", "option_b", "option_c", "option_d", "correct_index"] {
        assert!(value.get(column).is_some(), "missing column {}", column);
    }
    assert!(value.get("options").is_none());

    let back = AssessmentQuestion::try_from(record).expect("convert back");
    assert_eq!(back, question);
}

#[tokio::test]
async fn replace_then_find_returns_exactly_the_written_set_in_order() {
    let repo = InMemoryAssessmentRepository::new();
    let questions = vec![
        make_question("First?", 0),
        make_question("Second?", 1),
        make_question("Third?", 2),
    ];
    let mut written = records("course-1", &questions);
    written.reverse();

    repo.replace_for_course("course-1", written)
        .await
        .expect("replace should work");

    let found = repo.find_by_course("course-1").await.expect("find should work");
    let texts: Vec<&str> = found.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(texts, vec!["First?", "Second?", "Third?"]);
}

#[tokio::test]
async fn replace_never_merges_with_the_prior_set() {
    let repo = InMemoryAssessmentRepository::new();
    repo.replace_for_course(
        "course-1",
        records("course-1", &[make_question("Old A?", 0), make_question("Old B?", 1)]),
    )
    .await
    .expect("first replace");
    repo.replace_for_course("course-2", records("course-2", &[make_question("Other?", 3)]))
        .await
        .expect("other course");

    repo.replace_for_course("course-1", records("course-1", &[make_question("New?", 2)]))
        .await
        .expect("second replace");

    let found = repo.find_by_course("course-1").await.expect("find");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].question, "New?");
    assert_eq!(repo.find_by_course("course-2").await.expect("find").len(), 1);
}

#[tokio::test]
async fn delete_reports_removed_rows_and_empty_replace_clears() {
    let repo = InMemoryAssessmentRepository::new();
    repo.replace_for_course("course-1", records("course-1", &[make_question("Q?", 0)]))
        .await
        .expect("replace");

    assert_eq!(repo.delete_by_course("course-1").await.expect("delete"), 1);
    assert_eq!(repo.delete_by_course("course-1").await.expect("delete again"), 0);

    repo.replace_for_course("course-2", records("course-2", &[make_question("Q?", 0)]))
        .await
        .expect("replace");
    repo.replace_for_course("course-2", Vec::new()).await.expect("empty replace");
    assert!(repo.find_by_course("course-2").await.expect("find").is_empty());
}

#[tokio::test]
async fn writer_round_trips_through_the_repository() {
    let repo = Arc::new(InMemoryAssessmentRepository::new());
    let writer = AssessmentService::new(repo.clone(), RetryPolicy::new(2, Duration::from_millis(1)));
    let questions = vec![make_question("First?", 0), make_question("Second?", 3)];
    let assessment = Assessment::new("course-1", questions.clone(), 2, false, 0.9);

    writer.replace("course-1", &assessment).await.expect("replace");

    assert_eq!(writer.current("course-1").await.expect("current"), questions);
    assert_eq!(repo.row_count("course-1").await, 2);
}

#[tokio::test]
async fn course_repository_returns_known_courses_only() {
    let repo = InMemoryCourseRepository::new(vec![CourseRef::new(
        "course-1",
        "Hazard reporting",
        "How to report hazards.",
        Some("https://youtu.be/dQw4w9WgXcQ"),
    )]);

    let found = repo.find_by_id("course-1").await.expect("find");
    assert_eq!(found.map(|c| c.title), Some("Hazard reporting".to_string()));
    assert!(repo.find_by_id("course-9").await.expect("find").is_none());
}
