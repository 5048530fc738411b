pub mod generated_question;

pub use generated_question::GeneratedQuestionDto;
