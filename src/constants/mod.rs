pub mod fallback_questions;
pub mod prompts;
