use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::errors::AppError;
use crate::models::domain::assessment::{AssessmentQuestion, OPTION_COUNT};

/// One element of the JSON array the generative service is asked to return.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestionDto {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(equal = 4), custom(function = "validate_options"))]
    pub options: Vec<String>,
    /// Zero-based index of the correct option.
    #[validate(range(min = 0, max = 3))]
    pub correct_index: i64,
    #[serde(default)]
    pub explanation: String,
}

fn validate_options(options: &Vec<String>) -> Result<(), ValidationError> {
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(ValidationError::new("empty_option"));
    }
    Ok(())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_index(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl GeneratedQuestionDto {
    /// Normalises one loosely-typed element: trims text, coerces the index
    /// (0 when it cannot be read). Returns `None` when the element is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let question = object
            .get("question")
            .and_then(text_of)
            .unwrap_or_default();
        let options = object
            .get("options")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(|v| text_of(v).unwrap_or_default()).collect())
            .unwrap_or_default();
        let correct_index = coerce_index(
            object
                .get("correctIndex")
                .or_else(|| object.get("correct_index"))
                .or_else(|| object.get("correctAnswer")),
        );
        let explanation = object
            .get("explanation")
            .and_then(text_of)
            .unwrap_or_default();

        Some(GeneratedQuestionDto {
            question,
            options,
            correct_index,
            explanation,
        })
    }
}

impl TryFrom<GeneratedQuestionDto> for AssessmentQuestion {
    type Error = AppError;

    fn try_from(dto: GeneratedQuestionDto) -> Result<Self, Self::Error> {
        dto.validate()?;
        let options: [String; OPTION_COUNT] = dto.options.try_into().map_err(|_| {
            AppError::ValidationError("exactly four options are required".to_string())
        })?;
        let index = u8::try_from(dto.correct_index)
            .map_err(|_| AppError::ValidationError("correctIndex out of range".to_string()))?;
        AssessmentQuestion::new(dto.question, options, index, dto.explanation)
    }
}
