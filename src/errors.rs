use mongodb::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Transient database error: {0}")]
    TransientDatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Audio acquisition failed ({strategy}): {reason}")]
    AcquisitionFailed { strategy: String, reason: String },

    #[error("Transcription provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Transcription timed out after {polls} polls (job {job_id})")]
    TranscriptionTimeout { job_id: String, polls: u32 },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Malformed generation output: {0}")]
    MalformedGenerationOutput(String),

    #[error("Assessment regeneration already in progress for course {0}")]
    RegenerationInProgress(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::TransientDatabaseError(_) => "TRANSIENT_DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::AcquisitionFailed { .. } => "ACQUISITION_FAILED",
            AppError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            AppError::TranscriptionTimeout { .. } => "TRANSCRIPTION_TIMEOUT",
            AppError::TranscriptionFailed(_) => "TRANSCRIPTION_FAILED",
            AppError::GenerationFailed(_) => "GENERATION_FAILED",
            AppError::MalformedGenerationOutput(_) => "MALFORMED_GENERATION_OUTPUT",
            AppError::RegenerationInProgress(_) => "REGENERATION_IN_PROGRESS",
        }
    }

    /// Pipeline stage an error belongs to, reported alongside the reason string.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::NotFound(_) | AppError::ValidationError(_) => "request",
            AppError::DatabaseError(_) | AppError::TransientDatabaseError(_) => "persistence",
            AppError::InternalError(_) => "internal",
            AppError::AcquisitionFailed { .. } => "acquisition",
            AppError::ProviderUnavailable(_)
            | AppError::TranscriptionTimeout { .. }
            | AppError::TranscriptionFailed(_) => "transcription",
            AppError::GenerationFailed(_) => "generation",
            AppError::MalformedGenerationOutput(_) => "extraction",
            AppError::RegenerationInProgress(_) => "scheduling",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::TransientDatabaseError(_))
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            stage: self.stage().to_string(),
            code: self.error_code().to_string(),
            reason: self.to_string(),
        }
    }
}

/// Caller-facing summary of a surfaced pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub stage: String,
    pub code: String,
    pub reason: String,
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        let transient = err.contains_label("TransientTransactionError")
            || err.contains_label("RetryableWriteError")
            || matches!(
                *err.kind,
                ErrorKind::Io(_)
                    | ErrorKind::ServerSelection { .. }
                    | ErrorKind::ConnectionPoolCleared { .. }
            );
        if transient {
            AppError::TransientDatabaseError(err.to_string())
        } else {
            AppError::DatabaseError(err.to_string())
        }
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON error: {}", err))
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("IO error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
