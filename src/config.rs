use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::services::course_lock::RegenerationPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub courses_collection: String,
    pub assessment_questions_collection: String,
    pub mongo_use_transactions: bool,
    pub mongo_max_pool_size: u32,
    pub mongo_min_pool_size: u32,
    pub mongo_connect_timeout_secs: u64,
    pub db_retry_attempts: u32,
    pub db_retry_base_delay_ms: u64,

    pub openai_api_key: Option<SecretString>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub generation_temperature: f32,
    pub generation_max_tokens: u32,
    pub generation_timeout_secs: u64,

    pub assemblyai_api_key: Option<SecretString>,
    pub assemblyai_api_base: String,
    pub transcription_language: String,
    pub transcription_poll_interval_ms: u64,
    pub transcription_max_polls: u32,

    pub media_work_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub ytdlp_bin: String,
    pub fallback_downloader_bin: String,

    pub regeneration_policy: RegenerationPolicy,
}

fn secret_var(name: &str) -> Option<SecretString> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "training-portal".to_string()),
            courses_collection: env::var("COURSES_COLLECTION")
                .unwrap_or_else(|_| "courses".to_string()),
            assessment_questions_collection: env::var("ASSESSMENT_QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "assessment_questions".to_string()),
            mongo_use_transactions: parsed_var("MONGO_USE_TRANSACTIONS", false),
            mongo_max_pool_size: parsed_var("MONGO_MAX_POOL_SIZE", 10),
            mongo_min_pool_size: parsed_var("MONGO_MIN_POOL_SIZE", 2),
            mongo_connect_timeout_secs: parsed_var("MONGO_CONNECT_TIMEOUT_SECS", 5),
            db_retry_attempts: parsed_var("DB_RETRY_ATTEMPTS", 3),
            db_retry_base_delay_ms: parsed_var("DB_RETRY_BASE_DELAY_MS", 200),

            openai_api_key: secret_var("OPENAI_API_KEY"),
            openai_api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            generation_temperature: parsed_var("GENERATION_TEMPERATURE", 0.7),
            generation_max_tokens: parsed_var("GENERATION_MAX_TOKENS", 2000),
            generation_timeout_secs: parsed_var("GENERATION_TIMEOUT_SECS", 120),

            assemblyai_api_key: secret_var("ASSEMBLYAI_API_KEY"),
            assemblyai_api_base: env::var("ASSEMBLYAI_API_BASE")
                .unwrap_or_else(|_| "https://api.assemblyai.com/v2".to_string()),
            transcription_language: env::var("TRANSCRIPTION_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            transcription_poll_interval_ms: parsed_var("TRANSCRIPTION_POLL_INTERVAL_MS", 1000),
            transcription_max_polls: parsed_var("TRANSCRIPTION_MAX_POLLS", 60),

            media_work_dir: env::var("MEDIA_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("course-assessment")),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_bin: env::var("FFPROBE_BIN").unwrap_or_else(|_| "ffprobe".to_string()),
            ytdlp_bin: env::var("YTDLP_BIN").unwrap_or_else(|_| "yt-dlp".to_string()),
            fallback_downloader_bin: env::var("FALLBACK_DOWNLOADER_BIN")
                .unwrap_or_else(|_| "youtube-dl".to_string()),

            regeneration_policy: env::var("REGENERATION_POLICY")
                .ok()
                .and_then(|p| RegenerationPolicy::parse(&p))
                .unwrap_or_default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.transcription_poll_interval_ms)
    }

    pub fn mongo_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.mongo_connect_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Logs which external providers are configured. Missing credentials are
    /// never fatal; the matching degraded path is used per call instead.
    pub fn log_provider_status(&self) {
        if self.openai_api_key.is_none() {
            log::warn!(
                "OPENAI_API_KEY is not set; assessment generation will fail unless content is too thin and templated questions apply"
            );
        } else {
            log::info!("Generative text provider configured (model {})", self.openai_model);
        }

        if self.assemblyai_api_key.is_none() {
            log::warn!("ASSEMBLYAI_API_KEY is not set; video transcription will be simulated");
        } else {
            log::info!(
                "Transcription provider configured (language hint '{}')",
                self.transcription_language
            );
        }

        log::info!(
            "Concurrent regeneration policy: {:?}, transactions: {}",
            self.regeneration_policy,
            self.mongo_use_transactions
        );
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "training-portal-test".to_string(),
            courses_collection: "courses".to_string(),
            assessment_questions_collection: "assessment_questions".to_string(),
            mongo_use_transactions: false,
            mongo_max_pool_size: 4,
            mongo_min_pool_size: 1,
            mongo_connect_timeout_secs: 1,
            db_retry_attempts: 3,
            db_retry_base_delay_ms: 1,
            openai_api_key: None,
            openai_api_base: "http://127.0.0.1:9".to_string(),
            openai_model: "test-model".to_string(),
            generation_temperature: 0.7,
            generation_max_tokens: 2000,
            generation_timeout_secs: 5,
            assemblyai_api_key: None,
            assemblyai_api_base: "http://127.0.0.1:9".to_string(),
            transcription_language: "en".to_string(),
            transcription_poll_interval_ms: 1,
            transcription_max_polls: 60,
            media_work_dir: env::temp_dir().join("course-assessment-test"),
            ffmpeg_bin: "ffmpeg-not-installed".to_string(),
            ffprobe_bin: "ffprobe-not-installed".to_string(),
            ytdlp_bin: "yt-dlp-not-installed".to_string(),
            fallback_downloader_bin: "youtube-dl-not-installed".to_string(),
            regeneration_policy: RegenerationPolicy::LastWriterWins,
        }
    }
}
