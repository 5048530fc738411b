use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Single-turn text completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeTextClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String>;
}

pub struct OpenAiTextClient {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTextClient {
    pub fn new(api_key: Option<SecretString>, api_base: &str, model: &str) -> Self {
        let client = api_key.map(|key| {
            let config = OpenAIConfig::new()
                .with_api_key(key.expose_secret())
                .with_api_base(api_base);
            Client::with_config(config)
        });
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_api_key.clone(),
            &config.openai_api_base,
            &config.openai_model,
        )
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens
        })
    }

    fn message_content(response: &Value) -> AppResult<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::GenerationFailed("completion response has no message content".to_string())
            })
    }
}

#[async_trait]
impl GenerativeTextClient for OpenAiTextClient {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::GenerationFailed("OPENAI_API_KEY is not configured".to_string())
        })?;

        let response: Value = client
            .chat()
            .create_byot(self.request_body(&request))
            .await
            .map_err(|e| AppError::GenerationFailed(e.to_string()))?;

        log::debug!(
            "Completion finished with reason {}",
            response["choices"][0]["finish_reason"]
        );
        Self::message_content(&response)
    }
}
