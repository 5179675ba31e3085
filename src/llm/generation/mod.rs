pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use reqwest::Client as HttpClient;
use thiserror::Error;

use super::{ GenerationRequest, LlmConfig, LlmType };
use self::ollama::OllamaGenerator;
use self::openai::OpenAICompletionClient;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request to generation backend failed: {0}")] Http(#[from] reqwest::Error),
    #[error("Generation backend returned {status}: {body}")] Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Generation backend returned no completion")]
    EmptyCompletion,
    #[error("Invalid generation config: {0}")] InvalidConfig(String),
}

/// A plain text-completion backend.
///
/// `generate` returns the prompt followed by the continuation, so callers can
/// treat every backend as echoing its input.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One-time warm-up, called before the first `generate`.
    async fn load(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub(crate) fn build_http_client(config: &LlmConfig) -> Result<HttpClient, GenerationError> {
    let mut builder = HttpClient::builder().connect_timeout(Duration::from_secs(10));
    if let Some(secs) = config.request_timeout_secs.filter(|s| *s > 0) {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

pub(crate) async fn error_for_status(
    resp: reqwest::Response
) -> Result<reqwest::Response, GenerationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let client: Arc<dyn TextGenerator> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaGenerator::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAICompletionClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
