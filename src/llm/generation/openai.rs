use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ build_http_client, error_for_status, GenerationError, TextGenerator };
use crate::llm::{ GenerationRequest, LlmConfig, LlmType };

pub const DEFAULT_OPENAI_URL: &str = "http://localhost:8000";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt2";

/// Client for OpenAI-style `/v1/completions` servers (vLLM, llama.cpp server and friends).
pub struct OpenAICompletionClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
    echo: bool,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl OpenAICompletionClient {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>
    ) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        if config.llm_type != LlmType::OpenAI {
            return Err(
                GenerationError::InvalidConfig("Invalid config type for OpenAICompletionClient".into())
            );
        }
        let http = build_http_client(config)?;
        Ok(
            Self::new(
                http,
                config.api_key.clone(),
                config.completion_model.clone(),
                config.base_url.clone()
            )
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e|
                GenerationError::InvalidConfig(format!("Invalid API key format: {}", e))
            )?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for OpenAICompletionClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let params = &request.params;
        let req = CompletionRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: params.max_new_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            repetition_penalty: params.repetition_penalty,
            echo: true,
            stream: false,
        };
        debug!("POST {} ({} prompt bytes)", self.endpoint(), request.prompt.len());
        let resp = self.http
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&req)
            .send().await?;
        let data = error_for_status(resp).await?.json::<CompletionResponse>().await?;

        data.choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(GenerationError::EmptyCompletion)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
