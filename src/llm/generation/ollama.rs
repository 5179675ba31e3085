use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use log::{ debug, info };

use super::{ build_http_client, error_for_status, GenerationError, TextGenerator };
use crate::llm::{ GenerationRequest, LlmConfig, LlmType };

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:0.5b";

#[derive(Debug)]
pub struct OllamaGenerator {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaGenerator {
    pub fn new(
        http: HttpClient,
        base_url: Option<String>,
        completion_model: Option<String>
    ) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.into());

        Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        if config.llm_type != LlmType::Ollama {
            return Err(GenerationError::InvalidConfig("Invalid config type for OllamaGenerator".into()));
        }
        let http = build_http_client(config)?;
        Ok(Self::new(http, config.base_url.clone(), config.completion_model.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    /// An empty prompt makes Ollama load the model into memory without generating.
    async fn load(&self) -> Result<(), GenerationError> {
        info!("Loading model '{}' from {}", self.completion_model, self.base_url);
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt: "",
            raw: true,
            stream: false,
            options: None,
        };
        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        error_for_status(resp).await?;
        info!("Model '{}' ready", self.completion_model);
        Ok(())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let params = &request.params;
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt: &request.prompt,
            // Raw mode keeps Ollama from wrapping the prompt in the model's chat template.
            raw: true,
            stream: false,
            options: Some(GenerateOptions {
                num_predict: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                repeat_penalty: params.repetition_penalty,
            }),
        };
        debug!("POST {} ({} prompt bytes)", self.endpoint(), request.prompt.len());
        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        let data = error_for_status(resp).await?.json::<GenerateResponse>().await?;

        let mut full_text = String::with_capacity(request.prompt.len() + data.response.len());
        full_text.push_str(&request.prompt);
        full_text.push_str(&data.response);
        Ok(full_text)
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let generator = OllamaGenerator::new(HttpClient::new(), None, None);
        assert_eq!(generator.get_model(), DEFAULT_OLLAMA_MODEL);
        assert_eq!(generator.get_base_url(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let generator = OllamaGenerator::new(
            HttpClient::new(),
            Some("http://gpu-box:11434/".into()),
            Some("llama3".into())
        );
        assert_eq!(generator.endpoint(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn rejects_foreign_config() {
        let config = LlmConfig { llm_type: LlmType::OpenAI, ..LlmConfig::default() };
        assert!(matches!(
            OllamaGenerator::from_config(&config),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
