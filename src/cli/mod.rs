use clap::Parser;

use crate::llm::{ LlmConfig, LlmType, SamplingError, SamplingParams, MAX_NEW_TOKENS_RANGE };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Generation Backend Args ---
    /// Type of text-completion backend (ollama, openai)
    #[arg(long, env = "LLM_TYPE", default_value = "ollama")]
    pub llm_type: LlmType,

    /// Base URL for the backend API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "LLM_BASE_URL")] // No default, let adapters handle defaults if None
    pub base_url: Option<String>,

    /// Model name used for completion (e.g., qwen2.5:0.5b for Ollama, gpt2 for a vLLM server)
    #[arg(long, env = "LLM_MODEL")] // No default, rely on adapter defaults if None
    pub model: Option<String>,

    /// API Key for OpenAI-compatible servers that require one
    #[arg(long, env = "LLM_API_KEY", default_value = "")]
    pub api_key: String,

    /// Overall HTTP timeout per generation in seconds. 0 waits indefinitely.
    #[arg(long, env = "LLM_REQUEST_TIMEOUT_SECS", default_value = "0")]
    pub request_timeout_secs: u64,

    // --- Sampling Args ---
    /// Maximum new tokens per answer (20-300)
    #[arg(
        long,
        env = "MAX_NEW_TOKENS",
        default_value = "120",
        value_parser = clap::value_parser!(u32).range(
            (MAX_NEW_TOKENS_RANGE.0 as i64)..=(MAX_NEW_TOKENS_RANGE.1 as i64)
        )
    )]
    pub max_new_tokens: u32,

    /// Creativity / temperature (0.1-1.0)
    #[arg(long, env = "TEMPERATURE", default_value = "0.5")]
    pub temperature: f32,

    /// Top-p sampling (0.1-1.0)
    #[arg(long, env = "TOP_P", default_value = "0.9")]
    pub top_p: f32,

    /// Repetition penalty (1.0-2.0)
    #[arg(long, env = "REPETITION_PENALTY", default_value = "1.15")]
    pub repetition_penalty: f32,

    // --- General App Args ---
    /// Optional path to a text file that replaces the built-in system instruction.
    #[arg(long, env = "SYSTEM_INSTRUCTION_PATH")]
    pub system_instruction_path: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn sampling_params(&self) -> Result<SamplingParams, SamplingError> {
        let params = SamplingParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            llm_type: self.llm_type,
            api_key: Some(self.api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: self.model.clone(),
            base_url: self.base_url.clone(),
            request_timeout_secs: Some(self.request_timeout_secs).filter(|s| *s > 0),
        }
    }
}
