pub mod generation;
use std::str::FromStr;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmType {
    Ollama,
    OpenAI,
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmType::Ollama => write!(f, "ollama"),
            LlmType::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}
impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(LlmType::Ollama),
            "openai" => Ok(LlmType::OpenAI),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Ollama,
            api_key: None,
            completion_model: None,
            base_url: None,
            request_timeout_secs: None,
        }
    }
}

pub const MAX_NEW_TOKENS_RANGE: (u32, u32) = (20, 300);
pub const TEMPERATURE_RANGE: (f32, f32) = (0.1, 1.0);
pub const TOP_P_RANGE: (f32, f32) = (0.1, 1.0);
pub const REPETITION_PENALTY_RANGE: (f32, f32) = (1.0, 2.0);

#[derive(Debug, Error, PartialEq)]
pub enum SamplingError {
    #[error("{name} must be between {min} and {max}, got {value}")] OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("Unknown sampling parameter '{0}'")] UnknownParameter(String),
    #[error("Invalid value '{value}' for {name}")] InvalidValue {
        name: String,
        value: String,
    },
}

/// Sampling knobs sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 120,
            temperature: 0.5,
            top_p: 0.9,
            repetition_penalty: 1.15,
        }
    }
}

fn check_range<T: PartialOrd + fmt::Display>(
    name: &'static str,
    value: T,
    (min, max): (T, T)
) -> Result<(), SamplingError> {
    // NaN must fail this check.
    if !(value >= min && value <= max) {
        return Err(SamplingError::OutOfRange {
            name,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

impl SamplingParams {
    pub fn validate(&self) -> Result<(), SamplingError> {
        check_range("max_new_tokens", self.max_new_tokens, MAX_NEW_TOKENS_RANGE)?;
        check_range("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check_range("top_p", self.top_p, TOP_P_RANGE)?;
        check_range("repetition_penalty", self.repetition_penalty, REPETITION_PENALTY_RANGE)?;
        Ok(())
    }

    /// Updates one parameter by name. On error `self` is left unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), SamplingError> {
        let invalid = || SamplingError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let mut updated = *self;
        match name.to_lowercase().replace('-', "_").as_str() {
            "max_new_tokens" => {
                updated.max_new_tokens = value.parse().map_err(|_| invalid())?;
            }
            "temperature" => {
                updated.temperature = value.parse().map_err(|_| invalid())?;
            }
            "top_p" => {
                updated.top_p = value.parse().map_err(|_| invalid())?;
            }
            "repetition_penalty" => {
                updated.repetition_penalty = value.parse().map_err(|_| invalid())?;
            }
            _ => {
                return Err(SamplingError::UnknownParameter(name.to_string()));
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

impl fmt::Display for SamplingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "max_new_tokens     = {}", self.max_new_tokens)?;
        writeln!(f, "temperature        = {}", self.temperature)?;
        writeln!(f, "top_p              = {}", self.top_p)?;
        write!(f, "repetition_penalty = {}", self.repetition_penalty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub params: SamplingParams,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, params: SamplingParams) -> Self {
        Self { prompt: prompt.into(), params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_llm_type_case_insensitively() {
        assert_eq!("Ollama".parse::<LlmType>(), Ok(LlmType::Ollama));
        assert_eq!("OPENAI".parse::<LlmType>(), Ok(LlmType::OpenAI));
        assert!("gemini".parse::<LlmType>().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SamplingParams::default().validate().is_ok());
    }

    #[test]
    fn set_updates_named_parameter() {
        let mut params = SamplingParams::default();
        params.set("temperature", "0.7").unwrap();
        params.set("max-new-tokens", "200").unwrap();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_new_tokens, 200);
    }

    #[test]
    fn out_of_range_value_is_rejected_and_not_applied() {
        let mut params = SamplingParams::default();
        let err = params.set("repetition_penalty", "0.5").unwrap_err();
        assert!(matches!(err, SamplingError::OutOfRange { name: "repetition_penalty", .. }));
        assert_eq!(params, SamplingParams::default());
    }

    #[test]
    fn bad_name_or_value_is_rejected() {
        let mut params = SamplingParams::default();
        assert_eq!(
            params.set("top_k", "5"),
            Err(SamplingError::UnknownParameter("top_k".to_string()))
        );
        assert!(matches!(params.set("top_p", "lots"), Err(SamplingError::InvalidValue { .. })));
    }
}
