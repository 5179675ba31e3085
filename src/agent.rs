use crate::config::prompt::{ build_conversation_prompt, extract_answer, SYSTEM_INSTRUCTION };
use crate::history::Transcript;
use crate::llm::generation::{ new_client, GenerationError, TextGenerator };
use crate::llm::{ GenerationRequest, LlmConfig, SamplingError, SamplingParams };

use log::{ debug, info };
use std::sync::Arc;
use tokio::sync::OnceCell;

type GeneratorFactory = Box<dyn Fn() -> Result<Arc<dyn TextGenerator>, GenerationError> + Send + Sync>;

/// State owned by one interactive session: the transcript and the sampling
/// settings the user has chosen. Dropped when the session ends.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Transcript,
    params: SamplingParams,
}

impl ChatSession {
    pub fn new(params: SamplingParams) -> Self {
        Self { transcript: Transcript::new(), params }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    pub fn set_param(&mut self, name: &str, value: &str) -> Result<(), SamplingError> {
        self.params.set(name, value)
    }
}

/// Owns the generation backend for the life of the process.
///
/// The backend is built and warmed up on the first question and reused after that.
pub struct ChatAgent {
    factory: GeneratorFactory,
    generator: OnceCell<Arc<dyn TextGenerator>>,
    system_instruction: String,
}

impl ChatAgent {
    pub fn new(config: LlmConfig, system_instruction: Option<String>) -> Self {
        info!(
            "Generation backend configured: Type={}, Model={:?}, BaseURL={:?}",
            config.llm_type,
            config.completion_model.as_deref().unwrap_or("adapter default"),
            config.base_url.as_deref().unwrap_or("adapter default")
        );
        Self::with_factory(move || new_client(&config), system_instruction)
    }

    pub fn with_factory<F>(factory: F, system_instruction: Option<String>) -> Self
        where F: Fn() -> Result<Arc<dyn TextGenerator>, GenerationError> + Send + Sync + 'static
    {
        Self {
            factory: Box::new(factory),
            generator: OnceCell::new(),
            system_instruction: system_instruction.unwrap_or_else(|| SYSTEM_INSTRUCTION.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.generator.initialized()
    }

    async fn generator(&self) -> Result<&Arc<dyn TextGenerator>, GenerationError> {
        self.generator.get_or_try_init(|| async {
            let generator = (self.factory)()?;
            generator.load().await?;
            info!(
                "Using model '{}' at {}",
                generator.get_model(),
                generator.get_base_url()
            );
            Ok::<_, GenerationError>(generator)
        }).await
    }

    /// Runs one exchange. The turn is recorded only when generation succeeds.
    pub async fn ask(
        &self,
        session: &mut ChatSession,
        question: &str
    ) -> Result<String, GenerationError> {
        let generator = self.generator().await?;

        let prompt = build_conversation_prompt(
            &self.system_instruction,
            session.transcript.all(),
            question
        );
        debug!("Prompt for turn {}:\n{}", session.transcript.len() + 1, prompt);

        let request = GenerationRequest::new(prompt, session.params);
        let generated = generator.generate(&request).await?;
        let answer = extract_answer(&generated);
        debug!("Extracted answer ({} chars)", answer.len());

        session.transcript.append(question, answer.clone());
        Ok(answer)
    }
}
