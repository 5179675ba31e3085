pub mod agent;
pub mod models;
pub mod console;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;

use agent::{ ChatAgent, ChatSession };
use cli::Args;
use config::prompt::load_system_instruction;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let params = args.sampling_params()?;

    info!("--- Core Configuration ---");
    info!("LLM Type: {}", args.llm_type);
    info!("Base URL: {}", args.base_url.as_deref().unwrap_or("adapter default"));
    info!("Model: {}", args.model.as_deref().unwrap_or("adapter default"));
    info!("Max New Tokens: {}", params.max_new_tokens);
    info!("Temperature: {}", params.temperature);
    info!("Top-p: {}", params.top_p);
    info!("Repetition Penalty: {}", params.repetition_penalty);
    if let Some(path) = &args.system_instruction_path {
        info!("System Instruction Path: {}", path);
    }
    info!("-------------------------");

    let system_instruction = match &args.system_instruction_path {
        Some(path) => Some(load_system_instruction(path)?),
        None => None,
    };

    let agent = ChatAgent::new(args.llm_config(), system_instruction);
    let mut session = ChatSession::new(params);

    console::run_terminal(&agent, &mut session).await?;

    Ok(())
}
