pub mod line_editor;

use crate::agent::{ ChatAgent, ChatSession };
use crate::history::format_history_for_display;
use crate::models::command::{ Command, HELP_TEXT };

use log::{ info, warn, error };
use std::error::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use self::line_editor::{ LineEditor, TerminalInput };

pub const BANNER: &str = "\
SWE Chatbot
A simple local chatbot for software engineering questions, backed by a plain
text-completion model. Swap in a small instruction-tuned model for better answers.
Type /help for commands.
";

const INPUT_PROMPT: &str = "Ask me about software engineering... > ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handles one line of input against the session. Shared by the interactive
/// terminal and the plain reader loop.
pub async fn handle_line<W>(
    agent: &ChatAgent,
    session: &mut ChatSession,
    line: &str,
    writer: &mut W
) -> Result<Flow, Box<dyn Error + Send + Sync>>
    where W: AsyncWrite + Unpin
{
    match Command::parse(line) {
        Command::Empty => {}
        Command::Ask { question } => {
            writer.write_all(b"Thinking...\n").await?;
            writer.flush().await?;
            match agent.ask(session, &question).await {
                Ok(answer) => {
                    writer.write_all(format!("Assistant: {}\n\n", answer).as_bytes()).await?;
                }
                Err(e) => {
                    error!("Generation failed: {}", e);
                    writer.write_all(format!("Error: {}\n\n", e).as_bytes()).await?;
                }
            }
        }
        Command::Clear => {
            session.clear();
            info!("Chat history cleared");
            writer.write_all(b"Chat history cleared.\n").await?;
        }
        Command::History => {
            writer.write_all(format_history_for_display(session.transcript()).as_bytes()).await?;
        }
        Command::Settings => {
            writer.write_all(format!("{}\n", session.params()).as_bytes()).await?;
        }
        Command::Set { name, value } => {
            match session.set_param(&name, &value) {
                Ok(()) => {
                    info!("Sampling parameter {} set to {}", name, value);
                    writer.write_all(format!("{} = {}\n", name, value).as_bytes()).await?;
                }
                Err(e) => {
                    warn!("Rejected setting change: {}", e);
                    writer.write_all(format!("Error: {}\n", e).as_bytes()).await?;
                }
            }
        }
        Command::Help => {
            writer.write_all(format!("{}\n", HELP_TEXT).as_bytes()).await?;
        }
        Command::Quit => {
            info!("Session ended by user");
            return Ok(Flow::Quit);
        }
        Command::Unknown { input } => {
            writer.write_all(
                format!("Unknown command '{}'. Type /help for commands.\n", input).as_bytes()
            ).await?;
        }
    }
    writer.flush().await?;
    Ok(Flow::Continue)
}

/// Drives one session from any line source until `/quit` or end of input.
///
/// Every line is handled to completion before the next one is read, so there is
/// never more than one generation in flight. A line that is not valid UTF-8 is
/// reported and skipped.
pub async fn run_console<R, W>(
    agent: &ChatAgent,
    session: &mut ChatSession,
    mut reader: R,
    writer: &mut W
) -> Result<(), Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    writer.write_all(BANNER.as_bytes()).await?;
    let mut buf = Vec::new();

    loop {
        writer.write_all(INPUT_PROMPT.as_bytes()).await?;
        writer.flush().await?;

        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            info!("End of input, closing session");
            writer.write_all(b"\n").await?;
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim_end_matches(['\r', '\n']),
            Err(e) => {
                warn!("Skipping input line that is not valid UTF-8: {}", e);
                writer.write_all(format!("Error: input is not valid UTF-8 ({})\n", e).as_bytes()).await?;
                continue;
            }
        };

        if handle_line(agent, session, line, writer).await? == Flow::Quit {
            break;
        }
    }

    writer.flush().await?;
    Ok(())
}

/// Interactive session on the real terminal, with line editing and history recall.
pub async fn run_terminal(
    agent: &ChatAgent,
    session: &mut ChatSession
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(BANNER.as_bytes()).await?;
    stdout.flush().await?;

    let mut editor = LineEditor::spawn();
    loop {
        match editor.read_line(INPUT_PROMPT).await {
            TerminalInput::Line(line) => {
                if handle_line(agent, session, &line, &mut stdout).await? == Flow::Quit {
                    break;
                }
            }
            TerminalInput::Interrupted => {
                stdout.write_all(b"CTRL-C detected. Type /quit to exit.\n").await?;
                stdout.flush().await?;
            }
            TerminalInput::Eof => {
                info!("End of input, closing session");
                stdout.write_all(b"\n").await?;
                break;
            }
            TerminalInput::Failed(message) => {
                error!("Terminal input failed: {}", message);
                return Err(message.into());
            }
        }
    }

    stdout.flush().await?;
    Ok(())
}
