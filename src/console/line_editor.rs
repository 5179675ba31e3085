use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::mpsc;
use tokio::sync::mpsc as async_mpsc;

/// What the terminal produced for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

impl From<Result<String, ReadlineError>> for TerminalInput {
    fn from(result: Result<String, ReadlineError>) -> Self {
        match result {
            Ok(line) => TerminalInput::Line(line),
            Err(ReadlineError::Interrupted) => TerminalInput::Interrupted,
            Err(ReadlineError::Eof) => TerminalInput::Eof,
            Err(err) => TerminalInput::Failed(err.to_string()),
        }
    }
}

/// A rustyline editor living on a blocking worker thread.
///
/// The editor is created and used only on that thread. Each `read_line` hands it a
/// prompt and waits for the answer, so only one read is ever outstanding.
pub struct LineEditor {
    prompts: mpsc::Sender<String>,
    lines: async_mpsc::Receiver<TerminalInput>,
}

impl LineEditor {
    pub fn spawn() -> Self {
        let (prompt_tx, prompt_rx) = mpsc::channel::<String>();
        let (line_tx, line_rx) = async_mpsc::channel(1);

        tokio::task::spawn_blocking(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => editor,
                Err(err) => {
                    let _ = line_tx.blocking_send(TerminalInput::Failed(err.to_string()));
                    return;
                }
            };
            // Exits once the LineEditor is dropped.
            while let Ok(prompt) = prompt_rx.recv() {
                let input = TerminalInput::from(editor.readline(&prompt));
                if let TerminalInput::Line(line) = &input {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                }
                if line_tx.blocking_send(input).is_err() {
                    break;
                }
            }
            debug!("Line editor thread finished");
        });

        Self::from_channels(prompt_tx, line_rx)
    }

    fn from_channels(
        prompts: mpsc::Sender<String>,
        lines: async_mpsc::Receiver<TerminalInput>
    ) -> Self {
        Self { prompts, lines }
    }

    /// Shows `prompt` and waits for one line. A worker that has gone away reads as end of input.
    pub async fn read_line(&mut self, prompt: &str) -> TerminalInput {
        // A failed send still reads the reply channel: a startup failure may be waiting there.
        let _ = self.prompts.send(prompt.to_string());
        self.lines.recv().await.unwrap_or(TerminalInput::Eof)
    }
}
