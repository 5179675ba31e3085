/// A single line of console input, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ask { question: String },
    Clear,
    History,
    Settings,
    Set { name: String, value: String },
    Help,
    Quit,
    Empty,
    Unknown { input: String },
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        if !trimmed.starts_with('/') {
            // Only the line ending is stripped from a question.
            return Command::Ask {
                question: line.trim_end_matches(['\r', '\n']).to_string(),
            };
        }

        // A doubled slash sends the rest, with one slash, as a question.
        if let Some(rest) = trimmed.strip_prefix("//") {
            return Command::Ask {
                question: format!("/{}", rest),
            };
        }

        let mut parts = trimmed.split_whitespace();
        let keyword = parts.next().unwrap_or_default().to_lowercase();
        match keyword.as_str() {
            "/clear" => Command::Clear,
            "/history" => Command::History,
            "/settings" => Command::Settings,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            "/set" => match (parts.next(), parts.next()) {
                (Some(name), Some(value)) => Command::Set {
                    name: name.to_string(),
                    value: value.to_string(),
                },
                _ => Command::Unknown { input: trimmed.to_string() },
            },
            _ => Command::Unknown { input: trimmed.to_string() },
        }
    }
}

pub const HELP_TEXT: &str = "\
Commands:
  /clear               Clear chat history
  /history             Show the conversation so far
  /settings            Show sampling settings
  /set <name> <value>  Change a setting (max_new_tokens, temperature, top_p, repetition_penalty)
  /help                Show this help
  /quit                Exit
Anything else is sent as a question. Start a question with // to begin it with a slash.";
