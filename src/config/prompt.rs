use std::fs;
use std::path::{ Path, PathBuf };
use log::info;
use thiserror::Error;

use crate::models::chat::Turn;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant for software engineering. \
Answer concisely and give short code examples when useful. \
If unsure, say you are unsure.\n\n";

pub const QUESTION_MARKER: &str = "Question:";
pub const ANSWER_MARKER: &str = "Answer:";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read system instruction file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads a replacement preamble from disk. The file content is used verbatim.
pub fn load_system_instruction<P: AsRef<Path>>(path: P) -> Result<String, PromptError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded system instruction from {} ({} bytes)", path.display(), content.len());
    Ok(content)
}

/// Serialises prior turns plus the new question into one completion prompt.
///
/// Every prior turn becomes `Question: ..\nAnswer: ..\n`, the new question gets an
/// open `Answer:` for the model to continue, and the blocks are joined by newlines.
/// Text is inserted as-is; markers inside user or model text are not escaped.
pub fn build_conversation_prompt(preamble: &str, history: &[Turn], user_question: &str) -> String {
    let mut blocks = Vec::with_capacity(history.len() + 1);
    for turn in history {
        blocks.push(
            format!(
                "{} {}\n{} {}\n",
                QUESTION_MARKER,
                turn.question(),
                ANSWER_MARKER,
                turn.answer()
            )
        );
    }
    blocks.push(format!("{} {}\n{}", QUESTION_MARKER, user_question, ANSWER_MARKER));

    let mut prompt = String::from(preamble);
    prompt.push_str(&blocks.join("\n"));
    prompt
}

/// Pulls the newest answer out of raw generated text.
///
/// Takes whatever follows the last `Answer:` (the whole text when there is none)
/// and cuts it at the first `Question:` so a continued fake dialogue is dropped.
/// An empty answer is returned as an empty string.
pub fn extract_answer(generated: &str) -> String {
    let last_segment = generated.rsplit(ANSWER_MARKER).next().unwrap_or(generated);
    let answer = last_segment.trim();
    match answer.split_once(QUESTION_MARKER) {
        Some((before, _)) => before.trim().to_string(),
        None => answer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_preamble_plus_open_question() {
        let prompt = build_conversation_prompt(SYSTEM_INSTRUCTION, &[], "What is Rust?");
        assert_eq!(prompt, format!("{}Question: What is Rust?\nAnswer:", SYSTEM_INSTRUCTION));
    }

    #[test]
    fn prompt_always_ends_with_open_answer() {
        let history = vec![Turn::new("a", "b"), Turn::new("c", "")];
        let prompt = build_conversation_prompt(SYSTEM_INSTRUCTION, &history, "next one");
        assert!(prompt.ends_with("Question: next one\nAnswer:"));
        assert!(prompt.starts_with(SYSTEM_INSTRUCTION));
    }

    #[test]
    fn prior_turns_are_newline_joined_blocks() {
        let history = vec![Turn::new("What is a mutex?", "A mutual-exclusion lock.")];
        let prompt = build_conversation_prompt(SYSTEM_INSTRUCTION, &history, "And a semaphore?");
        let expected = format!(
            "{}Question: What is a mutex?\nAnswer: A mutual-exclusion lock.\n\nQuestion: And a semaphore?\nAnswer:",
            SYSTEM_INSTRUCTION
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn markers_inside_text_are_not_escaped() {
        let history = vec![Turn::new("q", "see Answer: below")];
        let prompt = build_conversation_prompt("", &history, "x");
        assert_eq!(prompt, "Question: q\nAnswer: see Answer: below\n\nQuestion: x\nAnswer:");
    }

    #[test]
    fn custom_preamble_is_used_verbatim() {
        let prompt = build_conversation_prompt("Be terse.\n", &[], "hi");
        assert_eq!(prompt, "Be terse.\nQuestion: hi\nAnswer:");
    }

    #[test]
    fn extracts_text_after_last_answer() {
        assert_eq!(extract_answer("preamble Question: q\nAnswer: foo"), "foo");
        assert_eq!(extract_answer("Answer: old\nQuestion: q\nAnswer:   new  \n"), "new");
    }

    #[test]
    fn cuts_hallucinated_follow_up_question() {
        assert_eq!(extract_answer("...Answer: foo\nQuestion: bar"), "foo");
        assert_eq!(extract_answer("Answer: foo Question: bar Question: baz"), "foo");
    }

    #[test]
    fn missing_marker_returns_whole_text() {
        assert_eq!(extract_answer("  just some text \n"), "just some text");
    }

    #[test]
    fn empty_answer_is_kept() {
        assert_eq!(extract_answer("Question: q\nAnswer:   "), "");
        assert_eq!(extract_answer("Answer: Question: more"), "");
        assert_eq!(extract_answer(""), "");
    }

    #[test]
    fn load_system_instruction_reads_file_verbatim() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "You answer only in Rust.\n\n").unwrap();

        let preamble = load_system_instruction(file.path()).unwrap();
        assert_eq!(preamble, "You answer only in Rust.\n\n");
        assert!(build_conversation_prompt(&preamble, &[], "q").starts_with(&preamble));
    }

    #[test]
    fn load_system_instruction_reports_missing_file() {
        let err = load_system_instruction("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
