use crate::models::chat::Turn;

/// In-memory chat history for one session.
///
/// Turns are only ever appended or dropped all at once by [`Transcript::clear`];
/// there is no way to edit a stored turn.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn::new(question, answer));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the transcript the way the console shows it back to the user.
pub fn format_history_for_display(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return String::from("(no messages yet)\n");
    }
    let mut result = String::new();
    for turn in transcript {
        result.push_str(&format!("You: {}\n", turn.question()));
        result.push_str(&format!("Assistant: {}\n\n", turn.answer()));
    }
    result
}
