//! Confirmation capability for the one destructive step in the crate.

use std::io;

/// Asks an operator to approve an action. Implementations return the raw answer;
/// interpretation is left to [`parse_answer`] so every source is validated the same way.
pub trait Confirm {
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

/// Interpret an answer. Only `Y`/`y` and `N`/`n` are accepted.
pub fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim() {
        "Y" | "y" => Some(true),
        "N" | "n" => Some(false),
        _ => None,
    }
}

/// Always replies with the same answer, for unattended runs and tests.
#[derive(Debug, Clone)]
pub struct FixedAnswer {
    answer: String,
    pub prompts: Vec<String>,
}

impl FixedAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Vec::new(),
        }
    }
}

impl Confirm for FixedAnswer {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answer.clone())
    }
}
