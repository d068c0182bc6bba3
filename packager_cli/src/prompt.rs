//! Operator confirmations
//!
//! Every yes/no question the packager asks goes through [`Prompt`], so runs
//! without an operator can substitute the default answer.

use crate::terminal;
use dialoguer::Confirm;
use packager_core::Result;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Asks the operator yes/no questions
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Asks on the terminal, or reads an answer line when stdin is piped
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        if terminal::is_interactive() {
            return Confirm::new()
                .with_prompt(question)
                .default(false)
                .interact()
                .map_err(|e| io::Error::other(e).into());
        }

        let mut stderr = io::stderr();
        write!(stderr, "{question} [y/n] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Answers yes to everything; used when user interaction is disabled
#[derive(Debug, Default)]
pub struct NonInteractivePrompt;

impl Prompt for NonInteractivePrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        log::debug!("Answering yes without asking: {question}");
        Ok(true)
    }
}

/// Replays canned answers and records the questions; for tests
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    /// Answers are consumed in order; once exhausted every answer is no
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
