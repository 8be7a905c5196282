//! Interactive confirmation prompts for the mediation dialog.
//!
//! Every decision point (run, sudo, replay) reads a single line from
//! standard input; only an exact case-insensitive `y` or `yes` counts as
//! affirmative, and anything else, including an empty line, is a refusal.
//! All prompts exist in `_with_io` form so the flow can be driven from tests.

use crate::suggest::Suggestion;
use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Reads confirmations and prints the suggestion dialog.
pub struct MediationUi;

impl MediationUi {
    pub fn new() -> Self {
        Self
    }

    /// Asks `question` on stdout and reads the answer from stdin.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.confirm_with_io(question, &mut input, &mut output)
    }

    /// Asks `question` using custom I/O streams.
    pub fn confirm_with_io<R: BufRead, W: Write>(
        &self,
        question: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        write!(output, "{question}")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let answer = line.trim().to_lowercase();
        let affirmative = answer == "y" || answer == "yes";

        info!("Confirmation '{}' answered: {}", question.trim(), affirmative);
        Ok(affirmative)
    }

    /// Prints the suggested command and its explanation.
    pub fn show_suggestion_with_io<W: Write>(
        &self,
        suggestion: &Suggestion,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, "\n🔹 Command:\n    {}", suggestion.command)?;
        writeln!(output, "\n📘 Explanation:\n    {}", suggestion.explanation)?;
        Ok(())
    }
}

impl Default for MediationUi {
    fn default() -> Self {
        Self::new()
    }
}
