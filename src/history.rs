//! History browsing and selective replay of logged commands.
//!
//! The browser re-reads the audit log, shows the entries numbered from 1, and
//! lets the user pick one to run again. Replay executes exactly the text that
//! followed the command marker when the entry was written, including any sudo
//! prefix persisted from the live run. It never re-classifies and never
//! re-offers escalation.

use crate::audit::{AuditLog, COMMAND_MARKER, HistoryReadError, LogEntry};
use crate::executor::{Executor, ProcessRunner, SystemProcessRunner};
use crate::prompt::MediationUi;
use anyhow::Result;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::info;

const REPLAY_PROMPT: &str = "\n❓ Run this command again? (y/n): ";

/// A replay selection outside the numbered range.
#[derive(Debug, Error)]
#[error("selection {index} is out of range 1..={count}")]
pub struct SelectionRangeError {
    pub index: usize,
    pub count: usize,
}

/// Lists logged entries and replays a selected one.
pub struct HistoryBrowser {
    audit: AuditLog,
    executor: Executor,
    ui: MediationUi,
}

impl HistoryBrowser {
    pub fn new(audit: AuditLog) -> Self {
        Self {
            audit,
            executor: Executor::new(),
            ui: MediationUi::new(),
        }
    }

    /// Runs an interactive history session against the real terminal.
    pub fn browse(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.browse_with_io(&mut input, &mut output, &SystemProcessRunner)
    }

    /// Runs a history session with custom I/O streams and process runner.
    pub fn browse_with_io<R: BufRead, W: Write, P: ProcessRunner>(
        &self,
        input: &mut R,
        output: &mut W,
        runner: &P,
    ) -> Result<()> {
        let entries = match self.audit.read_all() {
            Ok(entries) if !entries.is_empty() => entries,
            Ok(_) | Err(HistoryReadError::NoHistory) => {
                writeln!(output, "📭 No history found.")?;
                return Ok(());
            }
            Err(err) => {
                writeln!(output, "⚠️ Could not open log file: {err}")?;
                return Ok(());
            }
        };

        info!("Showing {} history entries", entries.len());
        writeln!(output, "📜 Command History:")?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(output, "[{}]\n{}", i + 1, entry)?;
        }

        write!(
            output,
            "🔢 Enter history number to re-run or press Enter to exit: "
        )?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let choice = line.trim();

        if choice.is_empty() {
            writeln!(output, "👋 Exiting history view.")?;
            return Ok(());
        }

        let selected = match choice.parse::<usize>() {
            Ok(index) => match Self::select(&entries, index) {
                Ok(entry) => entry,
                Err(err) => {
                    writeln!(output, "❌ {err}")?;
                    return Ok(());
                }
            },
            Err(_) => {
                writeln!(output, "❌ Invalid choice.")?;
                return Ok(());
            }
        };

        writeln!(output, "\n📦 Selected Entry:\n{selected}")?;

        if !self.ui.confirm_with_io(REPLAY_PROMPT, input, output)? {
            writeln!(output, "✅ Cancelled.")?;
            return Ok(());
        }

        match Self::extract_command(selected) {
            Some(command) => {
                writeln!(output, "\n🏃 Running: {command}")?;
                match self.executor.run_with_runner(&command, runner) {
                    Ok(()) => writeln!(output, "✅ Command executed successfully.")?,
                    Err(err) => writeln!(output, "❌ Error running command: {err}")?,
                }
            }
            None => writeln!(output, "❌ Entry has no command line.")?,
        }

        Ok(())
    }

    /// Returns the 1-based `index`th entry.
    pub fn select(
        entries: &[LogEntry],
        index: usize,
    ) -> Result<&LogEntry, SelectionRangeError> {
        if index == 0 || index > entries.len() {
            return Err(SelectionRangeError {
                index,
                count: entries.len(),
            });
        }
        Ok(&entries[index - 1])
    }

    /// Pulls the command text out of a raw entry block.
    pub fn extract_command(entry: &LogEntry) -> Option<String> {
        entry
            .as_str()
            .lines()
            .find_map(|line| line.strip_prefix(COMMAND_MARKER))
            .map(|rest| rest.trim().to_string())
    }
}
