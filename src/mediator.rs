//! The mediation flow from a natural-language query to an executed command.
//!
//! One controller drives the whole sequence: obtain a suggestion, log it,
//! short-circuit in dry-run mode, confirm, offer a sudo prefix when the
//! classifier fires, execute, report. Every failure is converted to a
//! user-facing message at the step where it occurs; only the suggestion step
//! aborts the flow, and it does so before anything is logged.
//!
//! One deliberate policy quirk: declining the sudo prefix does not cancel
//! the run. The unmodified command is attempted anyway.

use crate::audit::AuditLog;
use crate::classifier;
use crate::config::Config;
use crate::executor::{Executor, ProcessRunner, SystemProcessRunner};
use crate::prompt::MediationUi;
use crate::providers::{IdentityProvider, SystemIdentityProvider};
use crate::suggest::{self, CommandSuggester};
use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

const RUN_PROMPT: &str = "\n❓ Run this command? (y/n): ";
const SUDO_PROMPT: &str = "🔐 This command may require elevated privileges. Proceed with sudo? (y/n): ";

/// Orchestrates suggestion, classification, confirmation, execution and
/// logging for a single query.
pub struct MediationController {
    suggester: Box<dyn CommandSuggester>,
    audit: AuditLog,
    executor: Executor,
    ui: MediationUi,
    identity: Box<dyn IdentityProvider>,
    dry_run: bool,
}

impl MediationController {
    /// Builds a controller from the loaded configuration.
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        Ok(Self::new(
            suggest::suggester_from_config(config)?,
            AuditLog::new(config.log_path()?),
            Box::new(SystemIdentityProvider),
            dry_run,
        ))
    }

    /// Builds a controller with injected collaborators (for testing).
    pub fn new(
        suggester: Box<dyn CommandSuggester>,
        audit: AuditLog,
        identity: Box<dyn IdentityProvider>,
        dry_run: bool,
    ) -> Self {
        Self {
            suggester,
            audit,
            executor: Executor::new(),
            ui: MediationUi::new(),
            identity,
            dry_run,
        }
    }

    /// Mediates one query against the real terminal and process table.
    pub async fn mediate(&self, query: &str) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.mediate_with_io(query, &mut input, &mut output, &SystemProcessRunner)
            .await
    }

    /// Mediates one query with custom I/O streams and process runner.
    pub async fn mediate_with_io<R: BufRead, W: Write, P: ProcessRunner>(
        &self,
        query: &str,
        input: &mut R,
        output: &mut W,
        runner: &P,
    ) -> Result<()> {
        // A failed suggestion aborts the whole flow before anything is logged.
        let suggestion = match self.suggester.suggest(query).await {
            Ok(suggestion) => suggestion,
            Err(err) => {
                writeln!(output, "❌ Error: {err:#}")?;
                return Ok(());
            }
        };

        self.ui.show_suggestion_with_io(&suggestion, output)?;

        // Every suggestion is logged, whatever happens next. A log failure is
        // reported but must never keep the command from running.
        if let Err(err) = self
            .audit
            .append(query, &suggestion.command, &suggestion.explanation)
        {
            warn!("audit log write failed: {err:#}");
            writeln!(output, "⚠️ Could not log command: {err:#}")?;
        }

        if self.dry_run {
            writeln!(output, "\n🚫 Dry run: command not executed.")?;
            return Ok(());
        }

        if !self.ui.confirm_with_io(RUN_PROMPT, input, output)? {
            writeln!(output, "✅ Cancelled. Command not run.")?;
            return Ok(());
        }

        let mut command = suggestion.command;
        if classifier::needs_elevation(&command) && !self.identity.is_elevated() {
            if self.ui.confirm_with_io(SUDO_PROMPT, input, output)? {
                command = format!("sudo {command}");
            } else {
                // Declining the prefix does not cancel the run.
                writeln!(
                    output,
                    "⚠️ Skipping sudo. Attempting to run without elevated privileges."
                )?;
            }
        }

        info!("Running confirmed command: {}", command);
        writeln!(output, "\n🏃 Running: {command}")?;
        match self.executor.run_with_runner(&command, runner) {
            Ok(()) => writeln!(output, "✅ Command executed successfully.")?,
            Err(err) => writeln!(output, "❌ Error running command: {err}")?,
        }

        Ok(())
    }
}
