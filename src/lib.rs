//! Volition - natural-language command mediation for the shell.
//!
//! This library turns a free-text request into a reviewed, confirmed and
//! audited shell command. It provides:
//!
//! - **Command suggestion** via the Claude API
//! - **Privilege classification** by keyword heuristic
//! - **Interactive confirmation** before anything runs
//! - **Append-only audit logging** of every suggestion
//! - **History browsing and replay** of past commands
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management (API key, log path)
//! - [`suggest`] - AI-backed command suggestion
//! - [`classifier`] - Privilege-escalation heuristic
//! - [`mediator`] - The suggest/confirm/execute flow
//! - [`executor`] - Interactive subprocess execution
//! - [`audit`] - Append-only audit log and its parser
//! - [`history`] - History listing and replay
//! - [`prompt`] - Confirmation prompts
//! - [`monitor`] - Read-only host diagnostics
//! - [`providers`] - Shared dependency injection traits
//!
//! # Example
//!
//! ```ignore
//! use volition::config::Config;
//! use volition::mediator::MediationController;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let controller = MediationController::from_config(&config, false)?;
//!
//!     // Suggest, confirm, execute and log in one pass
//!     controller.mediate("show me the largest files here").await?;
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod classifier;
pub mod config;
pub mod executor;
pub mod history;
pub mod mediator;
pub mod monitor;
pub mod prompt;
pub mod providers;
pub mod suggest;
