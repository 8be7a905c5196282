//! Append-only audit log of mediation attempts.
//!
//! Every suggestion that reaches the user is persisted here, whether or not
//! it ends up being executed. The store is a plain UTF-8 text file of blocks
//! delimited by a `---` separator line; a block records the timestamp, the
//! original query, the suggested command, and its explanation. The file is
//! opened for append on every write and fully re-parsed on every read, so no
//! in-memory state survives between invocations.
//!
//! Parsing is format-level only: [`AuditLog::read_all`] hands back each
//! block's raw text, and pulling the command field out of a block is the
//! consumer's job (see [`crate::history`]).

use crate::providers::{SystemTimeProvider, TimeProvider};
use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Line prefix that delimits consecutive entries.
pub const SEPARATOR: &str = "---";
/// Marker preceding the timestamp line of an entry.
pub const TIME_MARKER: &str = "🕒";
/// Marker preceding the query line of an entry.
pub const QUERY_MARKER: &str = "📝 Query:";
/// Marker preceding the command line of an entry.
pub const COMMAND_MARKER: &str = "💻 Command:";
/// Marker preceding the explanation line of an entry.
pub const EXPLANATION_MARKER: &str = "📘 Explanation:";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted mediation attempt.
///
/// Holds the raw multi-line text of the block, marker lines included, exactly
/// as it appears in the file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    raw: String,
}

impl LogEntry {
    /// The entry's raw text block.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Failure modes of reading the log back.
///
/// A log file that simply does not exist yet is not an I/O failure: callers
/// present [`HistoryReadError::NoHistory`] as "no history yet", never as a
/// crash.
#[derive(Debug, Error)]
pub enum HistoryReadError {
    #[error("no history recorded yet")]
    NoHistory,
    #[error("could not read log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only store of [`LogEntry`] blocks backed by a single text file.
///
/// The log exclusively owns its file; nothing else in the crate writes to it.
/// Entries are never rewritten or truncated.
pub struct AuditLog {
    path: PathBuf,
    time_provider: Box<dyn TimeProvider>,
}

impl AuditLog {
    /// Creates a log handle for the given file path.
    ///
    /// The file itself is only created on the first [`Self::append`].
    pub fn new(path: PathBuf) -> Self {
        Self::with_time_provider(path, Box::new(SystemTimeProvider))
    }

    /// Creates a log handle with a custom time provider (for testing).
    pub fn with_time_provider(path: PathBuf, time_provider: Box<dyn TimeProvider>) -> Self {
        Self {
            path,
            time_provider,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry stamped with the current time.
    ///
    /// Creates the file and any missing parent directory on first use. Fails
    /// only on unwritable or unreachable storage; callers must treat that as
    /// a reportable nuisance, never as a reason to abort the mediation flow.
    ///
    /// Field text is written verbatim. An embedded newline or a leading
    /// separator sequence inside a field will corrupt the entry boundaries on
    /// the way back out; the format defines no escaping for them.
    pub fn append(&self, query: &str, command: &str, explanation: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("could not create log directory {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("could not open log file {}", self.path.display()))?;

        let timestamp = self.time_provider.now().format(TIMESTAMP_FORMAT);
        write!(
            file,
            "{SEPARATOR}\n{TIME_MARKER} {timestamp}\n{QUERY_MARKER} {query}\n{COMMAND_MARKER} {command}\n{EXPLANATION_MARKER} {explanation}\n"
        )
        .with_context(|| format!("could not write to log file {}", self.path.display()))?;

        info!("Logged mediation attempt to {}", self.path.display());
        Ok(())
    }

    /// Reads the whole file back as entries, oldest first.
    ///
    /// A separator line closes the block accumulated so far (if it has any
    /// content); every other line is kept verbatim inside the current block.
    /// A trailing block with no closing separator is still captured, which
    /// mirrors how an in-progress write may have been flushed.
    pub fn read_all(&self) -> Result<Vec<LogEntry>, HistoryReadError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Err(HistoryReadError::NoHistory);
            }
            Err(source) => {
                return Err(HistoryReadError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut entries = Vec::new();
        let mut current = String::new();

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| HistoryReadError::Io {
                path: self.path.clone(),
                source,
            })?;

            if line.starts_with(SEPARATOR) {
                Self::finish_entry(&mut current, &mut entries);
            } else {
                current.push_str(&line);
                current.push('\n');
            }
        }
        Self::finish_entry(&mut current, &mut entries);

        Ok(entries)
    }

    /// Closes the accumulating block, dropping it when it holds no content.
    ///
    /// Whitespace-only blocks are what a leading separator line (or blank
    /// padding between entries) accumulates to; emitting them would produce
    /// phantom history entries.
    fn finish_entry(current: &mut String, entries: &mut Vec<LogEntry>) {
        if current.trim().is_empty() {
            current.clear();
        } else {
            entries.push(LogEntry {
                raw: std::mem::take(current),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::FixedTimeProvider;
    use tempfile::tempdir;

    fn test_log(path: PathBuf) -> AuditLog {
        AuditLog::with_time_provider(path, Box::new(FixedTimeProvider))
    }

    #[test]
    fn test_append_then_read_all_round_trips_one_entry() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("commands.log"));

        log.append("show disk usage", "df -h", "Shows disk usage per filesystem")
            .unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        let raw = entries[0].as_str();
        assert!(raw.contains("🕒 2025-03-01 14:30:12"));
        assert!(raw.contains("📝 Query: show disk usage"));
        assert!(raw.contains("💻 Command: df -h"));
        assert!(raw.contains("📘 Explanation: Shows disk usage per filesystem"));
    }

    #[test]
    fn test_entries_come_back_in_append_order() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("commands.log"));

        log.append("a", "echo a", "first").unwrap();
        log.append("b", "echo b", "second").unwrap();
        log.append("c", "echo c", "third").unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].as_str().contains("echo a"));
        assert!(entries[1].as_str().contains("echo b"));
        assert!(entries[2].as_str().contains("echo c"));
    }

    #[test]
    fn test_read_all_is_idempotent() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("commands.log"));

        log.append("q", "echo hi", "greets").unwrap();

        let first = log.read_all().unwrap();
        let second = log.read_all().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_no_history_not_an_io_error() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("never-written.log"));

        match log.read_all() {
            Err(HistoryReadError::NoHistory) => {}
            other => panic!("expected NoHistory, got {other:?}"),
        }
    }

    #[test]
    fn test_append_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("nested").join("deeper").join("commands.log"));

        log.append("q", "true", "does nothing").unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_trailing_block_without_separator_is_captured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.log");
        fs::write(
            &path,
            "---\n🕒 2025-03-01 10:00:00\n📝 Query: q\n💻 Command: uptime\n📘 Explanation: e\n",
        )
        .unwrap();

        let log = test_log(path);
        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].as_str().contains("💻 Command: uptime"));
    }

    #[test]
    fn test_leading_separator_does_not_create_phantom_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.log");
        fs::write(
            &path,
            "\n---\n🕒 2025-03-01 10:00:00\n📝 Query: q\n💻 Command: ls\n📘 Explanation: e\n",
        )
        .unwrap();

        let log = test_log(path);
        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_decorated_separator_still_bounds_entries() {
        // The scan is prefix-based, so a separator with trailing decoration
        // still closes the block.
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.log");
        fs::write(
            &path,
            "--- entry follows\n💻 Command: ls\n--- entry follows\n💻 Command: pwd\n",
        )
        .unwrap();

        let log = test_log(path);
        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].as_str().contains("ls"));
        assert!(entries[1].as_str().contains("pwd"));
    }

    #[test]
    fn test_marker_lines_are_kept_verbatim_in_raw_text() {
        let dir = tempdir().unwrap();
        let log = test_log(dir.path().join("commands.log"));

        log.append("q", "whoami", "prints the user").unwrap();

        let entries = log.read_all().unwrap();
        let lines: Vec<&str> = entries[0].as_str().lines().collect();
        assert_eq!(lines[0], "🕒 2025-03-01 14:30:12");
        assert_eq!(lines[1], "📝 Query: q");
        assert_eq!(lines[2], "💻 Command: whoami");
        assert_eq!(lines[3], "📘 Explanation: prints the user");
    }
}
