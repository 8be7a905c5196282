//! Heuristic privilege classification for suggested commands.
//!
//! The classifier flags commands that *likely* need elevated privileges so the
//! mediation flow can offer a sudo prefix before running them. It is a
//! substring scan over a fixed keyword list, nothing more: false positives
//! (e.g. `echo sudo-like`) are acceptable, and false negatives are a known
//! limitation rather than something to patch over by guessing intent.

/// Keywords whose presence anywhere in a command marks it as likely privileged.
///
/// Covers elevation tools, package managers, destructive filesystem
/// operations, service and power control, and permission/ownership/mount
/// changes.
const PRIVILEGED_KEYWORDS: &[&str] = &[
    "sudo", "apt", "dnf", "yum", "pacman", "rm -rf /", "systemctl", "reboot", "shutdown", "chmod",
    "chown", "mount", "umount",
];

/// Returns true if `command` contains any privileged keyword as a substring.
///
/// Matching is case-sensitive with no tokenization or word boundaries.
pub fn needs_elevation(command: &str) -> bool {
    PRIVILEGED_KEYWORDS
        .iter()
        .any(|keyword| command.contains(keyword))
}
