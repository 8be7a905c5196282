//! Shared provider traits for dependency injection.
//!
//! This module contains common traits used across the codebase to enable
//! testability through dependency injection. By abstracting external
//! dependencies behind traits, modules can be tested in isolation with
//! mock implementations.

use chrono::{DateTime, Local};

/// Trait for providing timestamps.
///
/// This abstraction enables deterministic testing of time-dependent behavior
/// by allowing injection of mock time providers.
///
/// # Example
///
/// ```
/// use volition::providers::{SystemTimeProvider, TimeProvider};
///
/// // Production code uses SystemTimeProvider
/// let provider = SystemTimeProvider;
/// let now = provider.now();
/// assert!(now.timestamp() > 0);
/// ```
pub trait TimeProvider: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Default time provider using the system clock.
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Trait for querying the identity the process runs under.
///
/// Escalation decisions depend on whether the process already holds elevated
/// privileges; abstracting the check keeps the mediation flow testable.
pub trait IdentityProvider: Send + Sync {
    /// Returns true if the process runs with an elevated (root) identity.
    fn is_elevated(&self) -> bool;
}

/// Default identity provider reading the effective uid.
pub struct SystemIdentityProvider;

impl IdentityProvider for SystemIdentityProvider {
    fn is_elevated(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }
}
