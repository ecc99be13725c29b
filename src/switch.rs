//! The process-wide auditing switch.
//!
//! This module defines the shared flag that every call wrapper consults
//! before recording. The flag is held behind a cloneable handle so that
//! one switch can govern all audited classes at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable handle to the process-wide auditing flag.
///
/// All clones of a switch observe the same flag: flipping it through one
/// handle takes effect immediately for every wrapper that holds another
/// clone, on instances that already exist. Reads and writes are
/// sequentially consistent, so there is no buffering or deferred
/// application even under concurrent callers.
///
/// The switch controls only whether calls are *recorded*; wrapped
/// operations always execute regardless of its state.
///
/// # Examples
///
/// ```
/// use call_audit::AuditSwitch;
///
/// let switch = AuditSwitch::default();
/// assert!(switch.is_enabled());
///
/// let shared = switch.clone();
/// shared.disable();
/// assert!(!switch.is_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct AuditSwitch {
    enabled: Arc<AtomicBool>,
}

impl AuditSwitch {
    /// Creates a switch in the given state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Turns auditing on.
    ///
    /// Idempotent: enabling an already-enabled switch changes nothing.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Turns auditing off.
    ///
    /// Idempotent: disabling an already-disabled switch changes nothing.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Returns the current state of the flag.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Default for AuditSwitch {
    /// A fresh switch starts enabled.
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_defaults_to_enabled() {
        let switch = AuditSwitch::default();
        assert!(switch.is_enabled());
    }

    #[test]
    fn switch_can_start_disabled() {
        let switch = AuditSwitch::new(false);
        assert!(!switch.is_enabled());
    }

    #[test]
    fn toggling_is_visible_through_every_clone() {
        let switch = AuditSwitch::default();
        let clone = switch.clone();

        clone.disable();
        assert!(!switch.is_enabled());

        switch.enable();
        assert!(clone.is_enabled());
    }

    #[test]
    fn toggling_is_idempotent() {
        let switch = AuditSwitch::default();

        switch.enable();
        switch.enable();
        assert!(switch.is_enabled());

        switch.disable();
        switch.disable();
        assert!(!switch.is_enabled());
    }

    #[test]
    fn switch_is_shared_across_threads() {
        let switch = AuditSwitch::default();
        let clone = switch.clone();

        let handle = std::thread::spawn(move || {
            clone.disable();
        });
        handle.join().expect("thread should not panic");

        assert!(!switch.is_enabled());
    }
}
