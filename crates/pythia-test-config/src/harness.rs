// crates/pythia-test-config/src/harness.rs
// ============================================================================
// Module: Test Harness Capabilities
// Description: The fatal/skip capabilities the resolver needs from a test runner.
// Purpose: Keep resolution logic independent of any particular test framework.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The resolver never decides how a test fails or skips. It asks a
//! [`TestHarness`] to either abort the current test case
//! ([`TestHarness::report_fatal`]) or mark it skipped
//! ([`TestHarness::skip_unless`]). Rust's built-in test runner has no skip
//! state, so the default harness records a skip event and the test returns
//! early when `skip_unless` yields `false`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::sync::Arc;

use crate::audit::ConfigAuditEvent;
use crate::audit::ConfigAuditSink;
use crate::audit::StderrAuditSink;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Capabilities supplied by the test runner.
pub trait TestHarness {
    /// Aborts the current test case with `message`.
    fn report_fatal(&self, message: &str) -> !;

    /// Marks the current test case skipped when `condition` is false.
    ///
    /// Returns `condition`; callers stop the test when it is `false`.
    fn skip_unless(&self, condition: bool, message: &str) -> bool;
}

// ============================================================================
// SECTION: Cargo Test Harness
// ============================================================================

/// Harness for `cargo test`: fatal panics, skips are audited.
pub struct CargoTestHarness {
    /// Sink receiving skip events.
    audit: Arc<dyn ConfigAuditSink>,
}

impl CargoTestHarness {
    /// Builds a harness that reports skips to `audit`.
    #[must_use]
    pub fn new(audit: Arc<dyn ConfigAuditSink>) -> Self {
        Self {
            audit,
        }
    }
}

impl Default for CargoTestHarness {
    fn default() -> Self {
        Self::new(Arc::new(StderrAuditSink))
    }
}

impl TestHarness for CargoTestHarness {
    #[allow(clippy::panic, reason = "Panicking is how a cargo test case fails.")]
    fn report_fatal(&self, message: &str) -> ! {
        panic!("{message}")
    }

    fn skip_unless(&self, condition: bool, message: &str) -> bool {
        if !condition {
            self.audit.record(&ConfigAuditEvent::test_skipped(message));
        }
        condition
    }
}

// ============================================================================
// SECTION: Recording Harness
// ============================================================================

/// Harness that remembers skip messages; fatal still panics.
#[derive(Debug, Default)]
pub struct RecordingHarness {
    /// Skip messages in arrival order.
    skips: RefCell<Vec<String>>,
}

impl RecordingHarness {
    /// Creates a harness with no recorded skips.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded skip messages.
    #[must_use]
    pub fn skipped(&self) -> Vec<String> {
        self.skips.borrow().clone()
    }
}

impl TestHarness for RecordingHarness {
    #[allow(clippy::panic, reason = "Fatal reports abort the test case by contract.")]
    fn report_fatal(&self, message: &str) -> ! {
        panic!("{message}")
    }

    fn skip_unless(&self, condition: bool, message: &str) -> bool {
        if !condition {
            self.skips.borrow_mut().push(message.to_string());
        }
        condition
    }
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Fails the test when `data` is absent or empty.
pub fn assert_not_empty(harness: &dyn TestHarness, description: &str, data: Option<&[u8]>) {
    match data {
        None => harness.report_fatal(&format!("{description} should not be null")),
        Some([]) => harness.report_fatal(&format!("{description} should not be empty")),
        Some(_) => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
