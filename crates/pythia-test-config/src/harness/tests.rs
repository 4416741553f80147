// crates/pythia-test-config/src/harness/tests.rs
// ============================================================================
// Module: Test Harness Unit Tests
// Description: Tests for skip recording and fatal reporting.
// Purpose: Ensure skips never fail and fatal reports always abort.
// Dependencies: pythia-test-config
// ============================================================================

//! ## Overview
//! Exercises the cargo and recording harnesses plus `assert_not_empty`.

use std::sync::Arc;

use super::CargoTestHarness;
use super::RecordingHarness;
use super::TestHarness;
use super::assert_not_empty;
use crate::audit::MemoryAuditSink;

#[test]
fn cargo_harness_audits_skips_only_when_condition_fails() {
    let audit = Arc::new(MemoryAuditSink::new());
    let harness = CargoTestHarness::new(audit.clone());
    assert!(harness.skip_unless(true, "not recorded"));
    assert!(!harness.skip_unless(false, "service down"));
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "integration_test_skipped");
    assert_eq!(events[0].reason.as_deref(), Some("service down"));
}

#[test]
fn recording_harness_collects_skip_messages() {
    let harness = RecordingHarness::new();
    assert!(!harness.skip_unless(false, "first"));
    assert!(harness.skip_unless(true, "ignored"));
    assert!(!harness.skip_unless(false, "second"));
    assert_eq!(harness.skipped(), vec!["first".to_string(), "second".to_string()]);
}

#[test]
#[should_panic(expected = "App ID is not defined")]
fn cargo_harness_fatal_panics_with_message() {
    CargoTestHarness::default().report_fatal("App ID is not defined");
}

#[test]
fn assert_not_empty_accepts_data() {
    assert_not_empty(&RecordingHarness::new(), "Blinded password", Some(&[1u8, 2, 3][..]));
}

#[test]
#[should_panic(expected = "Blinded password should not be empty")]
fn assert_not_empty_rejects_empty_data() {
    assert_not_empty(&RecordingHarness::new(), "Blinded password", Some(&[][..]));
}

#[test]
#[should_panic(expected = "Proof should not be null")]
fn assert_not_empty_rejects_missing_data() {
    assert_not_empty(&RecordingHarness::new(), "Proof", None);
}
