// crates/pythia-test-config/src/audit.rs
// ============================================================================
// Module: Resolution Audit Events
// Description: Structured events for configuration resolution decisions.
// Purpose: Explain skipped tests and ignored secrets files without leaking values.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every decision that silently degrades (an ignored secrets file, a key id
//! that could not be derived, a skipped test) is recorded as a JSON-line
//! event. Events name keys, paths, and reasons; they never carry setting
//! values or key material.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Configuration audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Secrets document path, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Requested environment name, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Partition selection label, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Number of settings loaded, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    /// Human-readable reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConfigAuditEvent {
    /// Builds an event with only the identifier populated.
    const fn bare(event: &'static str) -> Self {
        Self {
            event,
            path: None,
            environment: None,
            selection: None,
            entries: None,
            reason: None,
        }
    }

    /// A secrets document was parsed and a partition selected.
    #[must_use]
    pub fn document_loaded(
        path: &Path,
        environment: Option<&str>,
        selection: &str,
        entries: usize,
    ) -> Self {
        Self {
            path: Some(path.display().to_string()),
            environment: environment.map(str::to_string),
            selection: Some(selection.to_string()),
            entries: Some(entries),
            ..Self::bare("secrets_document_loaded")
        }
    }

    /// A secrets document existed but was ignored.
    #[must_use]
    pub fn document_ignored(path: &Path, reason: &str) -> Self {
        Self {
            path: Some(path.display().to_string()),
            reason: Some(reason.to_string()),
            ..Self::bare("secrets_document_ignored")
        }
    }

    /// A public key identifier could not be derived.
    #[must_use]
    pub fn key_id_unavailable(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::bare("public_key_id_unavailable")
        }
    }

    /// Resolver environment variables were rejected and defaults used.
    #[must_use]
    pub fn resolver_config_invalid(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::bare("resolver_config_invalid")
        }
    }

    /// An integration test was skipped.
    #[must_use]
    pub fn test_skipped(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::bare("integration_test_skipped")
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for configuration events.
pub trait ConfigAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ConfigAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ConfigAuditSink for StderrAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ConfigAuditSink for NoopAuditSink {
    fn record(&self, _event: &ConfigAuditEvent) {}
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<ConfigAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ConfigAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns true when an event with the identifier was recorded.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.events().iter().any(|recorded| recorded.event == event)
    }
}

impl ConfigAuditSink for MemoryAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
