// crates/pythia-test-config/src/reachability/tests.rs
// ============================================================================
// Module: Service Reachability Unit Tests
// Description: Tests for host extraction and the DNS skip gate.
// Purpose: Keep the gate offline-testable and its skip messages stable.
// Dependencies: pythia-test-config
// ============================================================================

//! ## Overview
//! Exercises host extraction and every gate outcome with a static lookup.

use super::Reachability;
use super::ServiceTarget;
use super::StaticHostLookup;
use super::check_service;
use super::service_target;

#[test]
fn target_uses_scheme_default_or_explicit_port() {
    assert_eq!(
        service_target("https://api.virgilsecurity.com/pythia/v1"),
        Some(ServiceTarget {
            host: "api.virgilsecurity.com".to_string(),
            port: 443,
        })
    );
    assert_eq!(service_target("http://localhost:8080/pythia/v1").map(|target| target.port), Some(8080));
    assert_eq!(
        service_target("https://[::1]/pythia/v1").map(|target| target.host),
        Some("::1".to_string())
    );
}

#[test]
fn target_requires_a_host() {
    assert_eq!(service_target("not a url"), None);
    assert_eq!(service_target("/pythia/v1"), None);
    assert_eq!(service_target("mailto:someone@example.com"), None);
}

#[test]
fn gate_reports_each_outcome() {
    let lookup = StaticHostLookup::with_hosts(["known.example.com"]);
    assert!(check_service("https://known.example.com/pythia/v1", &lookup).is_reachable());
    assert_eq!(check_service("  ", &lookup), Reachability::MissingUrl);
    assert_eq!(
        check_service("/pythia/v1", &lookup).skip_message().as_deref(),
        Some("No service host extracted from url=/pythia/v1")
    );
    assert_eq!(
        check_service("https://unknown.example.com/pythia/v1", &lookup).skip_message().as_deref(),
        Some("Unable to resolve host unknown.example.com; skipping integration tests")
    );
}

#[test]
fn allow_all_lookup_resolves_anything() {
    let lookup = StaticHostLookup::allow_all();
    assert_eq!(check_service("https://anything.invalid/", &lookup).skip_message(), None);
}
