// crates/pythia-test-config/src/resolver/tests.rs
// ============================================================================
// Module: Configuration Resolver Unit Tests
// Description: Tests for layered resolution, derived values, and gates.
// Purpose: Pin precedence, URL derivation, and skip/fatal behavior.
// Dependencies: pythia-test-config, ed25519-dalek, tempfile
// ============================================================================

//! ## Overview
//! Builds resolvers from fixed documents, properties, and environments so no
//! test depends on the real process environment or network.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use tempfile::NamedTempFile;

use super::ConfigError;
use super::ConfigResolver;
use super::MISSING_CONFIG_MESSAGE;
use super::ResolverBuilder;
use crate::audit::MemoryAuditSink;
use crate::document::EnvironmentDocument;
use crate::document::Selection;
use crate::harness::RecordingHarness;
use crate::keys::KeyError;
use crate::reachability::StaticHostLookup;
use crate::sources::StaticEnvironment;
use crate::sources::SystemProperties;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn app_key(seed: u8) -> String {
    let document = SigningKey::from_bytes(&[seed; 32]).to_pkcs8_der().expect("pkcs8 export");
    BASE64.encode(document.as_bytes())
}

fn file_builder() -> ResolverBuilder {
    ConfigResolver::builder()
        .env_source(StaticEnvironment::default())
        .host_lookup(StaticHostLookup::allow_all())
        .audit_sink(Arc::new(MemoryAuditSink::new()))
}

fn offline_builder() -> ResolverBuilder {
    file_builder().no_document()
}

fn with_document(json: &str) -> ConfigResolver {
    offline_builder().document(EnvironmentDocument::parse(json, None).expect("document")).build()
}

// ============================================================================
// SECTION: Precedence
// ============================================================================

#[test]
fn document_wins_over_property_and_environment() {
    let resolver = offline_builder()
        .document(EnvironmentDocument::parse(r#"{"APP_ID": "doc"}"#, None).unwrap())
        .properties(SystemProperties::from_pairs([("APP_ID", "prop")]))
        .env_source(StaticEnvironment::from_pairs([("APP_ID", "env")]))
        .build();
    assert_eq!(resolver.app_id().as_deref(), Some("doc"));
    assert_eq!(resolver.resolve("APP_ID").unwrap().source, "document");
}

#[test]
fn property_wins_over_environment() {
    let resolver = offline_builder()
        .properties(SystemProperties::from_pairs([("APP_ID", "prop")]))
        .env_source(StaticEnvironment::from_pairs([("APP_ID", "env")]))
        .build();
    assert_eq!(resolver.app_id().as_deref(), Some("prop"));
}

#[test]
fn environment_is_last_resort_and_blank_is_absent() {
    let resolver = offline_builder()
        .properties(SystemProperties::from_pairs([("APP_ID", "  ")]))
        .env_source(StaticEnvironment::from_pairs([("APP_ID", "env"), ("APP_KEY", "\t")]))
        .build();
    assert_eq!(resolver.app_id().as_deref(), Some("env"));
    assert_eq!(resolver.api_private_key_str(), None);
    assert_eq!(resolver.get("UNKNOWN"), None);
}

// ============================================================================
// SECTION: Document Loading
// ============================================================================

#[test]
fn environment_property_selects_partition_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"dev": {"APP_ID": "dev-app"}, "prod": {"APP_ID": "prod-app"}}"#)
        .unwrap();
    let resolver = file_builder()
        .document_path(file.path())
        .environment("dev")
        .properties(SystemProperties::from_defines(["-Denvironment=prod"]))
        .build();
    assert_eq!(resolver.environment(), Some("prod"));
    assert_eq!(resolver.document().selection(), Some(&Selection::Named("prod".to_string())));
    assert_eq!(resolver.app_id().as_deref(), Some("prod-app"));
}

#[test]
fn builder_environment_applies_without_property() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"dev": {"APP_ID": "dev-app"}, "prod": {"APP_ID": "prod-app"}}"#)
        .unwrap();
    let resolver = file_builder().document_path(file.path()).environment("dev").build();
    assert_eq!(resolver.app_id().as_deref(), Some("dev-app"));
    assert_eq!(resolver.document_path(), Some(file.path()));
}

#[test]
fn missing_document_path_yields_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = file_builder().document_path(dir.path().join("env.json")).build();
    assert!(resolver.document().is_empty());
    assert!(!resolver.is_integration_configured());
}

#[test]
fn default_env_json_is_discovered_under_search_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("env.json"), br#"{"APP_ID": "discovered"}"#).unwrap();
    let resolver = file_builder().search_root(dir.path()).build();
    assert_eq!(resolver.app_id().as_deref(), Some("discovered"));
    assert_eq!(resolver.document_path(), Some(dir.path().join("env.json").as_path()));
}

#[test]
fn no_document_ignores_discoverable_env_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("env.json"),
        br#"{"APP_ID": "ci-app", "BASE_SERVICE_URL": "https://ci.example.com/"}"#,
    )
    .unwrap();
    let resolver = offline_builder().search_root(dir.path()).build();
    assert_eq!(resolver.app_id(), None);
    assert_eq!(resolver.document_path(), None);
    assert_eq!(resolver.pythia_service_url(), "https://api.virgilsecurity.com/pythia/v1");
}

// ============================================================================
// SECTION: Service URL
// ============================================================================

#[test]
fn service_url_strips_trailing_slashes() {
    for base in ["https://host.example.com/", "https://host.example.com///", " https://host.example.com "] {
        let resolver = offline_builder()
            .properties(SystemProperties::from_pairs([("BASE_SERVICE_URL", base)]))
            .build();
        assert_eq!(resolver.pythia_service_url(), "https://host.example.com/pythia/v1");
    }
}

#[test]
fn service_url_defaults_when_unconfigured() {
    let resolver = with_document("{}");
    assert_eq!(resolver.pythia_service_url(), "https://api.virgilsecurity.com/pythia/v1");
}

// ============================================================================
// SECTION: Keys
// ============================================================================

#[test]
fn derive_public_key_id_is_absent_for_blank_input() {
    let audit = Arc::new(MemoryAuditSink::new());
    let resolver = offline_builder().audit_sink(audit.clone()).build();
    assert_eq!(resolver.derive_public_key_id(None), None);
    assert_eq!(resolver.derive_public_key_id(Some("")), None);
    assert_eq!(resolver.derive_public_key_id(Some("   ")), None);
    assert!(audit.events().is_empty());
}

#[test]
fn derive_public_key_id_is_absent_and_audited_for_bad_keys() {
    let audit = Arc::new(MemoryAuditSink::new());
    let resolver = offline_builder().audit_sink(audit.clone()).build();
    assert_eq!(resolver.derive_public_key_id(Some("%%%")), None);
    assert_eq!(resolver.derive_public_key_id(Some(&BASE64.encode(b"short"))), None);
    assert_eq!(audit.events().len(), 2);
    assert!(audit.contains("public_key_id_unavailable"));
}

#[test]
fn derive_public_key_id_is_deterministic() {
    let resolver = with_document("{}");
    let key = app_key(11);
    let first = resolver.derive_public_key_id(Some(&key)).unwrap();
    assert_eq!(resolver.derive_public_key_id(Some(&key)), Some(first.clone()));
    assert_eq!(first.len(), 32);
    assert_eq!(first, first.to_lowercase());
}

#[test]
fn api_private_key_is_imported_and_memoized() {
    let key = app_key(12);
    let resolver = with_document(&format!(r#"{{"APP_KEY": "{key}"}}"#));
    let harness = RecordingHarness::new();
    let first = resolver.api_private_key(&harness);
    let second = resolver.try_api_private_key().unwrap();
    assert_eq!(first.to_bytes(), [12u8; 32]);
    assert_eq!(first.to_bytes(), second.to_bytes());
}

#[test]
fn try_api_private_key_reports_missing_and_invalid() {
    assert_eq!(with_document("{}").try_api_private_key().err(), Some(ConfigError::Missing("APP_KEY")));
    assert_eq!(
        with_document(r#"{"APP_KEY": "***"}"#).try_api_private_key().err(),
        Some(ConfigError::InvalidKey {
            key: "APP_KEY",
            source: KeyError::Base64,
        })
    );
}

#[test]
#[should_panic(expected = "API Private Key has invalid format")]
fn api_private_key_is_fatal_when_invalid() {
    let resolver = with_document(r#"{"APP_KEY": "bm90IGEga2V5"}"#);
    let _ = resolver.api_private_key(&RecordingHarness::new());
}

#[test]
#[should_panic(expected = "API Private Key has invalid format")]
fn api_private_key_is_fatal_when_missing() {
    let _ = with_document("{}").api_private_key(&RecordingHarness::new());
}

// ============================================================================
// SECTION: Gates
// ============================================================================

#[test]
fn integration_requires_all_three_values() {
    let key = app_key(13);
    let complete = with_document(&format!(r#"{{"APP_ID": "app", "APP_KEY": "{key}"}}"#));
    assert!(complete.is_integration_configured());
    assert!(complete.api_public_key_id().is_some());

    assert!(!with_document(&format!(r#"{{"APP_KEY": "{key}"}}"#)).is_integration_configured());
    assert!(!with_document(r#"{"APP_ID": "app"}"#).is_integration_configured());
    assert!(!with_document(r#"{"APP_ID": "app", "APP_KEY": "garbage"}"#).is_integration_configured());
}

#[test]
fn assume_integration_skips_when_unconfigured() {
    let harness = RecordingHarness::new();
    assert!(!with_document("{}").assume_integration_configured(&harness));
    assert_eq!(harness.skipped(), vec![MISSING_CONFIG_MESSAGE.to_string()]);
}

#[test]
fn assume_integration_skips_when_host_unresolvable() {
    let key = app_key(14);
    let document = EnvironmentDocument::parse(
        &format!(
            r#"{{"APP_ID": "app", "APP_KEY": "{key}", "BASE_SERVICE_URL": "https://offline.example.com/"}}"#
        ),
        None,
    )
    .unwrap();
    let resolver = offline_builder()
        .document(document)
        .host_lookup(StaticHostLookup::with_hosts(["api.virgilsecurity.com"]))
        .build();
    let harness = RecordingHarness::new();
    assert!(!resolver.assume_integration_configured(&harness));
    assert_eq!(
        harness.skipped(),
        vec!["Unable to resolve host offline.example.com; skipping integration tests".to_string()]
    );
}

#[test]
fn assume_integration_proceeds_when_configured_and_resolvable() {
    let key = app_key(15);
    let resolver = with_document(&format!(r#"{{"APP_ID": "app", "APP_KEY": "{key}"}}"#));
    let harness = RecordingHarness::new();
    assert!(resolver.assume_integration_configured(&harness));
    assert!(harness.skipped().is_empty());
}

#[test]
fn reachability_skips_when_url_has_no_host() {
    let resolver = offline_builder()
        .properties(SystemProperties::from_pairs([("BASE_SERVICE_URL", "///")]))
        .build();
    let harness = RecordingHarness::new();
    assert!(!resolver.assume_service_reachable_for_tests(&harness));
    assert_eq!(harness.skipped(), vec!["No service host extracted from url=/pythia/v1".to_string()]);
}
