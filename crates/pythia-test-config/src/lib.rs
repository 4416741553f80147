// crates/pythia-test-config/src/lib.rs
// ============================================================================
// Module: Pythia Test Config Library
// Description: Layered credential resolution for Pythia integration tests.
// Purpose: Let integration tests find credentials or skip cleanly without them.
// Dependencies: base64, ed25519-dalek, serde, sha2, thiserror, url
// ============================================================================

//! ## Overview
//! `pythia-test-config` resolves the settings Pythia client integration tests
//! need (service URL, application id, application key) from an optional
//! `env.json` secrets document, then system properties, then the process
//! environment. It derives the public key identifier from the application
//! key and gates tests on complete credentials and a resolvable service host.
//!
//! Missing or broken configuration never fails a build: tests that depend on
//! it are skipped through the [`TestHarness`] collaborator.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod document;
pub mod env;
pub mod harness;
pub mod keys;
pub mod legacy;
pub mod reachability;
pub mod resolver;
pub mod settings;
pub mod sources;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ConfigAuditEvent;
pub use audit::ConfigAuditSink;
pub use document::EnvironmentDocument;
pub use document::Selection;
pub use env::ResolverConfig;
pub use harness::CargoTestHarness;
pub use harness::TestHarness;
pub use legacy::LegacyCredentials;
pub use resolver::ConfigError;
pub use resolver::ConfigResolver;
pub use resolver::ResolverBuilder;
pub use settings::SettingKey;
