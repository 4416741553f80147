// crates/pythia-test-config/src/sources/tests.rs
// ============================================================================
// Module: Property Source Unit Tests
// Description: Tests for define parsing and layered lookup order.
// Purpose: Ensure the first non-blank layer wins.
// Dependencies: pythia-test-config, serde_json
// ============================================================================

//! ## Overview
//! Exercises define-token parsing and first-non-blank resolution.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use super::PropertySource;
use super::StaticEnvironment;
use super::SystemProperties;
use super::parse_define;
use super::resolve_first;
use crate::document::EnvironmentDocument;

#[test]
fn define_tokens_accept_both_forms() {
    assert_eq!(parse_define("-Denvironment=dev"), Some(("environment".into(), "dev".into())));
    assert_eq!(parse_define("APP_ID=a=b"), Some(("APP_ID".into(), "a=b".into())));
    assert_eq!(parse_define("-DFLAG"), Some(("FLAG".into(), String::new())));
    assert_eq!(parse_define("=value"), None);
    assert_eq!(parse_define("-D"), None);
}

#[test]
fn define_line_splits_on_whitespace_and_last_wins() {
    let properties = SystemProperties::from_define_line("-DAPP_ID=one  APP_KEY=k\t-DAPP_ID=two");
    assert_eq!(properties.get("APP_ID"), Some("two"));
    assert_eq!(properties.get("APP_KEY"), Some("k"));
}

#[test]
fn document_layer_wins_over_properties_and_env() {
    let document = EnvironmentDocument::parse(r#"{"APP_ID": "from-document"}"#, None).unwrap();
    let properties = SystemProperties::from_pairs([("APP_ID", "from-property")]);
    let env = StaticEnvironment::from_pairs([("APP_ID", "from-env")]);
    let resolved = resolve_first(&[&document, &properties, &env], "APP_ID").unwrap();
    assert_eq!(resolved.value, "from-document");
    assert_eq!(resolved.source, "document");
}

#[test]
fn blank_layers_fall_through() {
    let document = EnvironmentDocument::parse(r#"{"APP_ID": "   "}"#, None).unwrap();
    let properties = SystemProperties::from_pairs([("APP_ID", "")]);
    let env = StaticEnvironment::from_pairs([("APP_ID", "from-env")]);
    let resolved = resolve_first(&[&document, &properties, &env], "APP_ID").unwrap();
    assert_eq!(resolved.value, "from-env");
    assert_eq!(resolved.source, env.label());
}

#[test]
fn all_blank_is_absent() {
    let properties = SystemProperties::from_pairs([("APP_ID", " \n")]);
    let env = StaticEnvironment::default();
    assert!(resolve_first(&[&EnvironmentDocument::empty(), &properties, &env], "APP_ID").is_none());
}
