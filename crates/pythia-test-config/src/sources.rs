// crates/pythia-test-config/src/sources.rs
// ============================================================================
// Module: Property Sources
// Description: The layered lookup sources behind setting resolution.
// Purpose: Resolve keys from document, process properties, then environment.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A setting is looked up in three layers, in fixed order: the secrets
//! document, in-process system properties, and process environment
//! variables. The first non-blank value wins; blank values count as absent.
//!
//! System properties are the in-process analog of JVM `-D` properties. They
//! are built from define tokens (`-DKEY=VALUE` or `KEY=VALUE`) and owned by
//! the resolver, so tests never share them through global state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::document::EnvironmentDocument;
use crate::settings::is_blank;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// A single layer of setting values.
pub trait PropertySource {
    /// Returns the raw value for `key`, blank or not.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Returns a stable label naming this layer.
    fn label(&self) -> &'static str;
}

/// A value together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// Non-blank value.
    pub value: String,
    /// Label of the supplying layer.
    pub source: &'static str,
}

/// Returns the first non-blank value across `sources`, in order.
#[must_use]
pub fn resolve_first(sources: &[&dyn PropertySource], key: &str) -> Option<ResolvedValue> {
    sources.iter().find_map(|source| {
        source.lookup(key).filter(|value| !is_blank(value)).map(|value| ResolvedValue {
            value,
            source: source.label(),
        })
    })
}

// ============================================================================
// SECTION: Document Layer
// ============================================================================

impl PropertySource for EnvironmentDocument {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn label(&self) -> &'static str {
        "document"
    }
}

// ============================================================================
// SECTION: System Properties
// ============================================================================

/// In-process properties set by the test runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    /// Property values by key.
    values: BTreeMap<String, String>,
}

impl SystemProperties {
    /// Returns an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds properties from key/value pairs.
    #[must_use]
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }

    /// Builds properties from define tokens; tokens without a key are skipped.
    #[must_use]
    pub fn from_defines<S, I>(tokens: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        Self {
            values: tokens.into_iter().filter_map(|token| parse_define(token.as_ref())).collect(),
        }
    }

    /// Builds properties from whitespace-separated define tokens.
    #[must_use]
    pub fn from_define_line(line: &str) -> Self {
        Self::from_defines(line.split_whitespace())
    }

    /// Merges `other` on top of these properties.
    pub fn extend(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Returns the raw value of a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl PropertySource for SystemProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn label(&self) -> &'static str {
        "property"
    }
}

/// Parses `-DKEY=VALUE`, `KEY=VALUE`, or a bare `KEY` (empty value).
#[must_use]
pub fn parse_define(token: &str) -> Option<(String, String)> {
    let token = token.trim();
    let body = token.strip_prefix("-D").unwrap_or(token);
    let (key, value) = body.split_once('=').unwrap_or((body, ""));
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

// ============================================================================
// SECTION: Process Environment
// ============================================================================

/// Process environment variables; non-UTF-8 values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl PropertySource for ProcessEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var_os(key).and_then(|raw| raw.into_string().ok())
    }

    fn label(&self) -> &'static str {
        "env"
    }
}

/// Fixed map standing in for the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    /// Variable values by name.
    values: BTreeMap<String, String>,
}

impl StaticEnvironment {
    /// Builds a fixed environment from name/value pairs.
    #[must_use]
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}

impl PropertySource for StaticEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn label(&self) -> &'static str {
        "env"
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
