// crates/pythia-test-config/src/env.rs
// ============================================================================
// Module: Resolver Environment
// Description: Environment-backed settings that configure the resolver itself.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! These variables control where the resolver looks and how it reports; they
//! are distinct from the credential settings it resolves. Invalid UTF-8 and
//! unknown audit modes fail closed with [`EnvError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::audit::ConfigAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::settings::non_blank;
use crate::sources::SystemProperties;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverEnv {
    /// Secrets document path override.
    EnvJson,
    /// Environment name used when no `environment` property is set.
    Environment,
    /// Whitespace-separated `-DKEY=VALUE` tokens for system properties.
    Properties,
    /// Audit output mode (`stderr` or `off`).
    Audit,
}

impl ResolverEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnvJson => "PYTHIA_ENV_JSON",
            Self::Environment => "PYTHIA_TEST_ENVIRONMENT",
            Self::Properties => "PYTHIA_TEST_PROPERTIES",
            Self::Audit => "PYTHIA_TEST_AUDIT",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resolver configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// Variable is set but not UTF-8.
    #[error("{0} must be valid UTF-8")]
    NotUtf8(&'static str),
    /// Variable has an unsupported value.
    #[error("{name} {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was wrong with the value.
        message: &'static str,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Where audit events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditMode {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// Discard events.
    Off,
}

impl AuditMode {
    /// Parses `stderr` or `off`, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("stderr") {
            Some(Self::Stderr)
        } else if trimmed.eq_ignore_ascii_case("off") {
            Some(Self::Off)
        } else {
            None
        }
    }

    /// Builds the sink for this mode.
    #[must_use]
    pub fn sink(self) -> Arc<dyn ConfigAuditSink> {
        match self {
            Self::Stderr => Arc::new(StderrAuditSink),
            Self::Off => Arc::new(NoopAuditSink),
        }
    }
}

/// Typed resolver configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    /// Secrets document path override.
    pub document_path: Option<PathBuf>,
    /// Fallback environment name.
    pub environment: Option<String>,
    /// System properties parsed from define tokens.
    pub properties: SystemProperties,
    /// Audit output mode.
    pub audit: AuditMode,
}

impl ResolverConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8 or the audit mode is
    /// not recognized.
    pub fn load() -> Result<Self, EnvError> {
        let document_path = read_env_non_blank(ResolverEnv::EnvJson)?.map(PathBuf::from);
        let environment = read_env_non_blank(ResolverEnv::Environment)?;
        let properties = read_env_non_blank(ResolverEnv::Properties)?
            .map(|line| SystemProperties::from_define_line(&line))
            .unwrap_or_default();
        let audit = match read_env_non_blank(ResolverEnv::Audit)? {
            None => AuditMode::default(),
            Some(raw) => AuditMode::parse(&raw).ok_or(EnvError::Invalid {
                name: ResolverEnv::Audit.as_str(),
                message: "must be stderr or off",
            })?,
        };
        Ok(Self {
            document_path,
            environment,
            properties,
            audit,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, EnvError> {
    std::env::var_os(name)
        .map_or(Ok(None), |raw| raw.into_string().map(Some).map_err(|_| EnvError::NotUtf8(name)))
}

/// Reads a resolver variable, treating blank values as unset.
fn read_env_non_blank(key: ResolverEnv) -> Result<Option<String>, EnvError> {
    read_env_strict(key.as_str()).map(non_blank)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
