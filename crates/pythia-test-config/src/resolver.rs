// crates/pythia-test-config/src/resolver.rs
// ============================================================================
// Module: Configuration Resolver
// Description: Layered credential resolution and integration-test gates.
// Purpose: Give integration tests credentials without hard-coded secrets.
// Dependencies: ed25519-dalek, thiserror
// ============================================================================

//! ## Overview
//! [`ConfigResolver`] loads the secrets document once at construction and
//! resolves settings from the document, then system properties, then the
//! process environment. Derived values (the imported private key and the
//! public key identifier) are computed on first use and memoized for the
//! resolver's lifetime.
//!
//! Failures degrade to `None` or a skipped test. The only fatal path is
//! [`ConfigResolver::api_private_key`], which reports through the harness
//! because a test asking for the key cannot proceed without it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::OnceCell;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use ed25519_dalek::SigningKey;
use thiserror::Error;

use crate::audit::ConfigAuditEvent;
use crate::audit::ConfigAuditSink;
use crate::audit::StderrAuditSink;
use crate::document::EnvironmentDocument;
use crate::document::locate_document;
use crate::env::ResolverConfig;
use crate::harness::TestHarness;
use crate::keys;
use crate::keys::KeyError;
use crate::reachability::HostLookup;
use crate::reachability::Reachability;
use crate::reachability::SystemHostLookup;
use crate::reachability::check_service;
use crate::settings::DEFAULT_PYTHIA_SERVICE_URL;
use crate::settings::ENVIRONMENT_PROPERTY;
use crate::settings::PYTHIA_SERVICE_PATH;
use crate::settings::SettingKey;
use crate::settings::is_blank;
use crate::settings::non_blank;
use crate::sources::ProcessEnvironment;
use crate::sources::PropertySource;
use crate::sources::ResolvedValue;
use crate::sources::SystemProperties;
use crate::sources::resolve_first;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Skip message when credentials are incomplete.
pub const MISSING_CONFIG_MESSAGE: &str =
    "Integration test config is missing. Provide env.json (or set APP_* env vars) to run.";

/// Fatal message when `APP_KEY` cannot be imported.
pub const INVALID_PRIVATE_KEY_MESSAGE: &str = "API Private Key has invalid format";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors from non-fatal resolver accessors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Setting did not resolve from any source.
    #[error("{0} is not defined")]
    Missing(&'static str),
    /// Setting resolved but is not a usable key.
    #[error("{key} has invalid format: {source}")]
    InvalidKey {
        /// Setting name.
        key: &'static str,
        /// Import failure.
        source: KeyError,
    },
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`ConfigResolver`].
pub struct ResolverBuilder {
    /// Explicit secrets document path.
    document_path: Option<PathBuf>,
    /// Directory searched for default document locations.
    search_root: Option<PathBuf>,
    /// Preloaded document; skips file loading.
    document: Option<EnvironmentDocument>,
    /// Fallback environment name.
    environment: Option<String>,
    /// System property layer.
    properties: SystemProperties,
    /// Environment variable layer.
    env: Box<dyn PropertySource>,
    /// Host lookup for the reachability gate.
    lookup: Box<dyn HostLookup>,
    /// Audit sink.
    audit: Arc<dyn ConfigAuditSink>,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            document_path: None,
            search_root: None,
            document: None,
            environment: None,
            properties: SystemProperties::new(),
            env: Box::new(ProcessEnvironment),
            lookup: Box::new(SystemHostLookup),
            audit: Arc::new(StderrAuditSink),
        }
    }
}

impl ResolverBuilder {
    /// Applies resolver configuration loaded from the environment.
    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        if self.document_path.is_none() {
            self.document_path = config.document_path;
        }
        if self.environment.is_none() {
            self.environment = config.environment;
        }
        self.properties.extend(config.properties);
        self.audit = config.audit.sink();
        self
    }

    /// Reads the secrets document from `path`.
    #[must_use]
    pub fn document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }

    /// Searches `root` instead of the working directory for `env.json`.
    #[must_use]
    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = Some(root.into());
        self
    }

    /// Skips document loading entirely; only properties and env resolve.
    #[must_use]
    pub fn no_document(self) -> Self {
        self.document(EnvironmentDocument::empty())
    }

    /// Uses an already parsed document instead of reading a file.
    #[must_use]
    pub fn document(mut self, document: EnvironmentDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Sets the environment name used when no `environment` property is set.
    #[must_use]
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Adds system properties; later values replace earlier ones.
    #[must_use]
    pub fn properties(mut self, properties: SystemProperties) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Replaces the environment variable layer.
    #[must_use]
    pub fn env_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.env = Box::new(source);
        self
    }

    /// Replaces the host lookup used by the reachability gate.
    #[must_use]
    pub fn host_lookup(mut self, lookup: impl HostLookup + 'static) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn audit_sink(mut self, audit: Arc<dyn ConfigAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Loads the document and builds the resolver.
    #[must_use]
    pub fn build(self) -> ConfigResolver {
        let environment = self
            .properties
            .get(ENVIRONMENT_PROPERTY)
            .map(str::to_string)
            .filter(|name| !is_blank(name))
            .or_else(|| non_blank(self.environment));
        let (document, document_path) = match self.document {
            Some(document) => (document, None),
            None => {
                let root = self.search_root.as_deref().unwrap_or_else(|| Path::new(""));
                let path = locate_document(self.document_path.as_deref(), root);
                let document = path.as_deref().map_or_else(EnvironmentDocument::empty, |path| {
                    EnvironmentDocument::load(path, environment.as_deref(), self.audit.as_ref())
                });
                (document, path)
            }
        };
        ConfigResolver {
            document,
            document_path,
            environment,
            properties: self.properties,
            env: self.env,
            lookup: self.lookup,
            audit: self.audit,
            api_private_key: OnceCell::new(),
            api_public_key_id: OnceCell::new(),
        }
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves integration-test credentials for one test run.
///
/// # Invariants
/// - The document is loaded exactly once, at construction.
/// - Lookups return only non-blank values.
/// - Memoized values are set at most once.
pub struct ConfigResolver {
    /// Selected secrets document settings.
    document: EnvironmentDocument,
    /// Path the document was read from, if any.
    document_path: Option<PathBuf>,
    /// Effective environment name.
    environment: Option<String>,
    /// System property layer.
    properties: SystemProperties,
    /// Environment variable layer.
    env: Box<dyn PropertySource>,
    /// Host lookup for the reachability gate.
    lookup: Box<dyn HostLookup>,
    /// Audit sink.
    audit: Arc<dyn ConfigAuditSink>,
    /// Imported `APP_KEY`.
    api_private_key: OnceCell<SigningKey>,
    /// Identifier derived from `APP_KEY`.
    api_public_key_id: OnceCell<Option<String>>,
}

impl ConfigResolver {
    /// Returns a builder with process defaults.
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Builds a resolver from the process environment.
    ///
    /// Invalid resolver variables are audited and replaced by defaults.
    #[must_use]
    pub fn from_process() -> Self {
        let config = ResolverConfig::load().unwrap_or_else(|err| {
            StderrAuditSink.record(&ConfigAuditEvent::resolver_config_invalid(&err.to_string()));
            ResolverConfig::default()
        });
        Self::builder().config(config).build()
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    /// Returns the loaded secrets document.
    #[must_use]
    pub const fn document(&self) -> &EnvironmentDocument {
        &self.document
    }

    /// Returns the secrets document path that was consulted.
    ///
    /// `None` when no file was found or a document was supplied directly.
    #[must_use]
    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    /// Returns the effective environment name.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Resolves `key` and reports which layer supplied it.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<ResolvedValue> {
        resolve_first(&[&self.document, &self.properties, self.env.as_ref()], key)
    }

    /// Resolves `key` from document, system property, then environment.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.resolve(key).map(|resolved| resolved.value)
    }

    /// Resolves a recognized setting.
    #[must_use]
    pub fn setting(&self, key: SettingKey) -> Option<String> {
        self.get(key.as_str())
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &dyn ConfigAuditSink {
        self.audit.as_ref()
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Returns the Pythia service URL.
    #[must_use]
    pub fn pythia_service_url(&self) -> String {
        self.setting(SettingKey::BaseServiceUrl).map_or_else(
            || DEFAULT_PYTHIA_SERVICE_URL.to_string(),
            |base| format!("{}{PYTHIA_SERVICE_PATH}", base.trim().trim_end_matches('/')),
        )
    }

    /// Returns the application identifier.
    #[must_use]
    pub fn app_id(&self) -> Option<String> {
        self.setting(SettingKey::AppId)
    }

    /// Returns the raw base64 application key.
    #[must_use]
    pub fn api_private_key_str(&self) -> Option<String> {
        self.setting(SettingKey::AppKey)
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    /// Imports the application key, memoizing the first success.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `APP_KEY` is absent or not a key.
    pub fn try_api_private_key(&self) -> Result<SigningKey, ConfigError> {
        if let Some(key) = self.api_private_key.get() {
            return Ok(key.clone());
        }
        let text = self
            .api_private_key_str()
            .ok_or(ConfigError::Missing(SettingKey::AppKey.as_str()))?;
        let key = keys::import_private_key(&text).map_err(|source| ConfigError::InvalidKey {
            key: SettingKey::AppKey.as_str(),
            source,
        })?;
        Ok(self.api_private_key.get_or_init(|| key).clone())
    }

    /// Imports the application key; failure is fatal to the test.
    ///
    /// An absent key and an undecodable key report the same message.
    pub fn api_private_key(&self, harness: &dyn TestHarness) -> SigningKey {
        match self.try_api_private_key() {
            Ok(key) => key,
            Err(_) => harness.report_fatal(INVALID_PRIVATE_KEY_MESSAGE),
        }
    }

    /// Derives the public key identifier for a base64 private key.
    ///
    /// Blank input and every import or export failure yield `None`.
    #[must_use]
    pub fn derive_public_key_id(&self, private_key: Option<&str>) -> Option<String> {
        let text = private_key.filter(|text| !is_blank(text))?;
        match keys::derive_public_key_id(text) {
            Ok(id) => Some(id),
            Err(err) => {
                self.audit.record(&ConfigAuditEvent::key_id_unavailable(&err.to_string()));
                None
            }
        }
    }

    /// Returns the identifier derived from `APP_KEY`.
    #[must_use]
    pub fn api_public_key_id(&self) -> Option<String> {
        self.api_public_key_id
            .get_or_init(|| self.derive_public_key_id(self.api_private_key_str().as_deref()))
            .clone()
    }

    // ------------------------------------------------------------------------
    // Gates
    // ------------------------------------------------------------------------

    /// Returns true when app id, app key, and derived key id all resolve.
    #[must_use]
    pub fn is_integration_configured(&self) -> bool {
        self.app_id().is_some()
            && self.api_private_key_str().is_some()
            && self.api_public_key_id().is_some()
    }

    /// Runs the reachability gate against the service URL.
    #[must_use]
    pub fn reachability(&self) -> Reachability {
        check_service(&self.pythia_service_url(), self.lookup.as_ref())
    }

    /// Skips the test unless credentials are complete and the host resolves.
    ///
    /// Returns `false` when the test was skipped and must return.
    #[must_use]
    pub fn assume_integration_configured(&self, harness: &dyn TestHarness) -> bool {
        if !harness.skip_unless(self.is_integration_configured(), MISSING_CONFIG_MESSAGE) {
            return false;
        }
        self.assume_service_reachable_for_tests(harness)
    }

    /// Skips the test unless the service host resolves.
    ///
    /// Returns `false` when the test was skipped and must return.
    #[must_use]
    pub fn assume_service_reachable_for_tests(&self, harness: &dyn TestHarness) -> bool {
        match self.reachability().skip_message() {
            None => true,
            Some(message) => harness.skip_unless(false, &message),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
