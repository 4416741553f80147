// crates/pythia-test-config/src/legacy.rs
// ============================================================================
// Module: Legacy Credentials
// Description: Account-era credential accessors for older integration suites.
// Purpose: Keep suites that predate app keys running against the same resolver.
// Dependencies: ed25519-dalek
// ============================================================================

//! ## Overview
//! Older suites authenticate with an account id, an API key pair, and a
//! Pythia proof key. Unlike the current settings, every one of these is
//! required: a missing value fails the test through the harness instead of
//! skipping it. Values resolve through the same layered lookup and are
//! memoized on first success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::OnceCell;

use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;

use crate::harness::TestHarness;
use crate::keys;
use crate::resolver::ConfigResolver;
use crate::settings::SettingKey;

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Required legacy credentials backed by a [`ConfigResolver`].
pub struct LegacyCredentials<'a> {
    /// Resolver supplying raw values.
    resolver: &'a ConfigResolver,
    /// Test harness receiving fatal reports.
    harness: &'a dyn TestHarness,
    /// `ACCOUNT_ID`.
    account_id: OnceCell<String>,
    /// `APP_ID`.
    app_id: OnceCell<String>,
    /// `API_PRIVATE_KEY` text.
    api_private_key_str: OnceCell<String>,
    /// Imported `API_PRIVATE_KEY`.
    api_private_key: OnceCell<SigningKey>,
    /// Imported `API_PUBLIC_KEY`.
    api_public_key: OnceCell<VerifyingKey>,
    /// `API_PUBLIC_KEY_ID`.
    api_public_key_id: OnceCell<String>,
    /// `PROOF_KEY`.
    proof_key: OnceCell<String>,
}

impl<'a> LegacyCredentials<'a> {
    /// Wraps `resolver`, reporting missing values to `harness`.
    #[must_use]
    pub const fn new(resolver: &'a ConfigResolver, harness: &'a dyn TestHarness) -> Self {
        Self {
            resolver,
            harness,
            account_id: OnceCell::new(),
            app_id: OnceCell::new(),
            api_private_key_str: OnceCell::new(),
            api_private_key: OnceCell::new(),
            api_public_key: OnceCell::new(),
            api_public_key_id: OnceCell::new(),
            proof_key: OnceCell::new(),
        }
    }

    /// Returns `ACCOUNT_ID`.
    pub fn account_id(&self) -> &str {
        self.required(&self.account_id, SettingKey::AccountId, "Account ID is not defined")
    }

    /// Returns `APP_ID`.
    pub fn app_id(&self) -> &str {
        self.required(&self.app_id, SettingKey::AppId, "App ID is not defined")
    }

    /// Returns the base64 `API_PRIVATE_KEY` text.
    pub fn api_private_key_str(&self) -> &str {
        self.required(
            &self.api_private_key_str,
            SettingKey::ApiPrivateKey,
            "API Private Key is not defined",
        )
    }

    /// Returns the imported `API_PRIVATE_KEY`.
    pub fn api_private_key(&self) -> &SigningKey {
        if let Some(key) = self.api_private_key.get() {
            return key;
        }
        let Ok(key) = keys::import_private_key(self.api_private_key_str()) else {
            self.harness.report_fatal("API Private Key has invalid format");
        };
        self.api_private_key.get_or_init(|| key)
    }

    /// Returns the imported `API_PUBLIC_KEY`.
    pub fn api_public_key(&self) -> &VerifyingKey {
        if let Some(key) = self.api_public_key.get() {
            return key;
        }
        let Some(text) = self.resolver.setting(SettingKey::ApiPublicKey) else {
            self.harness.report_fatal("API Public Key is not defined");
        };
        let Ok(key) = keys::import_public_key(&text) else {
            self.harness.report_fatal("API Public Key has invalid format");
        };
        self.api_public_key.get_or_init(|| key)
    }

    /// Returns `API_PUBLIC_KEY_ID`.
    pub fn api_public_key_id(&self) -> &str {
        self.required(
            &self.api_public_key_id,
            SettingKey::ApiPublicKeyId,
            "API Public Key ID is not defined",
        )
    }

    /// Returns `PROOF_KEY`.
    pub fn proof_key(&self) -> &str {
        self.required(&self.proof_key, SettingKey::ProofKey, "Proof key is not defined")
    }

    /// Returns `PYTHIA_SERVICE_URL` verbatim, `None` when absent.
    #[must_use]
    pub fn pythia_service_url(&self) -> Option<String> {
        self.resolver.setting(SettingKey::PythiaServiceUrl)
    }

    /// Resolves `key` into `cell` or reports `message` as fatal.
    fn required<'s>(&'s self, cell: &'s OnceCell<String>, key: SettingKey, message: &str) -> &'s str {
        if let Some(value) = cell.get() {
            return value;
        }
        let Some(value) = self.resolver.setting(key) else {
            self.harness.report_fatal(message);
        };
        cell.get_or_init(|| value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
